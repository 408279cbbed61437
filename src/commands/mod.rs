// src/commands/mod.rs
//! Command handlers for the grumpy CLI

mod init;
mod sync;

pub use init::cmd_init;
pub use sync::{
    cmd_sync, cmd_sync_categories, cmd_sync_packages, cmd_sync_pkgcheck, cmd_sync_projects,
    cmd_sync_versions,
};

use anyhow::{Context, Result};
use grumpy::{GrumpyConfig, HttpFetcher};
use rusqlite::Connection;

/// Open the database, creating and migrating it first if needed
fn open_db(db_path: &str) -> Result<Connection> {
    grumpy::db::init(db_path)
        .with_context(|| format!("Failed to initialize database at {}", db_path))?;
    Ok(grumpy::db::open(db_path)?)
}

/// Build the HTTP client from the [http] section
fn http_fetcher(config: &GrumpyConfig) -> Result<HttpFetcher> {
    let timeout = config.http_timeout()?;
    Ok(HttpFetcher::with_options(timeout, &config.http.user_agent)?)
}
