// src/commands/init.rs
//! Database initialization

use anyhow::Result;
use grumpy::db::models::{Category, Keyword, Maintainer, Package};
use tracing::info;

/// Create the database and bring its schema up to date
pub fn cmd_init(db_path: &str) -> Result<()> {
    info!("Initializing grumpy database at: {}", db_path);
    let conn = super::open_db(db_path)?;

    println!("Database initialized successfully at: {}", db_path);
    println!("  Categories: {}", Category::count(&conn)?);
    println!("  Packages: {}", Package::count(&conn)?);
    println!("  Keywords: {}", Keyword::count(&conn)?);
    println!("  Maintainers: {}", Maintainer::count(&conn)?);
    Ok(())
}
