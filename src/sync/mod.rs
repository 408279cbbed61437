// src/sync/mod.rs

//! Reconciliation of the local mirror against the remote catalog
//!
//! Each step can run on its own; [`sync_all`] runs them in dependency order:
//! categories, packages, projects, versions, QA report. Every step receives
//! the fetch capability explicitly.
//!
//! Failure handling follows the scope of the document involved. A top-level
//! document (categories list, projects, QA report) that cannot be fetched
//! or parsed aborts its step. A scoped document (one category's package
//! list, one package's detail) only skips that category or package.

pub mod batch;
pub mod categories;
pub mod client;
pub mod maintainers;
pub mod packages;
pub mod parsers;
pub mod pkgcheck;
pub mod projects;
pub mod scheduler;
pub mod versions;

pub use batch::{CommitBatcher, DEFAULT_BATCH_SIZE, now_timestamp};
pub use categories::{CategoryStats, sync_categories};
pub use client::{Fetch, HttpFetcher, Sources, StaticFetcher};
pub use packages::{PackageStats, sync_packages};
pub use pkgcheck::{QualityStats, sync_pkgcheck};
pub use projects::{ProjectStats, sync_projects};
pub use scheduler::{DEFAULT_STALENESS_BUFFER, due_packages};
pub use versions::{KeywordRemoval, VersionStats, sync_versions};

use crate::error::{Error, Result};
use rusqlite::Connection;
use std::time::Duration;
use tracing::info;

/// Tunables of the version sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Packages per committed batch
    pub batch_size: usize,
    /// Minimum age of a package's watermark before it is refreshed
    pub staleness_buffer: Duration,
    pub keyword_removal: KeywordRemoval,
    /// Upper bound on packages refreshed by one run
    pub limit: Option<usize>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            staleness_buffer: DEFAULT_STALENESS_BUFFER,
            keyword_removal: KeywordRemoval::default(),
            limit: None,
        }
    }
}

/// Results of every step of a full sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub categories: CategoryStats,
    pub packages: PackageStats,
    pub projects: ProjectStats,
    pub versions: VersionStats,
    pub quality: QualityStats,
}

/// Whether a failure on a scoped document should skip just that item
///
/// Covers the item-level errors and a malformed scoped document.
pub(crate) fn is_scoped_failure(err: &Error) -> bool {
    err.is_item_level() || matches!(err, Error::ParseError(_))
}

/// Run every step in dependency order, stopping at the first failure
///
/// Steps that completed before the failure keep their committed writes.
pub fn sync_all(
    conn: &mut Connection,
    fetcher: &dyn Fetch,
    sources: &Sources,
    options: &SyncOptions,
) -> Result<SyncReport> {
    let categories = sync_categories(conn, fetcher, sources)?;
    let packages = sync_packages(conn, fetcher, sources)?;
    let projects = sync_projects(conn, fetcher, sources)?;
    let versions = sync_versions(conn, fetcher, sources, options, now_timestamp())?;
    let quality = sync_pkgcheck(conn, fetcher, sources)?;

    info!("Full sync complete");
    Ok(SyncReport {
        categories,
        packages,
        projects,
        versions,
        quality,
    })
}
