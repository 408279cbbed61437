// src/sync/scheduler.rs

//! Selection of packages due for a detail refresh

use crate::db::models::Package;
use crate::error::Result;
use rusqlite::Connection;
use std::time::Duration;
use tracing::debug;

/// Default minimum age of a package's watermark before it is refreshed
pub const DEFAULT_STALENESS_BUFFER: Duration = Duration::from_secs(60 * 60);

/// Packages whose last sync is older than `now - buffer`, most stale first
///
/// `limit` bounds how many packages a single run refreshes.
pub fn due_packages(
    conn: &Connection,
    now: i64,
    buffer: Duration,
    limit: Option<usize>,
) -> Result<Vec<Package>> {
    let buffer_secs = i64::try_from(buffer.as_secs()).unwrap_or(i64::MAX);
    let cutoff = now.saturating_sub(buffer_secs);

    let due = Package::list_synced_before(conn, cutoff, limit)?;
    debug!("{} packages synced before {} are due", due.len(), cutoff);
    Ok(due)
}
