// src/db/mod.rs

//! Database layer for the catalog mirror
//!
//! All mirrored state lives in a single SQLite database. The schema is
//! versioned (see [`schema`]) and brought up to date by [`init`].

pub mod migrations;
pub mod models;
pub mod schema;

use crate::error::{Error, Result};
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Create (if needed) and migrate the database at `db_path`
pub fn init(db_path: &str) -> Result<()> {
    info!("Initializing database at {}", db_path);

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::InitError(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }

    let conn = open(db_path)?;
    schema::migrate(&conn)?;
    Ok(())
}

/// Open a connection with the pragmas every caller relies on
///
/// Foreign keys must be on: version and keyword deletion cascade through
/// the association tables.
pub fn open(db_path: &str) -> Result<Connection> {
    debug!("Opening database {}", db_path);
    let conn = Connection::open(db_path)?;
    configure(&conn)?;
    Ok(conn)
}

/// Open an in-memory database with the current schema
///
/// Not gated on `cfg(test)` so integration tests can use it too.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    schema::migrate(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    // Reports the resulting mode ("memory" for in-memory databases)
    let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    debug!("Journal mode: {}", mode);
    Ok(())
}

/// Run `f` inside a transaction, committing on success
///
/// Any error returned by `f` rolls the transaction back when it is dropped.
pub fn transaction<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction) -> Result<T>,
{
    let tx = conn.transaction()?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
