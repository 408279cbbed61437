// src/db/models/package.rs

//! Package model - a named package inside one category

use crate::db::models::Maintainer;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

const PACKAGE_COLUMNS: &str = "id, name, category_id, description, last_sync_ts";

/// A package belonging to exactly one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub id: Option<i64>,
    pub name: String,
    pub category_id: i64,
    pub description: Option<String>,
    /// Unix seconds of the last successful detail sync (0 = never synced)
    pub last_sync_ts: i64,
}

impl Package {
    /// Create a new Package that has never been synced
    pub fn new(category_id: i64, name: String) -> Self {
        Self {
            id: None,
            name,
            category_id,
            description: None,
            last_sync_ts: 0,
        }
    }

    fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            Error::InitError(format!("Package {} has no ID", self.name))
        })
    }

    /// Insert this package into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO packages (name, category_id, description, last_sync_ts)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &self.name,
                &self.category_id,
                &self.description,
                &self.last_sync_ts,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a package by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = ?1");
        let package = conn.query_row(&sql, [id], Self::from_row).optional()?;
        Ok(package)
    }

    /// Find a package by name within a category
    pub fn find(conn: &Connection, category_id: i64, name: &str) -> Result<Option<Self>> {
        let sql = format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE category_id = ?1 AND name = ?2"
        );
        let package = conn
            .query_row(&sql, params![category_id, name], Self::from_row)
            .optional()?;
        Ok(package)
    }

    /// Packages of one category, ordered by name
    pub fn list_for_category(conn: &Connection, category_id: i64) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE category_id = ?1 ORDER BY name"
        );
        let mut stmt = conn.prepare(&sql)?;
        let packages = stmt
            .query_map([category_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    /// Packages whose watermark is strictly older than `cutoff`
    ///
    /// Ordered oldest first, so a bounded run always refreshes the most
    /// stale packages. Ties are broken by ID to keep the order stable.
    pub fn list_synced_before(
        conn: &Connection,
        cutoff: i64,
        limit: Option<usize>,
    ) -> Result<Vec<Self>> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let sql = format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages
             WHERE last_sync_ts < ?1
             ORDER BY last_sync_ts ASC, id ASC
             LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let packages = stmt
            .query_map(params![cutoff, limit], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    /// Packages maintained (directly) by a maintainer
    pub fn list_for_maintainer(conn: &Connection, maintainer_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, p.category_id, p.description, p.last_sync_ts
             FROM packages p
             JOIN package_maintainers pm ON pm.package_id = p.id
             WHERE pm.maintainer_id = ?1
             ORDER BY p.name",
        )?;
        let packages = stmt
            .query_map([maintainer_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(packages)
    }

    /// Write the current description back to the database
    pub fn update_description(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "UPDATE packages SET description = ?1 WHERE id = ?2",
            params![&self.description, self.require_id()?],
        )?;
        Ok(())
    }

    /// Stamp the sync watermark
    pub fn set_last_sync(&mut self, conn: &Connection, timestamp: i64) -> Result<()> {
        conn.execute(
            "UPDATE packages SET last_sync_ts = ?1 WHERE id = ?2",
            params![timestamp, self.require_id()?],
        )?;
        self.last_sync_ts = timestamp;
        Ok(())
    }

    /// Maintainers of this package, ordered by email
    pub fn maintainers(&self, conn: &Connection) -> Result<Vec<Maintainer>> {
        Maintainer::list_for_package(conn, self.require_id()?)
    }

    /// Replace the maintainer association with exactly `maintainer_ids`
    ///
    /// An empty slice is valid and leaves the package without maintainers.
    pub fn set_maintainers(&self, conn: &Connection, maintainer_ids: &[i64]) -> Result<()> {
        let id = self.require_id()?;
        conn.execute("DELETE FROM package_maintainers WHERE package_id = ?1", [id])?;

        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO package_maintainers (package_id, maintainer_id) VALUES (?1, ?2)",
        )?;
        for maintainer_id in maintainer_ids {
            stmt.execute(params![id, maintainer_id])?;
        }
        Ok(())
    }

    /// Number of stored packages
    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM packages", [], |row| row.get(0))?;
        Ok(count)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            category_id: row.get(2)?,
            description: row.get(3)?,
            last_sync_ts: row.get(4)?,
        })
    }
}
