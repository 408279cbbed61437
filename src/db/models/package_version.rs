// src/db/models/package_version.rs

//! PackageVersion model - one version string of a package

use crate::db::models::Keyword;
use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A version of a package, carrying a set of keywords
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageVersion {
    pub id: Option<i64>,
    pub version: String,
    pub package_id: i64,
}

impl PackageVersion {
    /// Create a new PackageVersion
    pub fn new(package_id: i64, version: String) -> Self {
        Self {
            id: None,
            version,
            package_id,
        }
    }

    fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            Error::InitError(format!("Version {} has no ID", self.version))
        })
    }

    /// Insert this version into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO package_versions (version, package_id) VALUES (?1, ?2)",
            params![&self.version, &self.package_id],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a version of a package by its version string
    pub fn find(conn: &Connection, package_id: i64, version: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, version, package_id FROM package_versions
             WHERE package_id = ?1 AND version = ?2",
        )?;
        let found = stmt
            .query_row(params![package_id, version], Self::from_row)
            .optional()?;
        Ok(found)
    }

    /// All versions of a package, ordered by version string
    pub fn list_for_package(conn: &Connection, package_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, version, package_id FROM package_versions
             WHERE package_id = ?1 ORDER BY version",
        )?;
        let versions = stmt
            .query_map([package_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(versions)
    }

    /// Delete this version; keyword associations go with it
    pub fn delete(&self, conn: &Connection) -> Result<()> {
        conn.execute("DELETE FROM package_versions WHERE id = ?1", [self.require_id()?])?;
        Ok(())
    }

    /// Keywords associated with this version, ordered by name
    pub fn keywords(&self, conn: &Connection) -> Result<Vec<Keyword>> {
        Keyword::list_for_version(conn, self.require_id()?)
    }

    /// Associate a keyword with this version (no-op if already associated)
    pub fn add_keyword(&self, conn: &Connection, keyword_id: i64) -> Result<()> {
        conn.execute(
            "INSERT OR IGNORE INTO version_keywords (version_id, keyword_id) VALUES (?1, ?2)",
            params![self.require_id()?, keyword_id],
        )?;
        Ok(())
    }

    /// Drop the association with a keyword, leaving the keyword itself
    pub fn remove_keyword(&self, conn: &Connection, keyword_id: i64) -> Result<()> {
        conn.execute(
            "DELETE FROM version_keywords WHERE version_id = ?1 AND keyword_id = ?2",
            params![self.require_id()?, keyword_id],
        )?;
        Ok(())
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            version: row.get(1)?,
            package_id: row.get(2)?,
        })
    }
}
