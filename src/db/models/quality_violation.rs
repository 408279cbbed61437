// src/db/models/quality_violation.rs

//! QualityViolation model - one static-analysis result

use crate::error::Result;
use rusqlite::{Connection, Row, params};

/// A pkgcheck result, scoped as deep as its references resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityViolation {
    pub id: Option<i64>,
    pub category_id: Option<i64>,
    pub package_id: Option<i64>,
    pub version_id: Option<i64>,
    pub class: String,
    pub message: String,
}

impl QualityViolation {
    /// Create a new unscoped QualityViolation
    pub fn new(class: String, message: String) -> Self {
        Self {
            id: None,
            category_id: None,
            package_id: None,
            version_id: None,
            class,
            message,
        }
    }

    /// Insert this violation into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO quality_violations (category_id, package_id, version_id, class, message)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &self.category_id,
                &self.package_id,
                &self.version_id,
                &self.class,
                &self.message,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Remove every stored violation, returning how many were deleted
    pub fn delete_all(conn: &Connection) -> Result<usize> {
        let deleted = conn.execute("DELETE FROM quality_violations", [])?;
        Ok(deleted)
    }

    /// Violations reported against a package, ordered by class
    pub fn list_for_package(conn: &Connection, package_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, category_id, package_id, version_id, class, message
             FROM quality_violations WHERE package_id = ?1 ORDER BY class, id",
        )?;
        let violations = stmt
            .query_map([package_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(violations)
    }

    /// All stored violations in insertion order
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, category_id, package_id, version_id, class, message
             FROM quality_violations ORDER BY id",
        )?;
        let violations = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(violations)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            category_id: row.get(1)?,
            package_id: row.get(2)?,
            version_id: row.get(3)?,
            class: row.get(4)?,
            message: row.get(5)?,
        })
    }
}
