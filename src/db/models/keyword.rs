// src/db/models/keyword.rs

//! Keyword model - architecture keywords shared by all versions

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// Prefix marking a keyword as unstable (e.g. `~amd64`)
pub const UNSTABLE_PREFIX: char = '~';

/// A globally unique keyword name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub id: Option<i64>,
    pub name: String,
}

impl Keyword {
    /// Create a new Keyword
    pub fn new(name: String) -> Self {
        Self { id: None, name }
    }

    /// Whether the keyword marks a version as not yet stable
    pub fn is_unstable(&self) -> bool {
        self.name.starts_with(UNSTABLE_PREFIX)
    }

    /// Insert this keyword into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute("INSERT INTO keywords (name) VALUES (?1)", [&self.name])?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Find a keyword by name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt = conn.prepare("SELECT id, name FROM keywords WHERE name = ?1")?;
        let keyword = stmt.query_row([name], Self::from_row).optional()?;
        Ok(keyword)
    }

    /// Return the keyword with this name, creating it when missing
    pub fn find_or_create(conn: &Connection, name: &str) -> Result<Self> {
        if let Some(existing) = Self::find_by_name(conn, name)? {
            return Ok(existing);
        }
        let mut keyword = Self::new(name.to_string());
        keyword.insert(conn)?;
        Ok(keyword)
    }

    /// Keywords associated with a version, ordered by name
    pub fn list_for_version(conn: &Connection, version_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT k.id, k.name FROM keywords k
             JOIN version_keywords vk ON vk.keyword_id = k.id
             WHERE vk.version_id = ?1
             ORDER BY k.name",
        )?;
        let keywords = stmt
            .query_map([version_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(keywords)
    }

    /// Delete the keyword row, dropping every version's association with it
    pub fn delete(&self, conn: &Connection) -> Result<()> {
        let id = self.id.ok_or_else(|| {
            Error::InitError(format!("Keyword {} has no ID", self.name))
        })?;
        conn.execute("DELETE FROM keywords WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Delete the keyword if no version references it any more
    ///
    /// Returns true when the row was removed.
    pub fn delete_if_orphaned(conn: &Connection, keyword_id: i64) -> Result<bool> {
        let removed = conn.execute(
            "DELETE FROM keywords WHERE id = ?1
             AND NOT EXISTS (SELECT 1 FROM version_keywords WHERE keyword_id = ?1)",
            params![keyword_id],
        )?;
        Ok(removed > 0)
    }

    /// Number of stored keywords
    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM keywords", [], |row| row.get(0))?;
        Ok(count)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
        })
    }
}
