// src/db/models/category.rs

//! Category model - top-level grouping of packages

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

/// A package category (e.g. `dev-lang`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
}

impl Category {
    /// Create a new Category
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: None,
            name,
            description,
        }
    }

    /// Insert this category into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO categories (name, description) VALUES (?1, ?2)",
            params![&self.name, &self.description],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Write the current description back to the database
    pub fn update_description(&self, conn: &Connection) -> Result<()> {
        let id = self.id.ok_or_else(|| {
            Error::InitError("Cannot update category without ID".to_string())
        })?;

        conn.execute(
            "UPDATE categories SET description = ?1 WHERE id = ?2",
            params![&self.description, id],
        )?;
        Ok(())
    }

    /// Find a category by name
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT id, name, description FROM categories WHERE name = ?1")?;
        let category = stmt.query_row([name], Self::from_row).optional()?;
        Ok(category)
    }

    /// List all categories, ordered by name
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT id, name, description FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    /// Number of stored categories
    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            name: row.get(1)?,
            description: row.get(2)?,
        })
    }
}
