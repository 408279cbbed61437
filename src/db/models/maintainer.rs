// src/db/models/maintainer.rs

//! Maintainer model - individuals and projects, keyed by email
//!
//! A project is a maintainer whose members are other maintainers (people or
//! further projects). Membership is stored as directed edges
//! project -> member in `maintainer_members`.

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

const MAINTAINER_COLUMNS: &str = "id, email, is_project, name, url, description";

/// A maintainer identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maintainer {
    pub id: Option<i64>,
    /// Always stored lowercase
    pub email: String,
    pub is_project: bool,
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// One edge of a project's member list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberEdge {
    pub member_id: i64,
    pub is_lead: bool,
}

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Maintainer {
    /// Create a new Maintainer with a normalized email
    pub fn new(email: &str, is_project: bool) -> Self {
        Self {
            id: None,
            email: normalize_email(email),
            is_project,
            name: None,
            url: None,
            description: None,
        }
    }

    fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            Error::InitError(format!("Maintainer {} has no ID", self.email))
        })
    }

    /// Insert this maintainer into the database
    pub fn insert(&mut self, conn: &Connection) -> Result<i64> {
        conn.execute(
            "INSERT INTO maintainers (email, is_project, name, url, description)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &self.email,
                &self.is_project,
                &self.name,
                &self.url,
                &self.description,
            ],
        )?;

        let id = conn.last_insert_rowid();
        self.id = Some(id);
        Ok(id)
    }

    /// Write all mutable fields back to the database
    pub fn update(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "UPDATE maintainers SET is_project = ?1, name = ?2, url = ?3, description = ?4
             WHERE id = ?5",
            params![
                &self.is_project,
                &self.name,
                &self.url,
                &self.description,
                self.require_id()?,
            ],
        )?;
        Ok(())
    }

    /// Find a maintainer by email, ignoring case
    pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<Self>> {
        let sql = format!("SELECT {MAINTAINER_COLUMNS} FROM maintainers WHERE email = ?1");
        let maintainer = conn
            .query_row(&sql, [normalize_email(email)], Self::from_row)
            .optional()?;
        Ok(maintainer)
    }

    /// Find a maintainer by ID
    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT {MAINTAINER_COLUMNS} FROM maintainers WHERE id = ?1");
        let maintainer = conn.query_row(&sql, [id], Self::from_row).optional()?;
        Ok(maintainer)
    }

    /// Individual maintainers, ordered by email
    pub fn list_people(conn: &Connection) -> Result<Vec<Self>> {
        Self::list_by_kind(conn, false)
    }

    /// Project maintainers, ordered by email
    pub fn list_projects(conn: &Connection) -> Result<Vec<Self>> {
        Self::list_by_kind(conn, true)
    }

    fn list_by_kind(conn: &Connection, is_project: bool) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT {MAINTAINER_COLUMNS} FROM maintainers WHERE is_project = ?1 ORDER BY email"
        );
        let mut stmt = conn.prepare(&sql)?;
        let maintainers = stmt
            .query_map([is_project], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(maintainers)
    }

    /// Maintainers of a package, ordered by email
    pub fn list_for_package(conn: &Connection, package_id: i64) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT m.id, m.email, m.is_project, m.name, m.url, m.description
             FROM maintainers m
             JOIN package_maintainers pm ON pm.maintainer_id = m.id
             WHERE pm.package_id = ?1
             ORDER BY m.email",
        )?;
        let maintainers = stmt
            .query_map([package_id], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(maintainers)
    }

    /// Direct members of this project, ordered by email
    pub fn members(&self, conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT m.id, m.email, m.is_project, m.name, m.url, m.description
             FROM maintainers m
             JOIN maintainer_members mm ON mm.member_id = m.id
             WHERE mm.project_id = ?1
             ORDER BY m.email",
        )?;
        let members = stmt
            .query_map([self.require_id()?], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(members)
    }

    /// Leads of this project, ordered by email
    pub fn leads(&self, conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT m.id, m.email, m.is_project, m.name, m.url, m.description
             FROM maintainers m
             JOIN maintainer_members mm ON mm.member_id = m.id
             WHERE mm.project_id = ?1 AND mm.is_lead = 1
             ORDER BY m.email",
        )?;
        let leads = stmt
            .query_map([self.require_id()?], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(leads)
    }

    /// Projects this maintainer is a direct member of, ordered by email
    pub fn projects(&self, conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT m.id, m.email, m.is_project, m.name, m.url, m.description
             FROM maintainers m
             JOIN maintainer_members mm ON mm.project_id = m.id
             WHERE mm.member_id = ?1
             ORDER BY m.email",
        )?;
        let projects = stmt
            .query_map([self.require_id()?], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Replace a project's member edges with exactly `members`
    pub fn set_members(conn: &Connection, project_id: i64, members: &[MemberEdge]) -> Result<()> {
        conn.execute(
            "DELETE FROM maintainer_members WHERE project_id = ?1",
            [project_id],
        )?;

        // A member listed twice keeps the strongest role
        let mut stmt = conn.prepare(
            "INSERT INTO maintainer_members (project_id, member_id, is_lead)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(project_id, member_id)
             DO UPDATE SET is_lead = max(is_lead, excluded.is_lead)",
        )?;
        for edge in members {
            stmt.execute(params![project_id, edge.member_id, edge.is_lead])?;
        }
        Ok(())
    }

    /// Every stored membership edge as (project_id, member_id)
    pub fn membership_edges(conn: &Connection) -> Result<Vec<(i64, i64)>> {
        let mut stmt = conn.prepare(
            "SELECT project_id, member_id FROM maintainer_members ORDER BY project_id, member_id",
        )?;
        let edges = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    /// Number of stored maintainers
    pub fn count(conn: &Connection) -> Result<i64> {
        let count = conn.query_row("SELECT COUNT(*) FROM maintainers", [], |row| row.get(0))?;
        Ok(count)
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: Some(row.get(0)?),
            email: row.get(1)?,
            is_project: row.get(2)?,
            name: row.get(3)?,
            url: row.get(4)?,
            description: row.get(5)?,
        })
    }
}
