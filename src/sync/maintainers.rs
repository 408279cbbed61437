// src/sync/maintainers.rs

//! Get-or-create resolution of maintainers by email
//!
//! Shared by the project and version reconcilers. Resolution is idempotent
//! and independent of the order in which emails are seen: a subproject may
//! be referenced before its own project node has been written, in which case
//! a placeholder is created and later filled in by the project upsert.

use crate::db::models::{Maintainer, normalize_email};
use crate::error::Result;
use crate::sync::parsers::MaintainerKind;
use crate::sync::parsers::projects::ProjectRecord;
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
struct Known {
    id: i64,
    has_name: bool,
}

/// Resolves emails to maintainer IDs, caching lookups for one run
#[derive(Debug, Default)]
pub struct MaintainerResolver {
    known: HashMap<String, Known>,
    created: usize,
}

impl MaintainerResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of maintainers created by this resolver
    pub fn created(&self) -> usize {
        self.created
    }

    /// Drop cached lookups
    ///
    /// Must be called after rolling back writes made through this resolver,
    /// since cached IDs may refer to rows that no longer exist.
    pub fn clear(&mut self) {
        self.known.clear();
    }

    fn lookup(&mut self, conn: &Connection, email: &str) -> Result<Option<Maintainer>> {
        let found = Maintainer::find_by_email(conn, email)?;
        if let Some(ref maintainer) = found {
            if let Some(id) = maintainer.id {
                self.remember(email, id, maintainer.name.is_some());
            }
        }
        Ok(found)
    }

    fn remember(&mut self, email: &str, id: i64, has_name: bool) {
        self.known.insert(email.to_string(), Known { id, has_name });
    }

    /// Return the maintainer ID for `email`, creating a placeholder if unknown
    ///
    /// An existing individual gets `name` only if none was recorded before.
    /// A new maintainer is marked as a project when `kind` says so.
    pub fn resolve(
        &mut self,
        conn: &Connection,
        email: &str,
        kind: MaintainerKind,
        name: Option<&str>,
    ) -> Result<i64> {
        let email = normalize_email(email);

        let cached = self.known.get(&email).copied();
        let known = match cached {
            Some(known) => Some(known),
            None => self
                .lookup(conn, &email)?
                .and_then(|m| m.id.map(|id| Known { id, has_name: m.name.is_some() })),
        };

        match known {
            Some(known) => {
                if let (Some(name), false, MaintainerKind::Person) = (name, known.has_name, kind) {
                    conn.execute(
                        "UPDATE maintainers SET name = ?1 WHERE id = ?2 AND name IS NULL",
                        rusqlite::params![name, known.id],
                    )?;
                    self.remember(&email, known.id, true);
                }
                Ok(known.id)
            }
            None => {
                let mut maintainer = Maintainer::new(&email, kind.is_project());
                maintainer.name = name.map(str::to_string);
                let id = maintainer.insert(conn)?;
                debug!("Created maintainer {} (project: {})", email, kind.is_project());
                self.created += 1;
                self.remember(&email, id, maintainer.name.is_some());
                Ok(id)
            }
        }
    }

    /// Write a project node as a project maintainer
    ///
    /// Supplied name/url/description overwrite stored values; absent ones are
    /// left alone. An existing individual with the same email becomes a project.
    pub fn upsert_project(&mut self, conn: &Connection, project: &ProjectRecord) -> Result<i64> {
        let email = normalize_email(&project.email);

        let mut maintainer = match self.lookup(conn, &email)? {
            Some(existing) => existing,
            None => Maintainer::new(&email, true),
        };
        maintainer.is_project = true;
        if project.name.is_some() {
            maintainer.name = project.name.clone();
        }
        if project.url.is_some() {
            maintainer.url = project.url.clone();
        }
        if project.description.is_some() {
            maintainer.description = project.description.clone();
        }

        let id = match maintainer.id {
            Some(id) => {
                maintainer.update(conn)?;
                id
            }
            None => {
                self.created += 1;
                maintainer.insert(conn)?
            }
        };
        self.remember(&email, id, maintainer.name.is_some());
        Ok(id)
    }
}
