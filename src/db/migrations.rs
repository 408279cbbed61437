// src/db/migrations.rs
//! Database migration implementations
//!
//! Each function handles a single schema version upgrade and is applied by
//! [`super::schema::migrate`] in order.

use crate::error::Result;
use rusqlite::Connection;
use tracing::{debug, info};

/// Initial schema - Version 1
///
/// The package catalog:
/// - categories: top-level grouping, never deleted
/// - packages: one category each, carries the sync watermark
/// - package_versions: one package each, replaced per diff
/// - keywords: globally shared names, linked through version_keywords
pub fn migrate_v1(conn: &Connection) -> Result<()> {
    debug!("Creating schema version 1");

    conn.execute_batch(
        "
        CREATE TABLE categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        );

        CREATE TABLE packages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            description TEXT,
            -- Unix seconds of the last successful detail sync; 0 = never
            last_sync_ts INTEGER NOT NULL DEFAULT 0,
            UNIQUE(category_id, name),
            FOREIGN KEY (category_id) REFERENCES categories(id)
        );

        CREATE INDEX idx_packages_last_sync ON packages(last_sync_ts);

        CREATE TABLE package_versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            version TEXT NOT NULL,
            package_id INTEGER NOT NULL,
            UNIQUE(package_id, version),
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE
        );

        CREATE TABLE keywords (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE version_keywords (
            version_id INTEGER NOT NULL,
            keyword_id INTEGER NOT NULL,
            PRIMARY KEY (version_id, keyword_id),
            FOREIGN KEY (version_id) REFERENCES package_versions(id) ON DELETE CASCADE,
            FOREIGN KEY (keyword_id) REFERENCES keywords(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_version_keywords_keyword ON version_keywords(keyword_id);
        ",
    )?;

    info!("Schema version 1 created successfully");
    Ok(())
}

/// Version 2: maintainers, project hierarchy and QA reports
///
/// - maintainers: people and projects, one row per lowercase email
/// - maintainer_members: project -> member edges (members may be projects)
/// - package_maintainers: package <-> maintainer
/// - quality_violations: pkgcheck results, replaced wholesale on every sync
pub fn migrate_v2(conn: &Connection) -> Result<()> {
    debug!("Migrating to schema version 2");

    conn.execute_batch(
        "
        CREATE TABLE maintainers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            is_project INTEGER NOT NULL DEFAULT 0,
            name TEXT,
            url TEXT,
            description TEXT
        );

        CREATE INDEX idx_maintainers_is_project ON maintainers(is_project);

        CREATE TABLE maintainer_members (
            project_id INTEGER NOT NULL,
            member_id INTEGER NOT NULL,
            is_lead INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (project_id, member_id),
            FOREIGN KEY (project_id) REFERENCES maintainers(id) ON DELETE CASCADE,
            FOREIGN KEY (member_id) REFERENCES maintainers(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_maintainer_members_member ON maintainer_members(member_id);

        CREATE TABLE package_maintainers (
            package_id INTEGER NOT NULL,
            maintainer_id INTEGER NOT NULL,
            PRIMARY KEY (package_id, maintainer_id),
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE,
            FOREIGN KEY (maintainer_id) REFERENCES maintainers(id) ON DELETE CASCADE
        );

        CREATE INDEX idx_package_maintainers_maintainer ON package_maintainers(maintainer_id);

        CREATE TABLE quality_violations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category_id INTEGER,
            package_id INTEGER,
            version_id INTEGER,
            class TEXT NOT NULL,
            message TEXT NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL,
            FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE SET NULL,
            FOREIGN KEY (version_id) REFERENCES package_versions(id) ON DELETE SET NULL
        );

        CREATE INDEX idx_quality_violations_package ON quality_violations(package_id);
        ",
    )?;

    info!("Schema version 2 applied successfully");
    Ok(())
}
