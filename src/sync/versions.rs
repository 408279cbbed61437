// src/sync/versions.rs

//! Per-package detail reconciliation: description, maintainers, versions
//! and keywords
//!
//! Packages are picked by the staleness scheduler and processed one at a
//! time, each inside a savepoint of the current commit batch. A package
//! whose document cannot be fetched or violates the data contract is
//! skipped with its watermark untouched, so the next run retries it.

use crate::db::models::{Category, Keyword, Package, PackageVersion};
use crate::error::{Error, Result};
use crate::sync::batch::CommitBatcher;
use crate::sync::client::{Fetch, Sources, fetch_document};
use crate::sync::maintainers::MaintainerResolver;
use crate::sync::parsers::catalog::{PackageDetail, parse_package_detail};
use crate::sync::{SyncOptions, is_scoped_failure, scheduler};
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// What happens to a keyword a version no longer carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordRemoval {
    /// Delete the shared keyword row itself
    ///
    /// Every other version loses the keyword as well, until its own package
    /// is synced again.
    #[default]
    Destroy,
    /// Drop only this version's association; delete the keyword once no
    /// version references it
    Detach,
}

/// Outcome of a version sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionStats {
    pub synced: usize,
    pub skipped: usize,
    pub versions_created: usize,
    pub versions_deleted: usize,
    pub batches: usize,
}

/// Changes applied to one package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageChanges {
    pub versions_created: usize,
    pub versions_deleted: usize,
    pub keywords_added: usize,
    pub keywords_removed: usize,
}

/// Refresh every package due at `now`
pub fn sync_versions(
    conn: &mut Connection,
    fetcher: &dyn Fetch,
    sources: &Sources,
    options: &SyncOptions,
    now: i64,
) -> Result<VersionStats> {
    let conn: &Connection = conn;

    let due = scheduler::due_packages(conn, now, options.staleness_buffer, options.limit)?;
    info!("Syncing versions for {} due packages", due.len());

    let categories: HashMap<i64, String> = Category::list_all(conn)?
        .into_iter()
        .filter_map(|c| c.id.map(|id| (id, c.name)))
        .collect();

    let mut batcher = CommitBatcher::new(conn, options.batch_size)?;
    let mut resolver = MaintainerResolver::new();
    let mut stats = VersionStats::default();

    for mut package in due {
        let category = categories.get(&package.category_id).ok_or_else(|| {
            Error::InitError(format!("Package {} has no category", package.name))
        })?;
        let atom = format!("{}/{}", category, package.name);
        let url = sources.package_url(category, &package.name);

        let result = batcher.item(|conn, watermark| {
            let body = fetch_document(fetcher, &url)?;
            let detail = parse_package_detail(&body)?;
            apply_package_detail(
                conn,
                &mut package,
                &detail,
                &mut resolver,
                options.keyword_removal,
                watermark,
            )
        });

        match result {
            Ok(changes) => {
                debug!(
                    "{}: +{} -{} versions, +{} -{} keywords",
                    atom,
                    changes.versions_created,
                    changes.versions_deleted,
                    changes.keywords_added,
                    changes.keywords_removed
                );
                stats.synced += 1;
                stats.versions_created += changes.versions_created;
                stats.versions_deleted += changes.versions_deleted;
            }
            Err(e) if is_scoped_failure(&e) => {
                warn!("Skipping {}: {}", atom, e);
                resolver.clear();
                stats.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    stats.batches = batcher.finish()?;
    info!(
        "Versions: {} packages synced, {} skipped, {} versions created, {} deleted",
        stats.synced, stats.skipped, stats.versions_created, stats.versions_deleted
    );
    Ok(stats)
}

/// Apply one validated package detail and stamp the package with `watermark`
pub fn apply_package_detail(
    conn: &Connection,
    package: &mut Package,
    detail: &PackageDetail,
    resolver: &mut MaintainerResolver,
    removal: KeywordRemoval,
    watermark: i64,
) -> Result<PackageChanges> {
    let package_id = package
        .id
        .ok_or_else(|| Error::InitError(format!("Package {} has no ID", package.name)))?;
    let mut changes = PackageChanges::default();

    if detail.description.is_some() && detail.description != package.description {
        package.description = detail.description.clone();
        package.update_description(conn)?;
    }

    // Flat resolution; an empty list leaves the package maintainer-needed
    let maintainer_ids = detail
        .maintainers
        .iter()
        .map(|m| resolver.resolve(conn, &m.email, m.kind, m.name.as_deref()))
        .collect::<Result<Vec<_>>>()?;
    package.set_maintainers(conn, &maintainer_ids)?;

    let mut existing: HashMap<String, PackageVersion> =
        PackageVersion::list_for_package(conn, package_id)?
            .into_iter()
            .map(|v| (v.version.clone(), v))
            .collect();

    let mut seen = HashSet::new();
    for record in &detail.versions {
        if !seen.insert(record.version.as_str()) {
            continue;
        }

        let version = match existing.remove(&record.version) {
            Some(version) => version,
            None => {
                let mut version = PackageVersion::new(package_id, record.version.clone());
                version.insert(conn)?;
                changes.versions_created += 1;
                version
            }
        };

        let (added, removed) = sync_keywords(conn, &version, &record.keywords, removal)?;
        changes.keywords_added += added;
        changes.keywords_removed += removed;
    }

    for version in existing.into_values() {
        version.delete(conn)?;
        changes.versions_deleted += 1;
    }

    package.set_last_sync(conn, watermark)?;
    Ok(changes)
}

/// Make `version`'s keyword set exactly `wanted`
///
/// Returns the number of keywords added and removed.
pub fn sync_keywords(
    conn: &Connection,
    version: &PackageVersion,
    wanted: &[String],
    removal: KeywordRemoval,
) -> Result<(usize, usize)> {
    let current: HashMap<String, Keyword> = version
        .keywords(conn)?
        .into_iter()
        .map(|k| (k.name.clone(), k))
        .collect();
    let wanted: HashSet<&str> = wanted.iter().map(String::as_str).collect();

    let mut added = 0;
    for name in &wanted {
        if current.contains_key(*name) {
            continue;
        }
        let keyword = Keyword::find_or_create(conn, name)?;
        if let Some(id) = keyword.id {
            version.add_keyword(conn, id)?;
            added += 1;
        }
    }

    let mut removed = 0;
    for (name, keyword) in &current {
        if wanted.contains(name.as_str()) {
            continue;
        }
        match removal {
            KeywordRemoval::Destroy => keyword.delete(conn)?,
            KeywordRemoval::Detach => {
                if let Some(id) = keyword.id {
                    version.remove_keyword(conn, id)?;
                    Keyword::delete_if_orphaned(conn, id)?;
                }
            }
        }
        removed += 1;
    }

    Ok((added, removed))
}
