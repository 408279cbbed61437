// src/sync/pkgcheck.rs

//! QA report reconciliation
//!
//! The pkgcheck report is a complete snapshot, so the violation table is
//! replaced wholesale on every run: delete everything, then insert every
//! result whose scope resolves. Both happen in one transaction.

use crate::db;
use crate::db::models::{Category, Package, PackageVersion, QualityViolation};
use crate::error::{Error, Result};
use crate::sync::client::{Fetch, Sources, fetch_document};
use crate::sync::parsers::pkgcheck::{CheckResult, parse_checks};
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::{debug, info};

/// Outcome of a QA report sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityStats {
    pub removed: usize,
    pub inserted: usize,
    pub skipped: usize,
}

/// How deep a result's references resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Scope {
    category_id: Option<i64>,
    package_id: Option<i64>,
    version_id: Option<i64>,
}

/// Memoized name lookups for one report
#[derive(Default)]
struct ScopeResolver {
    categories: HashMap<String, Option<i64>>,
    packages: HashMap<(i64, String), Option<i64>>,
    versions: HashMap<(i64, String), Option<i64>>,
}

impl ScopeResolver {
    /// Resolve category, then package, then version
    ///
    /// A level the result leaves out ends the scope there. A level that is
    /// named but not stored is a `NotFound` error for this result.
    fn resolve(&mut self, conn: &Connection, result: &CheckResult) -> Result<Scope> {
        let mut scope = Scope::default();

        let Some(category) = result.category.as_deref() else {
            return Ok(scope);
        };
        let category_id = match self.categories.get(category).copied() {
            Some(cached) => cached,
            None => {
                let id = Category::find_by_name(conn, category)?.and_then(|c| c.id);
                self.categories.insert(category.to_string(), id);
                id
            }
        }
        .ok_or_else(|| Error::NotFound(format!("category {category}")))?;
        scope.category_id = Some(category_id);

        let Some(package) = result.package.as_deref() else {
            return Ok(scope);
        };
        let package_key = (category_id, package.to_string());
        let package_id = match self.packages.get(&package_key).copied() {
            Some(cached) => cached,
            None => {
                let id = Package::find(conn, category_id, package)?.and_then(|p| p.id);
                self.packages.insert(package_key, id);
                id
            }
        }
        .ok_or_else(|| Error::NotFound(format!("package {category}/{package}")))?;
        scope.package_id = Some(package_id);

        let Some(version) = result.version.as_deref() else {
            return Ok(scope);
        };
        let version_key = (package_id, version.to_string());
        let version_id = match self.versions.get(&version_key).copied() {
            Some(cached) => cached,
            None => {
                let id = PackageVersion::find(conn, package_id, version)?.and_then(|v| v.id);
                self.versions.insert(version_key, id);
                id
            }
        }
        .ok_or_else(|| Error::NotFound(format!("version {category}/{package}-{version}")))?;
        scope.version_id = Some(version_id);

        Ok(scope)
    }
}

/// Fetch the pkgcheck report and replace all stored violations
///
/// A failed fetch or a malformed report aborts before the old violations
/// are deleted.
pub fn sync_pkgcheck(
    conn: &mut Connection,
    fetcher: &dyn Fetch,
    sources: &Sources,
) -> Result<QualityStats> {
    info!("Syncing QA report from {}", sources.pkgcheck);

    let body = fetch_document(fetcher, &sources.pkgcheck)?;
    let results = parse_checks(&body)?;

    let stats = db::transaction(conn, |tx| replace_violations(tx, &results))?;
    info!(
        "QA report: {} violations stored, {} unresolved, {} replaced",
        stats.inserted, stats.skipped, stats.removed
    );
    Ok(stats)
}

/// Delete every stored violation and insert the resolvable `results`
pub fn replace_violations(conn: &Connection, results: &[CheckResult]) -> Result<QualityStats> {
    let mut stats = QualityStats {
        removed: QualityViolation::delete_all(conn)?,
        ..Default::default()
    };

    let mut resolver = ScopeResolver::default();
    for result in results {
        let scope = match resolver.resolve(conn, result) {
            Ok(scope) => scope,
            Err(Error::NotFound(what)) => {
                debug!("Skipping {} result: {} not found", result.class, what);
                stats.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut violation = QualityViolation::new(result.class.clone(), result.message.clone());
        violation.category_id = scope.category_id;
        violation.package_id = scope.package_id;
        violation.version_id = scope.version_id;
        violation.insert(conn)?;
        stats.inserted += 1;
    }
    Ok(stats)
}
