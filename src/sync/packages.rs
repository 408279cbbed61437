// src/sync/packages.rs

//! Package catalog reconciliation
//!
//! Walks every stored category and creates packages that appear in its
//! remote package list. Existing packages are left as they are: their
//! descriptions are refreshed by the version sync, not here.

use crate::db;
use crate::db::models::{Category, Package};
use crate::error::{Error, Result};
use crate::sync::client::{Fetch, Sources, fetch_document};
use crate::sync::is_scoped_failure;
use crate::sync::parsers::catalog::parse_package_list;
use rusqlite::Connection;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Outcome of a package sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackageStats {
    pub categories_synced: usize,
    pub categories_skipped: usize,
    pub created: usize,
}

/// Create packages listed remotely for every known category
///
/// A category whose list cannot be fetched, is malformed or is empty is
/// skipped; the others are still processed. Everything is committed once at
/// the end.
pub fn sync_packages(
    conn: &mut Connection,
    fetcher: &dyn Fetch,
    sources: &Sources,
) -> Result<PackageStats> {
    let stats = db::transaction(conn, |tx| {
        let categories = Category::list_all(tx)?;
        info!("Syncing packages for {} categories", categories.len());

        let mut stats = PackageStats::default();
        for category in &categories {
            let url = sources.category_packages_url(&category.name);
            let fetched = fetch_document(fetcher, &url).and_then(|body| parse_package_list(&body));
            let names = match fetched {
                Ok(names) if names.is_empty() => {
                    warn!("Skipping category {}: empty package list", category.name);
                    stats.categories_skipped += 1;
                    continue;
                }
                Ok(names) => names,
                Err(e) if is_scoped_failure(&e) => {
                    warn!("Skipping category {}: {}", category.name, e);
                    stats.categories_skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let created = apply_package_names(tx, category, &names)?;
            debug!("{}: {} new packages", category.name, created);
            stats.created += created;
            stats.categories_synced += 1;
        }
        Ok(stats)
    })?;

    info!(
        "Packages: {} created across {} categories ({} skipped)",
        stats.created, stats.categories_synced, stats.categories_skipped
    );
    Ok(stats)
}

/// Create the packages of `category` that are not stored yet
pub fn apply_package_names(
    conn: &Connection,
    category: &Category,
    names: &[String],
) -> Result<usize> {
    let category_id = category.id.ok_or_else(|| {
        Error::InitError(format!("Category {} has no ID", category.name))
    })?;

    let mut known: HashSet<String> = Package::list_for_category(conn, category_id)?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut created = 0;
    for name in names {
        if known.contains(name) {
            continue;
        }
        let mut package = Package::new(category_id, name.clone());
        package.insert(conn)?;
        known.insert(name.clone());
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::client::StaticFetcher;

    fn setup() -> (Connection, StaticFetcher, Sources) {
        let conn = db::open_in_memory().unwrap();
        for name in ["dev-lang", "app-misc", "sys-apps"] {
            Category::new(name.to_string(), None).insert(&conn).unwrap();
        }
        (conn, StaticFetcher::new(), Sources::default())
    }

    #[test]
    fn test_failed_category_is_skipped() {
        let (mut conn, mut fetcher, sources) = setup();
        fetcher.insert(
            sources.category_packages_url("dev-lang"),
            r#"{"packages": [{"name": "rust"}, {"name": "go"}]}"#,
        );
        fetcher.insert(sources.category_packages_url("app-misc"), r#"{"packages": []}"#);
        // sys-apps is not served at all

        let stats = sync_packages(&mut conn, &fetcher, &sources).unwrap();
        assert_eq!(
            stats,
            PackageStats {
                categories_synced: 1,
                categories_skipped: 2,
                created: 2
            }
        );

        let dev_lang = Category::find_by_name(&conn, "dev-lang").unwrap().unwrap();
        let packages = Package::list_for_category(&conn, dev_lang.id.unwrap()).unwrap();
        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["go", "rust"]);
        assert!(packages.iter().all(|p| p.last_sync_ts == 0));
    }

    #[test]
    fn test_existing_packages_untouched() {
        let (mut conn, mut fetcher, sources) = setup();
        let dev_lang = Category::find_by_name(&conn, "dev-lang").unwrap().unwrap();

        let mut rust = Package::new(dev_lang.id.unwrap(), "rust".to_string());
        rust.description = Some("kept".to_string());
        rust.insert(&conn).unwrap();
        rust.set_last_sync(&conn, 42).unwrap();

        fetcher.insert(
            sources.category_packages_url("dev-lang"),
            r#"{"packages": [{"name": "rust"}, {"name": "python"}]}"#,
        );
        let stats = sync_packages(&mut conn, &fetcher, &sources).unwrap();
        assert_eq!(stats.created, 1);

        let stored = Package::find(&conn, dev_lang.id.unwrap(), "rust").unwrap().unwrap();
        assert_eq!(stored.description.as_deref(), Some("kept"));
        assert_eq!(stored.last_sync_ts, 42);
    }
}
