// src/sync/categories.rs

//! Category catalog reconciliation

use crate::db;
use crate::db::models::Category;
use crate::error::Result;
use crate::sync::client::{Fetch, Sources, fetch_document};
use crate::sync::parsers::catalog::{CategoryRecord, parse_categories};
use rusqlite::Connection;
use std::collections::HashMap;
use tracing::info;

/// Outcome of a category sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryStats {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Fetch the categories list and reconcile it in one transaction
///
/// Categories missing from the remote list are kept. A failed fetch or a
/// malformed list aborts before anything is written.
pub fn sync_categories(
    conn: &mut Connection,
    fetcher: &dyn Fetch,
    sources: &Sources,
) -> Result<CategoryStats> {
    info!("Syncing categories from {}", sources.categories);

    let body = fetch_document(fetcher, &sources.categories)?;
    let records = parse_categories(&body)?;

    let stats = db::transaction(conn, |tx| apply_categories(tx, &records))?;
    info!(
        "Categories: {} created, {} updated, {} unchanged",
        stats.created, stats.updated, stats.unchanged
    );
    Ok(stats)
}

/// Reconcile parsed category records against the stored categories
pub fn apply_categories(conn: &Connection, records: &[CategoryRecord]) -> Result<CategoryStats> {
    let mut existing: HashMap<String, Category> = Category::list_all(conn)?
        .into_iter()
        .map(|c| (c.name.clone(), c))
        .collect();

    let mut stats = CategoryStats::default();
    for record in records {
        match existing.get_mut(&record.name) {
            Some(category) if category.description == record.description => {
                stats.unchanged += 1;
            }
            Some(category) => {
                category.description = record.description.clone();
                category.update_description(conn)?;
                stats.updated += 1;
            }
            None => {
                let mut category = Category::new(record.name.clone(), record.description.clone());
                category.insert(conn)?;
                existing.insert(category.name.clone(), category);
                stats.created += 1;
            }
        }
    }
    Ok(stats)
}
