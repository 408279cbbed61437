// src/commands/sync.rs
//! Sync commands: one per reconciler, plus `sync` running them all

use super::{http_fetcher, open_db};
use anyhow::Result;
use grumpy::GrumpyConfig;
use grumpy::sync::{
    self, CategoryStats, PackageStats, ProjectStats, QualityStats, VersionStats,
};
use tracing::info;

/// Run every sync step in dependency order
pub fn cmd_sync(config: &GrumpyConfig, db_path: &str, limit: Option<usize>) -> Result<()> {
    info!("Running full sync into {}", db_path);
    let mut conn = open_db(db_path)?;
    let fetcher = http_fetcher(config)?;
    let options = config.sync_options(limit)?;

    let report = sync::sync_all(&mut conn, &fetcher, &config.sources, &options)?;
    print_categories(&report.categories);
    print_packages(&report.packages);
    print_projects(&report.projects);
    print_versions(&report.versions);
    print_quality(&report.quality);
    Ok(())
}

/// Sync the category list
pub fn cmd_sync_categories(config: &GrumpyConfig, db_path: &str) -> Result<()> {
    info!("Syncing categories into {}", db_path);
    let mut conn = open_db(db_path)?;
    let fetcher = http_fetcher(config)?;

    let stats = sync::sync_categories(&mut conn, &fetcher, &config.sources)?;
    print_categories(&stats);
    Ok(())
}

/// Sync the package list of every stored category
pub fn cmd_sync_packages(config: &GrumpyConfig, db_path: &str) -> Result<()> {
    info!("Syncing package lists into {}", db_path);
    let mut conn = open_db(db_path)?;
    let fetcher = http_fetcher(config)?;

    let stats = sync::sync_packages(&mut conn, &fetcher, &config.sources)?;
    print_packages(&stats);
    Ok(())
}

/// Sync the project hierarchy
pub fn cmd_sync_projects(config: &GrumpyConfig, db_path: &str) -> Result<()> {
    info!("Syncing projects into {}", db_path);
    let mut conn = open_db(db_path)?;
    let fetcher = http_fetcher(config)?;

    let stats = sync::sync_projects(&mut conn, &fetcher, &config.sources)?;
    print_projects(&stats);
    Ok(())
}

/// Refresh stale packages
pub fn cmd_sync_versions(config: &GrumpyConfig, db_path: &str, limit: Option<usize>) -> Result<()> {
    info!("Syncing versions into {}", db_path);
    let mut conn = open_db(db_path)?;
    let fetcher = http_fetcher(config)?;
    let options = config.sync_options(limit)?;

    let stats = sync::sync_versions(
        &mut conn,
        &fetcher,
        &config.sources,
        &options,
        sync::now_timestamp(),
    )?;
    print_versions(&stats);
    Ok(())
}

/// Replace stored QA violations
pub fn cmd_sync_pkgcheck(config: &GrumpyConfig, db_path: &str) -> Result<()> {
    info!("Syncing QA report into {}", db_path);
    let mut conn = open_db(db_path)?;
    let fetcher = http_fetcher(config)?;

    let stats = sync::sync_pkgcheck(&mut conn, &fetcher, &config.sources)?;
    print_quality(&stats);
    Ok(())
}

fn print_categories(stats: &CategoryStats) {
    println!("Categories:");
    println!("  Created: {}", stats.created);
    println!("  Updated: {}", stats.updated);
    println!("  Unchanged: {}", stats.unchanged);
}

fn print_packages(stats: &PackageStats) {
    println!("Packages:");
    println!("  Created: {}", stats.created);
    println!("  Categories synced: {}", stats.categories_synced);
    if stats.categories_skipped > 0 {
        println!("  Categories skipped: {}", stats.categories_skipped);
    }
}

fn print_projects(stats: &ProjectStats) {
    println!("Projects:");
    println!("  Projects: {}", stats.projects);
    println!("  Member edges: {}", stats.member_edges);
    println!("  New maintainers: {}", stats.maintainers_created);
    if stats.cycles > 0 {
        println!("  Membership cycles: {}", stats.cycles);
    }
}

fn print_versions(stats: &VersionStats) {
    println!("Versions:");
    println!("  Packages refreshed: {}", stats.synced);
    println!("  Versions added: {}", stats.versions_created);
    println!("  Versions removed: {}", stats.versions_deleted);
    println!("  Batches committed: {}", stats.batches);
    if stats.skipped > 0 {
        println!("  Packages skipped: {}", stats.skipped);
    }
}

fn print_quality(stats: &QualityStats) {
    println!("QA report:");
    println!("  Violations stored: {}", stats.inserted);
    println!("  Previous violations removed: {}", stats.removed);
    if stats.skipped > 0 {
        println!("  Unresolved results: {}", stats.skipped);
    }
}
