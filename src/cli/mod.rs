// src/cli/mod.rs
//! CLI definitions for grumpy
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `init` - Create and migrate the database
//! - `sync` - Run every sync step in order
//! - `sync-categories`, `sync-packages`, `sync-projects`, `sync-versions`,
//!   `sync-pkgcheck` - Run a single step

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grumpy")]
#[command(author = "Grumpy Contributors")]
#[command(version)]
#[command(about = "Local mirror of the Gentoo package catalog", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "GRUMPY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the database file (overrides [database] path)
    #[arg(short, long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and bring its schema up to date
    Init,

    /// Sync categories, packages, projects, versions and the QA report
    Sync {
        /// Refresh at most this many packages during the version step
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Sync the category list
    SyncCategories,

    /// Sync the package list of every known category
    SyncPackages,

    /// Sync the project hierarchy
    SyncProjects,

    /// Refresh versions, keywords and maintainers of stale packages
    SyncVersions {
        /// Refresh at most this many packages
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Replace stored QA violations with the latest pkgcheck report
    SyncPkgcheck,
}
