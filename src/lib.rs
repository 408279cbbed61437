// src/lib.rs

//! Grumpy: a local mirror of the Gentoo package catalog
//!
//! Keeps categories, packages, versions, keywords, the maintainer/project
//! hierarchy and pkgcheck QA results in a SQLite database, reconciled
//! against the JSON and XML documents published by packages.gentoo.org,
//! api.gentoo.org and qa-reports.gentoo.org.
//!
//! # Architecture
//!
//! - `sync::parsers`: remote documents become validated records first
//! - `sync::*`: one reconciler per document kind, each independently runnable
//! - `sync::batch`: long runs commit in bounded batches, crash loses one batch
//! - `db`: versioned schema and one model per table

pub mod config;
pub mod db;
mod error;
pub mod sync;

pub use config::GrumpyConfig;
pub use error::{Error, Result};
pub use sync::{
    Fetch, HttpFetcher, KeywordRemoval, Sources, StaticFetcher, SyncOptions, SyncReport, sync_all,
};
