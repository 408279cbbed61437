// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use grumpy::db;
use grumpy::db::models::{Category, Package, PackageVersion};
use grumpy::{Fetch, Sources, StaticFetcher};
use rusqlite::Connection;
use std::cell::Cell;
use tempfile::TempDir;

/// Host every fixture document is served from
pub const MIRROR: &str = "http://mirror.test";

/// Create an empty, migrated database on disk.
///
/// Returns (TempDir, db_path) - keep the TempDir alive to prevent cleanup.
pub fn setup_test_db() -> (TempDir, String) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir
        .path()
        .join("grumpy.db")
        .to_str()
        .unwrap()
        .to_string();

    db::init(&db_path).unwrap();
    (temp_dir, db_path)
}

pub fn sources() -> Sources {
    Sources::rooted_at(MIRROR)
}

pub const CATEGORIES_JSON: &str = r#"[
  {"name": "dev-lang", "description": "Programming languages"},
  {"name": "app-editors", "description": "Text editors"},
  {"name": "sys-empty"}
]"#;

pub const DEV_LANG_JSON: &str = r#"{
  "name": "dev-lang",
  "packages": [{"name": "rust"}, {"name": "python"}]
}"#;

pub const APP_EDITORS_JSON: &str = r#"{
  "name": "app-editors",
  "packages": [{"name": "vim", "description": "Vim"}]
}"#;

pub const RUST_JSON: &str = r#"{
  "description": "Systems programming language",
  "maintainers": [
    {"email": "Toolchain@Gentoo.org", "type": "project", "name": "Toolchain"},
    {"email": "alice@example.org", "type": "person", "name": "Alice"}
  ],
  "versions": [
    {"version": "1.75.0", "keywords": ["amd64", "~x86"]},
    {"version": "1.76.0", "keywords": ["~amd64", "~x86"]}
  ]
}"#;

pub const PYTHON_JSON: &str = r#"{
  "description": "Interpreted language",
  "maintainers": [{"email": "python@gentoo.org", "type": "project"}],
  "versions": [{"version": "3.12.1", "keywords": ["amd64", "x86"]}]
}"#;

pub const VIM_JSON: &str = r#"{
  "description": "Vi improved",
  "maintainers": [{"email": "ALICE@example.org", "type": "person"}],
  "versions": [{"version": "9.1", "keywords": ["amd64", "x86"]}]
}"#;

pub const PROJECTS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<projects>
  <project>
    <email>base-system@gentoo.org</email>
    <name>Base System</name>
    <subproject ref="toolchain@gentoo.org" inherit-members="1"/>
  </project>
  <project>
    <email>toolchain@gentoo.org</email>
    <name>Toolchain</name>
    <url>https://wiki.gentoo.org/wiki/Project:Toolchain</url>
    <member is-lead="1"><email>Alice@Example.org</email><name>Alice</name></member>
    <member><email>bob@example.org</email><name>Bob</name></member>
  </project>
  <project>
    <email>python@gentoo.org</email>
    <name>Python</name>
    <member><email>bob@example.org</email></member>
    <extra>ignored</extra>
  </project>
</projects>"#;

pub const PKGCHECK_XML: &str = r#"<checks>
  <result><category>dev-lang</category><package>rust</package><version>1.75.0</version>
    <class>MissingLicense</class><msg>no license</msg></result>
  <result><category>app-editors</category><package>vim</package>
    <class>StaleUnstable</class><msg>stale keywords</msg></result>
  <result><category>dev-lang</category><package>perl</package>
    <class>Gone</class><msg>unknown package</msg></result>
</checks>"#;

/// A fetcher serving the whole sample catalog
pub fn catalog_fetcher() -> StaticFetcher {
    let sources = sources();
    let mut fetcher = StaticFetcher::new();
    fetcher.insert(sources.categories.clone(), CATEGORIES_JSON);
    fetcher.insert(sources.category_packages_url("dev-lang"), DEV_LANG_JSON);
    fetcher.insert(sources.category_packages_url("app-editors"), APP_EDITORS_JSON);
    fetcher.insert(sources.package_url("dev-lang", "rust"), RUST_JSON);
    fetcher.insert(sources.package_url("dev-lang", "python"), PYTHON_JSON);
    fetcher.insert(sources.package_url("app-editors", "vim"), VIM_JSON);
    fetcher.insert(sources.projects.clone(), PROJECTS_XML);
    fetcher.insert(sources.pkgcheck.clone(), PKGCHECK_XML);
    fetcher
}

/// Look up a package by atom, panicking if it is missing
pub fn package(conn: &Connection, category: &str, name: &str) -> Package {
    let category = Category::find_by_name(conn, category).unwrap().unwrap();
    Package::find(conn, category.id.unwrap(), name)
        .unwrap()
        .unwrap()
}

/// Stored version strings of a package
pub fn version_strings(conn: &Connection, package: &Package) -> Vec<String> {
    PackageVersion::list_for_package(conn, package.id.unwrap())
        .unwrap()
        .into_iter()
        .map(|v| v.version)
        .collect()
}

/// Stored keyword names of one version, sorted
pub fn keyword_names(conn: &Connection, version: &PackageVersion) -> Vec<String> {
    let mut names: Vec<String> = version
        .keywords(conn)
        .unwrap()
        .into_iter()
        .map(|k| k.name)
        .collect();
    names.sort();
    names
}

/// Wraps a fetcher and panics once `budget` fetches have been served,
/// simulating a process killed mid-run.
pub struct CrashingFetcher<'a> {
    inner: &'a dyn Fetch,
    budget: Cell<usize>,
}

impl<'a> CrashingFetcher<'a> {
    pub fn new(inner: &'a dyn Fetch, budget: usize) -> Self {
        Self {
            inner,
            budget: Cell::new(budget),
        }
    }
}

impl Fetch for CrashingFetcher<'_> {
    fn fetch(&self, url: &str) -> grumpy::Result<String> {
        let remaining = self.budget.get();
        if remaining == 0 {
            panic!("simulated crash while fetching {url}");
        }
        self.budget.set(remaining - 1);
        self.inner.fetch(url)
    }
}
