// tests/sync_workflow.rs

//! End-to-end sync runs against the sample catalog.

mod common;

use common::{catalog_fetcher, package, setup_test_db, sources, version_strings};
use grumpy::db;
use grumpy::db::models::{Category, Keyword, Maintainer, Package, QualityViolation};
use grumpy::sync::{self, now_timestamp};
use grumpy::{GrumpyConfig, SyncOptions};
use std::time::Duration;

#[test]
fn test_full_sync_populates_mirror() {
    let (_temp_dir, db_path) = setup_test_db();
    let mut conn = db::open(&db_path).unwrap();
    let fetcher = catalog_fetcher();

    let report = sync::sync_all(&mut conn, &fetcher, &sources(), &SyncOptions::default()).unwrap();

    assert_eq!(report.categories.created, 3);
    assert_eq!(report.packages.created, 3);
    assert_eq!(report.packages.categories_synced, 2);
    assert_eq!(report.packages.categories_skipped, 1);
    assert_eq!(report.projects.projects, 3);
    assert_eq!(report.projects.member_edges, 4);
    assert_eq!(report.projects.cycles, 0);
    assert_eq!(report.versions.synced, 3);
    assert_eq!(report.versions.skipped, 0);
    assert_eq!(report.versions.versions_created, 4);
    assert_eq!(report.quality.inserted, 2);
    assert_eq!(report.quality.skipped, 1);

    let rust = package(&conn, "dev-lang", "rust");
    assert_eq!(rust.description.as_deref(), Some("Systems programming language"));
    assert!(rust.last_sync_ts > 0);
    assert_eq!(version_strings(&conn, &rust), vec!["1.75.0", "1.76.0"]);

    let mut maintainers: Vec<String> = rust
        .maintainers(&conn)
        .unwrap()
        .into_iter()
        .map(|m| m.email)
        .collect();
    maintainers.sort();
    assert_eq!(maintainers, vec!["alice@example.org", "toolchain@gentoo.org"]);

    // amd64, ~amd64, x86, ~x86
    assert_eq!(Keyword::count(&conn).unwrap(), 4);
    assert_eq!(
        QualityViolation::list_for_package(&conn, rust.id.unwrap())
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_emails_resolve_to_one_identity() {
    let (_temp_dir, db_path) = setup_test_db();
    let mut conn = db::open(&db_path).unwrap();
    let fetcher = catalog_fetcher();
    sync::sync_all(&mut conn, &fetcher, &sources(), &SyncOptions::default()).unwrap();

    // base-system, toolchain, python, alice, bob
    assert_eq!(Maintainer::count(&conn).unwrap(), 5);

    let alice = Maintainer::find_by_email(&conn, "ALICE@EXAMPLE.ORG")
        .unwrap()
        .unwrap();
    assert_eq!(alice.email, "alice@example.org");
    assert_eq!(alice.name.as_deref(), Some("Alice"));
    assert!(!alice.is_project);

    // Referenced as Alice@Example.org, alice@example.org and ALICE@example.org
    let packages: Vec<String> = Package::list_for_maintainer(&conn, alice.id.unwrap())
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(packages.len(), 2);
    assert!(packages.contains(&"rust".to_string()));
    assert!(packages.contains(&"vim".to_string()));

    let projects: Vec<String> = alice
        .projects(&conn)
        .unwrap()
        .into_iter()
        .map(|p| p.email)
        .collect();
    assert_eq!(projects, vec!["toolchain@gentoo.org"]);
}

#[test]
fn test_project_hierarchy() {
    let (_temp_dir, db_path) = setup_test_db();
    let mut conn = db::open(&db_path).unwrap();
    let fetcher = catalog_fetcher();
    sync::sync_all(&mut conn, &fetcher, &sources(), &SyncOptions::default()).unwrap();

    let base = Maintainer::find_by_email(&conn, "base-system@gentoo.org")
        .unwrap()
        .unwrap();
    let base_members = base.members(&conn).unwrap();
    assert_eq!(base_members.len(), 1);
    assert_eq!(base_members[0].email, "toolchain@gentoo.org");
    assert!(base_members[0].is_project);

    let toolchain = Maintainer::find_by_email(&conn, "toolchain@gentoo.org")
        .unwrap()
        .unwrap();
    assert_eq!(
        toolchain.url.as_deref(),
        Some("https://wiki.gentoo.org/wiki/Project:Toolchain")
    );
    assert_eq!(toolchain.members(&conn).unwrap().len(), 2);
    let leads = toolchain.leads(&conn).unwrap();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].email, "alice@example.org");

    assert_eq!(Maintainer::list_projects(&conn).unwrap().len(), 3);
    assert_eq!(Maintainer::list_people(&conn).unwrap().len(), 2);
}

#[test]
fn test_second_run_is_idempotent() {
    let (_temp_dir, db_path) = setup_test_db();
    let mut conn = db::open(&db_path).unwrap();
    let fetcher = catalog_fetcher();
    let sources = sources();
    sync::sync_all(&mut conn, &fetcher, &sources, &SyncOptions::default()).unwrap();

    let descriptions: Vec<Option<String>> = Category::list_all(&conn)
        .unwrap()
        .into_iter()
        .map(|c| c.description)
        .collect();
    let rust_before = package(&conn, "dev-lang", "rust");

    let report = sync::sync_all(&mut conn, &fetcher, &sources, &SyncOptions::default()).unwrap();
    assert_eq!(report.categories.created, 0);
    assert_eq!(report.categories.unchanged, 3);
    assert_eq!(report.packages.created, 0);
    // Everything was refreshed moments ago
    assert_eq!(report.versions.synced, 0);

    assert_eq!(Category::count(&conn).unwrap(), 3);
    assert_eq!(Package::count(&conn).unwrap(), 3);
    assert_eq!(Maintainer::count(&conn).unwrap(), 5);
    let descriptions_after: Vec<Option<String>> = Category::list_all(&conn)
        .unwrap()
        .into_iter()
        .map(|c| c.description)
        .collect();
    assert_eq!(descriptions, descriptions_after);
    assert_eq!(
        package(&conn, "dev-lang", "rust").last_sync_ts,
        rust_before.last_sync_ts
    );
}

#[test]
fn test_failed_package_is_retried_next_run() {
    let (_temp_dir, db_path) = setup_test_db();
    let mut conn = db::open(&db_path).unwrap();
    let mut fetcher = catalog_fetcher();
    let sources = sources();
    sync::sync_categories(&mut conn, &fetcher, &sources).unwrap();
    sync::sync_packages(&mut conn, &fetcher, &sources).unwrap();

    fetcher.remove(&sources.package_url("dev-lang", "python"));
    let now = now_timestamp();
    let stats = sync::sync_versions(&mut conn, &fetcher, &sources, &SyncOptions::default(), now)
        .unwrap();
    assert_eq!(stats.synced, 2);
    assert_eq!(stats.skipped, 1);

    let python = package(&conn, "dev-lang", "python");
    assert_eq!(python.last_sync_ts, 0);
    assert!(version_strings(&conn, &python).is_empty());

    let due = sync::due_packages(&conn, now, Duration::from_secs(3600), None).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].name, "python");
}

#[test]
fn test_stale_packages_converge_on_remote_versions() {
    let (_temp_dir, db_path) = setup_test_db();
    let mut conn = db::open(&db_path).unwrap();
    let mut fetcher = catalog_fetcher();
    let sources = sources();
    sync::sync_all(&mut conn, &fetcher, &sources, &SyncOptions::default()).unwrap();

    fetcher.insert(
        sources.package_url("dev-lang", "rust"),
        r#"{"maintainers": [], "versions": [
            {"version": "1.76.0", "keywords": ["amd64"]},
            {"version": "1.77.0", "keywords": ["~amd64"]}
        ]}"#,
    );

    let later = now_timestamp() + 2 * 3600;
    let stats = sync::sync_versions(&mut conn, &fetcher, &sources, &SyncOptions::default(), later)
        .unwrap();
    assert_eq!(stats.synced, 3);
    assert_eq!(stats.versions_created, 1);
    assert_eq!(stats.versions_deleted, 1);

    let rust = package(&conn, "dev-lang", "rust");
    assert_eq!(version_strings(&conn, &rust), vec!["1.76.0", "1.77.0"]);
    // Maintainer-needed
    assert!(rust.maintainers(&conn).unwrap().is_empty());
    // Absent from the payload, so kept
    assert_eq!(rust.description.as_deref(), Some("Systems programming language"));
}

#[test]
fn test_sync_with_config_file() {
    let (temp_dir, db_path) = setup_test_db();
    let config_path = temp_dir.path().join("grumpy.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[database]
path = "{db_path}"

[sources]
categories = "{mirror}/categories.json"
category_packages = "{mirror}/categories/{{category}}.json"
package = "{mirror}/packages/{{category}}/{{package}}.json"
projects = "{mirror}/projects.xml"
pkgcheck = "{mirror}/output.xml"

[sync]
batch_size = 1
keyword_removal = "detach"
"#,
            mirror = common::MIRROR
        ),
    )
    .unwrap();

    let config = GrumpyConfig::load(&config_path).unwrap();
    assert_eq!(config.sources, sources());

    let mut conn = db::open(&config.database.path).unwrap();
    let options = config.sync_options(Some(2)).unwrap();
    let report = sync::sync_all(&mut conn, &catalog_fetcher(), &config.sources, &options).unwrap();

    assert_eq!(report.versions.synced, 2);
    assert_eq!(report.versions.batches, 2);
    let remaining = sync::due_packages(&conn, now_timestamp(), Duration::from_secs(3600), None)
        .unwrap();
    assert_eq!(remaining.len(), 1);
}

#[test]
fn test_empty_detail_does_not_wipe_package() {
    let (_temp_dir, db_path) = setup_test_db();
    let mut conn = db::open(&db_path).unwrap();
    let mut fetcher = catalog_fetcher();
    let sources = sources();
    sync::sync_all(&mut conn, &fetcher, &sources, &SyncOptions::default()).unwrap();
    let before = package(&conn, "dev-lang", "rust");

    fetcher.insert(sources.package_url("dev-lang", "rust"), "{}");
    let later = now_timestamp() + 2 * 3600;
    let stats = sync::sync_versions(&mut conn, &fetcher, &sources, &SyncOptions::default(), later)
        .unwrap();
    assert_eq!(stats.synced, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.versions_deleted, 0);

    let after = package(&conn, "dev-lang", "rust");
    assert_eq!(after.last_sync_ts, before.last_sync_ts);
    assert_eq!(version_strings(&conn, &after), vec!["1.75.0", "1.76.0"]);
    assert_eq!(after.maintainers(&conn).unwrap().len(), 2);
}
