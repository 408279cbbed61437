// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: package refresh cap
fn limit_arg() -> Arg {
    Arg::new("limit")
        .short('l')
        .long("limit")
        .value_name("N")
        .help("Refresh at most this many packages")
}

fn build_cli() -> Command {
    Command::new("grumpy")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Grumpy Contributors")
        .about("Local mirror of the Gentoo package catalog")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Path to a TOML configuration file"),
        )
        .arg(
            Arg::new("db_path")
                .short('d')
                .long("db-path")
                .value_name("PATH")
                .global(true)
                .help("Path to the database file (overrides [database] path)"),
        )
        .subcommand(
            Command::new("init").about("Create the database and bring its schema up to date"),
        )
        .subcommand(
            Command::new("sync")
                .about("Sync categories, packages, projects, versions and the QA report")
                .arg(limit_arg()),
        )
        .subcommand(Command::new("sync-categories").about("Sync the category list"))
        .subcommand(
            Command::new("sync-packages").about("Sync the package list of every known category"),
        )
        .subcommand(Command::new("sync-projects").about("Sync the project hierarchy"))
        .subcommand(
            Command::new("sync-versions")
                .about("Refresh versions, keywords and maintainers of stale packages")
                .arg(limit_arg()),
        )
        .subcommand(
            Command::new("sync-pkgcheck")
                .about("Replace stored QA violations with the latest pkgcheck report"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory - use CARGO_MANIFEST_DIR which is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("grumpy.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
