// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use grumpy::GrumpyConfig;

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = GrumpyConfig::load_or_default(cli.config.as_deref())?;
    let db_path = cli
        .db_path
        .clone()
        .unwrap_or_else(|| config.database.path.clone());

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Sync { limit } => commands::cmd_sync(&config, &db_path, limit),
        Commands::SyncCategories => commands::cmd_sync_categories(&config, &db_path),
        Commands::SyncPackages => commands::cmd_sync_packages(&config, &db_path),
        Commands::SyncProjects => commands::cmd_sync_projects(&config, &db_path),
        Commands::SyncVersions { limit } => commands::cmd_sync_versions(&config, &db_path, limit),
        Commands::SyncPkgcheck => commands::cmd_sync_pkgcheck(&config, &db_path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "grumpy",
            "sync-versions",
            "--limit",
            "10",
            "--db-path",
            "/tmp/g.db",
        ])
        .unwrap();
        assert_eq!(cli.db_path.as_deref(), Some("/tmp/g.db"));
        assert!(matches!(cli.command, Commands::SyncVersions { limit: Some(10) }));
    }
}
