use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::commands::{company, entry, project, report, status, task, user, util};
use wt_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(wt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let acting_as = cli.as_user.as_deref().or(config.user.as_deref());
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::User(command) => user::run(&mut stdout, &mut db, command)?,
        Commands::Company(command) => company::run(&mut stdout, &mut db, command)?,
        Commands::Project(command) => project::run(&mut stdout, &mut db, command)?,
        Commands::Task(command) => task::run(&mut stdout, &mut db, command)?,
        Commands::Entry(command) => {
            let actor = util::resolve_actor(&db, acting_as)?;
            entry::run(&mut stdout, &mut db, &actor, command)?;
        }
        Commands::Status { json } => {
            let actor = util::resolve_actor(&db, acting_as)?;
            status::run(&mut stdout, &db, &actor, *json)?;
        }
        Commands::Report { json } => {
            let actor = util::resolve_actor(&db, acting_as)?;
            report::run(&mut stdout, &db, &actor, *json)?;
        }
    }

    Ok(())
}
