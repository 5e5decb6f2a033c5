//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::company::CompanyCommand;
use crate::commands::entry::EntryCommand;
use crate::commands::project::ProjectCommand;
use crate::commands::task::TaskCommand;
use crate::commands::user::UserCommand;

/// Billable work tracker.
///
/// Tracks time against assigned tasks and computes hours and charges at
/// each user's hourly rate.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as the user with this email, overriding the configured user.
    #[arg(long = "as", value_name = "EMAIL", global = true)]
    pub as_user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage users.
    #[command(subcommand)]
    User(UserCommand),

    /// Manage companies.
    #[command(subcommand)]
    Company(CompanyCommand),

    /// Manage projects.
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage tasks.
    #[command(subcommand)]
    Task(TaskCommand),

    /// Track time entries.
    #[command(subcommand)]
    Entry(EntryCommand),

    /// Show your open entries.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show billable totals per task.
    Report {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_entry_pause_with_actor() {
        let cli = Cli::try_parse_from([
            "wt",
            "entry",
            "pause",
            "entry-1",
            "--at",
            "2 hours ago",
            "--as",
            "samwise@test.com",
        ])
        .unwrap();
        assert_eq!(cli.as_user.as_deref(), Some("samwise@test.com"));
        let Some(Commands::Entry(EntryCommand::Pause(args))) = cli.command else {
            panic!("expected entry pause");
        };
        assert_eq!(args.entry_id, "entry-1");
        assert_eq!(args.at.as_deref(), Some("2 hours ago"));
    }

    #[test]
    fn rejects_negative_rate() {
        let result = Cli::try_parse_from([
            "wt", "user", "add", "gollum@test.com", "--name", "Smeagol", "--rate", "-1",
        ]);
        assert!(result.is_err());
    }
}
