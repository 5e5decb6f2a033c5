//! User registration and listing.

use std::io::Write;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use wt_core::HourlyRate;
use wt_db::Database;

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a user.
    Add(AddUserArgs),
    /// List users.
    List,
}

#[derive(Debug, Args)]
pub struct AddUserArgs {
    /// Email address, unique per user.
    pub email: String,
    /// Display name.
    #[arg(long)]
    pub name: String,
    /// Hourly rate used to bill this user's entries.
    #[arg(long, default_value = "0")]
    pub rate: HourlyRate,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, command: &UserCommand) -> Result<()> {
    match command {
        UserCommand::Add(args) => add(writer, db, args),
        UserCommand::List => list(writer, db),
    }
}

fn add<W: Write>(writer: &mut W, db: &mut Database, args: &AddUserArgs) -> Result<()> {
    if args.email.trim().is_empty() {
        bail!("email cannot be empty");
    }
    let user = db.create_user(&args.email, &args.name, args.rate)?;
    writeln!(writer, "Created user {} ({})", user.email, user.id)?;
    Ok(())
}

fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let users = db.list_users()?;
    if users.is_empty() {
        writeln!(writer, "No users.")?;
        return Ok(());
    }
    for user in users {
        writeln!(
            writer,
            "{:<28} {:<24} {:>10}  {}",
            user.email,
            user.name,
            user.rate.to_string(),
            user.id
        )?;
    }
    Ok(())
}
