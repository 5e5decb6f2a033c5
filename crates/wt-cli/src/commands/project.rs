//! Project records.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use wt_core::CompanyId;
use wt_db::Database;

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// Add a project for a company.
    Add(AddProjectArgs),
    /// List projects.
    List,
}

#[derive(Debug, Args)]
pub struct AddProjectArgs {
    pub name: String,
    /// ID of the owning company.
    #[arg(long)]
    pub company: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, command: &ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Add(args) => {
            let company_id = CompanyId::new(args.company.as_str())?;
            let project = db.create_project(&company_id, &args.name, &args.description)?;
            writeln!(writer, "Created project {} ({})", project.name, project.id)?;
        }
        ProjectCommand::List => {
            let projects = db.list_projects()?;
            if projects.is_empty() {
                writeln!(writer, "No projects.")?;
            }
            for project in projects {
                writeln!(
                    writer,
                    "{:<32} {}  company {}",
                    project.name, project.id, project.company_id
                )?;
            }
        }
    }
    Ok(())
}
