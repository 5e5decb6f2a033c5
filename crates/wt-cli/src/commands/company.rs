//! Company records.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use wt_db::Database;

#[derive(Debug, Subcommand)]
pub enum CompanyCommand {
    /// Add a client company.
    Add(AddCompanyArgs),
    /// List companies.
    List,
}

#[derive(Debug, Args)]
pub struct AddCompanyArgs {
    pub name: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, command: &CompanyCommand) -> Result<()> {
    match command {
        CompanyCommand::Add(args) => {
            let company = db.create_company(&args.name, &args.description)?;
            writeln!(writer, "Created company {} ({})", company.name, company.id)?;
        }
        CompanyCommand::List => {
            let companies = db.list_companies()?;
            if companies.is_empty() {
                writeln!(writer, "No companies.")?;
            }
            for company in companies {
                writeln!(writer, "{:<32} {}", company.name, company.id)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_list() {
        let mut db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        let add = CompanyCommand::Add(AddCompanyArgs {
            name: "Mordor, Inc.".to_string(),
            description: String::new(),
        });
        run(&mut output, &mut db, &add).unwrap();
        let id = db.list_companies().unwrap()[0].id.to_string();

        let mut listing = Vec::new();
        run(&mut listing, &mut db, &CompanyCommand::List).unwrap();
        let listing = String::from_utf8(listing).unwrap().replace(&id, "[ID]");
        assert_eq!(listing, format!("{:<32} [ID]\n", "Mordor, Inc."));
    }
}
