//! Status command: what is being tracked right now.

use std::io::Write;

use anyhow::Result;
use wt_core::UserId;
use wt_db::Database;

use super::entry::write_entry_table;

pub fn run<W: Write>(writer: &mut W, db: &Database, actor: &UserId, json: bool) -> Result<()> {
    let open = db.list_open_entries(actor)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&open)?)?;
        return Ok(());
    }
    if open.is_empty() {
        writeln!(writer, "No open entries.")?;
        return Ok(());
    }
    writeln!(writer, "OPEN ENTRIES")?;
    write_entry_table(writer, &open)
}
