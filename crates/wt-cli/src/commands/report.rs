//! Report command: billable totals per task.

use std::collections::HashMap;
use std::io::Write;

use anyhow::Result;
use wt_core::{Summary, UserId, summarize};
use wt_db::Database;

use super::util::format_seconds;

/// Builds the summary of `actor`'s stored entries.
pub fn build_summary(db: &Database, actor: &UserId) -> Result<Summary> {
    let entries = db.list_entries(actor)?;
    Ok(summarize(&entries))
}

pub fn run<W: Write>(writer: &mut W, db: &Database, actor: &UserId, json: bool) -> Result<()> {
    let summary = build_summary(db, actor)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
        return Ok(());
    }

    let labels: HashMap<_, _> = db
        .list_tasks(Some(actor))?
        .into_iter()
        .map(|task| (task.id, format!("{} {}", task.code, task.name)))
        .collect();

    writeln!(writer, "BILLABLES REPORT")?;
    if summary.tasks.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No entries recorded.")?;
        return Ok(());
    }
    writeln!(
        writer,
        "{:<32} {:>7} {:>5} {:>12} {:>12} {:>10}",
        "TASK", "ENTRIES", "OPEN", "TIME", "HOURS", "BILL"
    )?;
    let mut rows: Vec<_> = summary
        .tasks
        .iter()
        .map(|task| {
            let label = labels
                .get(&task.task_id)
                .map_or_else(|| task.task_id.to_string(), Clone::clone);
            (label, task)
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    for (label, task) in rows {
        writeln!(
            writer,
            "{:<32} {:>7} {:>5} {:>12} {:>12} {:>10}",
            label,
            task.entries,
            task.open_entries,
            format_seconds(task.totals.total_time),
            task.totals.hours.to_string(),
            task.totals.bill.to_string(),
        )?;
    }
    writeln!(
        writer,
        "{:<32} {:>7} {:>5} {:>12} {:>12} {:>10}",
        "TOTAL",
        summary.entries,
        summary.open_entries,
        format_seconds(summary.totals.total_time),
        summary.totals.hours.to_string(),
        summary.totals.bill.to_string(),
    )?;
    Ok(())
}
