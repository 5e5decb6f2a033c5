//! Time entry commands: live tracking, manual entries and queries.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use wt_core::{Entry, EntryAction, EntryId, TaskId, TransitionRequest, UserId};
use wt_db::Database;

use super::util::{format_seconds, format_time, parse_datetime_at, time_or_now};

#[derive(Debug, Subcommand)]
pub enum EntryCommand {
    /// Start tracking time on a task.
    Start {
        task_id: String,
        /// Start time (RFC 3339 or e.g. "20 minutes ago"); defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Pause an active entry.
    Pause(TransitionArgs),
    /// Resume a paused entry.
    Resume(TransitionArgs),
    /// Complete an active or paused entry.
    Complete(TransitionArgs),
    /// Record a finished interval of work.
    Manual(ManualArgs),
    /// List your entries.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one entry.
    Show {
        entry_id: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct TransitionArgs {
    pub entry_id: String,
    /// When the transition happened; defaults to now.
    #[arg(long)]
    pub at: Option<String>,
}

#[derive(Debug, Args)]
pub struct ManualArgs {
    pub task_id: String,
    #[arg(long)]
    pub start: String,
    /// End of the interval; defaults to now.
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long, default_value = "")]
    pub comment: String,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    actor: &UserId,
    command: &EntryCommand,
) -> Result<()> {
    run_at(writer, db, actor, command, Utc::now())
}

/// Like [`run`], with an explicit current time.
pub fn run_at<W: Write>(
    writer: &mut W,
    db: &mut Database,
    actor: &UserId,
    command: &EntryCommand,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        EntryCommand::Start { task_id, at } => {
            let start_time = time_or_now(at.as_deref(), now)?;
            let entry = db.start_entry_at(actor, &TaskId::new(task_id.as_str())?, start_time, now)?;
            writeln!(writer, "Started entry {}", entry.id)?;
            write_entry(writer, &entry)?;
        }
        EntryCommand::Pause(args) => transition(writer, db, actor, EntryAction::Pause, args, now)?,
        EntryCommand::Resume(args) => transition(writer, db, actor, EntryAction::Resume, args, now)?,
        EntryCommand::Complete(args) => {
            transition(writer, db, actor, EntryAction::Complete, args, now)?;
        }
        EntryCommand::Manual(args) => {
            let start_time = parse_datetime_at(&args.start, now)?;
            let end_time = time_or_now(args.end.as_deref(), now)?;
            let entry = db.create_manual_entry_at(
                actor,
                &TaskId::new(args.task_id.as_str())?,
                start_time,
                end_time,
                &args.comment,
                now,
            )?;
            writeln!(writer, "Recorded entry {}", entry.id)?;
            write_entry(writer, &entry)?;
        }
        EntryCommand::List { json } => {
            let entries = db.list_entries(actor)?;
            if *json {
                writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
            } else {
                write_entry_table(writer, &entries)?;
            }
        }
        EntryCommand::Show { entry_id, json } => {
            let entry = db.get_entry(actor, &EntryId::new(entry_id.as_str())?)?;
            if *json {
                writeln!(writer, "{}", serde_json::to_string_pretty(&entry)?)?;
            } else {
                write_entry(writer, &entry)?;
            }
        }
    }
    Ok(())
}

fn transition<W: Write>(
    writer: &mut W,
    db: &mut Database,
    actor: &UserId,
    action: EntryAction,
    args: &TransitionArgs,
    now: DateTime<Utc>,
) -> Result<()> {
    let request = TransitionRequest {
        action,
        entry_time: time_or_now(args.at.as_deref(), now)?,
    };
    let entry = db.transition_entry_at(actor, &EntryId::new(args.entry_id.as_str())?, request, now)?;
    let verb = match action {
        EntryAction::Pause => "Paused",
        EntryAction::Resume => "Resumed",
        EntryAction::Complete => "Completed",
    };
    writeln!(writer, "{verb} entry {}", entry.id)?;
    write_entry(writer, &entry)
}

/// Writes the detail view of a single entry.
pub fn write_entry<W: Write>(writer: &mut W, entry: &Entry) -> Result<()> {
    let optional = |time: Option<DateTime<Utc>>| time.map_or_else(|| "-".to_string(), format_time);
    writeln!(writer, "  Task:     {}", entry.task_id)?;
    writeln!(writer, "  Status:   {}", entry.status)?;
    writeln!(writer, "  Started:  {}", format_time(entry.start_time))?;
    writeln!(writer, "  Paused:   {}", optional(entry.pause_time))?;
    writeln!(writer, "  Ended:    {}", optional(entry.end_time))?;
    writeln!(writer, "  Time:     {}", format_seconds(entry.total_time))?;
    writeln!(writer, "  Hours:    {}", entry.hours)?;
    writeln!(writer, "  Bill:     {}", entry.bill)?;
    if !entry.comment.is_empty() {
        writeln!(writer, "  Comment:  {}", entry.comment)?;
    }
    Ok(())
}

/// Writes one line per entry.
pub fn write_entry_table<W: Write>(writer: &mut W, entries: &[Entry]) -> Result<()> {
    if entries.is_empty() {
        writeln!(writer, "No entries.")?;
        return Ok(());
    }
    for entry in entries {
        writeln!(
            writer,
            "{}  {:<8} {}  {:>12}  {:>10}  {:>8}",
            entry.id,
            entry.status,
            format_time(entry.start_time),
            format_seconds(entry.total_time),
            entry.hours.to_string(),
            entry.bill.to_string(),
        )?;
    }
    Ok(())
}
