//! Stored time entries and their lifecycle.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use uuid::Uuid;
use wt_core::{
    Entry, EntryId, EntryStatus, TaskDirectory, TaskId, TransitionRequest, UserId,
};

use crate::records::ConnDirectory;
use crate::{
    Database, DbError, format_timestamp, parse_decimal, parse_optional_timestamp, parse_timestamp,
};

const ENTRY_COLUMNS: &str = "
    entries.id, entries.task_id, entries.comment, entries.start_time, entries.pause_time,
    entries.end_time, entries.status, entries.total_time, entries.hours, entries.bill
";

/// An entry row as stored, before parsing.
struct RawEntry {
    id: String,
    task_id: String,
    comment: String,
    start_time: String,
    pause_time: Option<String>,
    end_time: Option<String>,
    status: String,
    total_time: i64,
    hours: String,
    bill: String,
}

impl RawEntry {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            task_id: row.get(1)?,
            comment: row.get(2)?,
            start_time: row.get(3)?,
            pause_time: row.get(4)?,
            end_time: row.get(5)?,
            status: row.get(6)?,
            total_time: row.get(7)?,
            hours: row.get(8)?,
            bill: row.get(9)?,
        })
    }

    fn into_entry(self) -> Result<Entry, DbError> {
        let id = self.id.as_str();
        Ok(Entry {
            start_time: parse_timestamp(&self.start_time, id)?,
            pause_time: parse_optional_timestamp(self.pause_time.as_deref(), id)?,
            end_time: parse_optional_timestamp(self.end_time.as_deref(), id)?,
            status: self.status.parse()?,
            total_time: self.total_time,
            hours: parse_decimal(&self.hours, id)?,
            bill: parse_decimal(&self.bill, id)?,
            task_id: TaskId::new(self.task_id)?,
            comment: self.comment,
            id: EntryId::new(self.id)?,
        })
    }
}

impl Database {
    /// Starts a live entry for `actor` on `task_id`, checking `start_time` against `now`.
    pub fn start_entry_at(
        &mut self,
        actor: &UserId,
        task_id: &TaskId,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Entry, DbError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let task = ConnDirectory(&tx).resolve_assigned(task_id, actor)?;
        let entry = wt_core::start_entry_at(new_entry_id()?, &task, start_time, now)?;
        insert_entry(&tx, &entry, now)?;
        tx.commit()?;
        tracing::info!(entry_id = %entry.id, task_id = %entry.task_id, "entry started");
        Ok(entry)
    }

    /// Records a finished interval as a complete entry, checking it against `now`.
    pub fn create_manual_entry_at(
        &mut self,
        actor: &UserId,
        task_id: &TaskId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<Entry, DbError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let task = ConnDirectory(&tx).resolve_assigned(task_id, actor)?;
        let entry = wt_core::create_manual_entry_at(
            new_entry_id()?,
            &task,
            start_time,
            end_time,
            comment,
            now,
        )?;
        insert_entry(&tx, &entry, now)?;
        tx.commit()?;
        tracing::info!(entry_id = %entry.id, task_id = %entry.task_id, "manual entry created");
        Ok(entry)
    }

    /// Applies a pause/resume/complete request to one of `actor`'s entries,
    /// stamping `updated_at` with `now`.
    ///
    /// The read, validation and write happen under one write lock; on any
    /// error the stored entry is unchanged.
    pub fn transition_entry_at(
        &mut self,
        actor: &UserId,
        entry_id: &EntryId,
        request: TransitionRequest,
        now: DateTime<Utc>,
    ) -> Result<Entry, DbError> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let entry = load_entry(&tx, entry_id)?;
        let task = ConnDirectory(&tx)
            .find_assignment(&entry.task_id)?
            .filter(|task| &task.user_id == actor)
            .ok_or(DbError::EntryAccessDenied)?;
        let updated = request.apply(&entry, task.rate)?;
        update_entry(&tx, &updated, now)?;
        tx.commit()?;
        tracing::info!(
            entry_id = %updated.id,
            action = %request.action,
            status = %updated.status,
            "entry transitioned"
        );
        Ok(updated)
    }

    /// Fetches one of `actor`'s entries.
    pub fn get_entry(&self, actor: &UserId, entry_id: &EntryId) -> Result<Entry, DbError> {
        let entry = load_entry(&self.conn, entry_id)?;
        let owner = self.find_assignment(&entry.task_id)?.map(|task| task.user_id);
        if owner.as_ref() != Some(actor) {
            return Err(DbError::EntryAccessDenied);
        }
        Ok(entry)
    }

    /// Lists entries on tasks assigned to `actor`, oldest first.
    ///
    /// Entries created at the same instant are ordered active, paused, complete.
    pub fn list_entries(&self, actor: &UserId) -> Result<Vec<Entry>, DbError> {
        let sql = format!(
            "
            SELECT {ENTRY_COLUMNS}
            FROM entries
            JOIN tasks ON tasks.id = entries.task_id
            WHERE tasks.user_id = ?
            ORDER BY entries.created_at ASC,
                CASE entries.status WHEN 'ACTIVE' THEN 0 WHEN 'PAUSED' THEN 1 ELSE 2 END ASC,
                entries.id ASC
            "
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([actor.as_str()], RawEntry::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    /// Lists `actor`'s entries that are still active or paused.
    pub fn list_open_entries(&self, actor: &UserId) -> Result<Vec<Entry>, DbError> {
        Ok(self
            .list_entries(actor)?
            .into_iter()
            .filter(|entry| entry.status != EntryStatus::Complete)
            .collect())
    }
}

fn new_entry_id() -> Result<EntryId, DbError> {
    Ok(EntryId::new(Uuid::new_v4().to_string())?)
}

fn load_entry(conn: &Connection, entry_id: &EntryId) -> Result<Entry, DbError> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE entries.id = ?");
    conn.query_row(&sql, [entry_id.as_str()], RawEntry::from_row)
        .optional()?
        .ok_or_else(|| DbError::NotFound {
            kind: "entry",
            id: entry_id.to_string(),
        })?
        .into_entry()
}

fn insert_entry(conn: &Connection, entry: &Entry, now: DateTime<Utc>) -> Result<(), DbError> {
    let now = format_timestamp(now);
    conn.execute(
        "
        INSERT INTO entries
        (id, task_id, comment, start_time, pause_time, end_time, status, total_time, hours, bill, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
        params![
            entry.id.as_str(),
            entry.task_id.as_str(),
            entry.comment,
            format_timestamp(entry.start_time),
            entry.pause_time.map(format_timestamp),
            entry.end_time.map(format_timestamp),
            entry.status.as_str(),
            entry.total_time,
            entry.hours.to_string(),
            entry.bill.to_string(),
            now,
            now,
        ],
    )?;
    Ok(())
}

fn update_entry(conn: &Connection, entry: &Entry, now: DateTime<Utc>) -> Result<(), DbError> {
    conn.execute(
        "
        UPDATE entries
        SET start_time = ?, pause_time = ?, end_time = ?, status = ?,
            total_time = ?, hours = ?, bill = ?, updated_at = ?
        WHERE id = ?
        ",
        params![
            format_timestamp(entry.start_time),
            entry.pause_time.map(format_timestamp),
            entry.end_time.map(format_timestamp),
            entry.status.as_str(),
            entry.total_time,
            entry.hours.to_string(),
            entry.bill.to_string(),
            format_timestamp(now),
            entry.id.as_str(),
        ],
    )?;
    Ok(())
}
