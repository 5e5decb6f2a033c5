//! Storage layer for the work tracker.
//!
//! Provides persistence for users, companies, projects, tasks and time
//! entries using `rusqlite`, and drives the entry lifecycle from `wt-core`
//! against stored records.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! Share it across threads behind a `Mutex`, or open one `Database` per thread.
//!
//! # Single Writer per Entry
//!
//! Every entry creation and transition runs in an `IMMEDIATE` transaction:
//! the entry is loaded, validated, updated and written back while SQLite holds
//! the write lock. Two processes pausing the same entry are serialized and the
//! second one sees the entry already paused.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with microseconds
//! (e.g., `2024-01-15T10:30:00.000000Z`), always UTC, so lexicographic
//! ordering matches chronological ordering.
//!
//! ## Decimal Columns
//!
//! `users.rate`, `entries.hours` and `entries.bill` are stored as TEXT decimal
//! strings to avoid floating-point drift.

mod entries;
mod records;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use thiserror::Error;
use wt_core::{EntryError, ValidationError};

pub use records::{CompanyRecord, NewTask, ProjectRecord, TaskRecord, UserRecord};

/// How long a connection waits for another writer's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The entry lifecycle rejected the request.
    #[error(transparent)]
    Entry(#[from] EntryError),
    /// A value failed domain validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// The entry belongs to a task assigned to someone else.
    #[error("You cannot access Entries for tasks not assigned to you.")]
    EntryAccessDenied,
    /// A user with this email already exists.
    #[error("a user with email {0} already exists")]
    DuplicateEmail(String),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {record_id}: {timestamp}")]
    TimestampParse {
        record_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse a stored decimal.
    #[error("invalid decimal for {record_id}: {value}")]
    DecimalParse {
        record_id: String,
        value: String,
        #[source]
        source: rust_decimal::Error,
    },
}

#[cfg(test)]
impl DbError {
    /// The lifecycle error behind this failure, if any.
    pub(crate) const fn entry_error(&self) -> Option<&EntryError> {
        match self {
            Self::Entry(err) => Some(err),
            _ => None,
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        // Writers queue on the IMMEDIATE lock instead of failing with SQLITE_BUSY.
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                rate TEXT NOT NULL DEFAULT '0',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS companies (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                company_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                FOREIGN KEY (company_id) REFERENCES companies(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_projects_company ON projects(company_id);

            -- type: FEATURE, BUG, DEV_OPS, ...
            -- status: NEW, IN_PROGRESS, COMPLETED, NEEDS_FEEDBACK, CLOSED
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                project_id TEXT NOT NULL,
                name TEXT NOT NULL,
                code TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                type TEXT NOT NULL DEFAULT 'FEATURE',
                status TEXT NOT NULL DEFAULT 'NEW',
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE RESTRICT,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project_id);

            -- status: ACTIVE, PAUSED, COMPLETE
            -- total_time: whole seconds; hours/bill: decimal strings
            CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                task_id TEXT NOT NULL,
                comment TEXT NOT NULL DEFAULT '',
                start_time TEXT NOT NULL,
                pause_time TEXT,
                end_time TEXT,
                status TEXT NOT NULL,
                total_time INTEGER NOT NULL DEFAULT 0,
                hours TEXT NOT NULL DEFAULT '0.000000',
                bill TEXT NOT NULL DEFAULT '0.00',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_entries_task ON entries(task_id);
            CREATE INDEX IF NOT EXISTS idx_entries_status ON entries(status);
            CREATE INDEX IF NOT EXISTS idx_entries_created ON entries(created_at);
            ",
        )?;
        Ok(())
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(timestamp: &str, record_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record_id: record_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn parse_optional_timestamp(
    timestamp: Option<&str>,
    record_id: &str,
) -> Result<Option<DateTime<Utc>>, DbError> {
    timestamp.map(|t| parse_timestamp(t, record_id)).transpose()
}

fn parse_decimal(value: &str, record_id: &str) -> Result<Decimal, DbError> {
    Decimal::from_str(value).map_err(|source| DbError::DecimalParse {
        record_id: record_id.to_string(),
        value: value.to_string(),
        source,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn open_creates_file_and_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wt.db");
        drop(Database::open(&path).unwrap());
        assert!(path.exists());
        assert!(Database::open(&path).is_ok());
    }

    #[test]
    fn schema_has_all_tables() {
        let db = Database::open_in_memory().unwrap();
        let mut stmt = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .unwrap();
        let tables: HashSet<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(Result::unwrap)
            .collect();
        for table in ["users", "companies", "projects", "tasks", "entries"] {
            assert!(tables.contains(table), "missing table {table}");
        }
    }

    #[test]
    fn timestamps_roundtrip_with_microseconds() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()
            + chrono::TimeDelta::microseconds(123_456);
        let formatted = format_timestamp(ts);
        assert_eq!(formatted, "2025-01-15T10:30:00.123456Z");
        assert_eq!(parse_timestamp(&formatted, "rec").unwrap(), ts);
    }

    #[test]
    fn bad_timestamp_reports_record() {
        let err = parse_timestamp("yesterday", "entry-9").unwrap_err();
        assert_eq!(err.to_string(), "invalid timestamp for entry-9: yesterday");
    }

    #[test]
    fn only_unique_constraints_count_as_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let insert_user = |id: &str| {
            db.conn.execute(
                "INSERT INTO users (id, email, name, created_at) VALUES (?, 'frodo@test.com', 'Frodo', 'now')",
                [id],
            )
        };
        insert_user("user-1").unwrap();
        let duplicate = insert_user("user-2").unwrap_err();
        assert!(is_unique_violation(&duplicate));

        let orphan = db
            .conn
            .execute(
                "INSERT INTO projects (id, company_id, name, created_at) VALUES ('p-1', 'missing', 'Orphan', 'now')",
                [],
            )
            .unwrap_err();
        assert!(!is_unique_violation(&orphan));

        let missing_name = db
            .conn
            .execute(
                "INSERT INTO companies (id, name, created_at) VALUES ('c-1', NULL, 'now')",
                [],
            )
            .unwrap_err();
        assert!(!is_unique_violation(&missing_name));
    }

    #[test]
    fn bad_decimal_reports_record() {
        let err = parse_decimal("ten", "user-1").unwrap_err();
        assert_eq!(err.to_string(), "invalid decimal for user-1: ten");
    }
}
