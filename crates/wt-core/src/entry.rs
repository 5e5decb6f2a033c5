//! Time entries and their two creation paths.
//!
//! An entry is either started live (`ACTIVE`, driven afterwards by
//! [`apply_transition`](crate::apply_transition)) or backfilled manually
//! from a finished interval (`COMPLETE` from birth).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::billing::{self, BILL_SCALE, Billables, HOURS_SCALE};
use crate::error::EntryError;
use crate::status::EntryStatus;
use crate::task::TaskAssignment;
use crate::types::{EntryId, TaskId};

/// One unit of tracked work against a task.
///
/// Fields are public for storage round-trips. Lifecycle changes go through
/// [`apply_transition`](crate::apply_transition), which never touches its
/// input and returns a fresh entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier, fixed at creation.
    pub id: EntryId,
    /// Owning task, fixed at creation.
    pub task_id: TaskId,
    /// Free-form note, set on manual entries.
    #[serde(default)]
    pub comment: String,
    /// Start of the current (or last) active interval.
    pub start_time: DateTime<Utc>,
    /// When the entry was paused, if it is paused.
    pub pause_time: Option<DateTime<Utc>>,
    /// When the entry was completed.
    pub end_time: Option<DateTime<Utc>>,
    pub status: EntryStatus,
    /// Whole seconds accumulated across active intervals.
    pub total_time: i64,
    /// Hours accumulated across active intervals, 6 decimal places.
    pub hours: Decimal,
    /// Charge accumulated across active intervals, 2 decimal places.
    pub bill: Decimal,
}

impl Entry {
    /// Creates an active entry with zeroed accumulators.
    ///
    /// Performs no validation; see [`start_entry`] for the checked path.
    pub fn active(id: EntryId, task_id: TaskId, start_time: DateTime<Utc>) -> Self {
        let mut hours = Decimal::ZERO;
        hours.rescale(HOURS_SCALE);
        let mut bill = Decimal::ZERO;
        bill.rescale(BILL_SCALE);
        Self {
            id,
            task_id,
            comment: String::new(),
            start_time,
            pause_time: None,
            end_time: None,
            status: EntryStatus::Active,
            total_time: 0,
            hours,
            bill,
        }
    }

    /// The accumulated totals.
    pub const fn billables(&self) -> Billables {
        Billables {
            total_time: self.total_time,
            hours: self.hours,
            bill: self.bill,
        }
    }
}

/// Starts a live entry at `start_time`.
///
/// `task` must already be resolved for the acting user (see
/// [`TaskDirectory::resolve_assigned`](crate::TaskDirectory::resolve_assigned)).
pub fn start_entry(
    id: EntryId,
    task: &TaskAssignment,
    start_time: DateTime<Utc>,
) -> Result<Entry, EntryError> {
    start_entry_at(id, task, start_time, Utc::now())
}

/// Like [`start_entry`], with an explicit current time.
pub fn start_entry_at(
    id: EntryId,
    task: &TaskAssignment,
    start_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Entry, EntryError> {
    if start_time > now {
        return Err(EntryError::StartInFuture { start_time });
    }
    let entry = Entry::active(id, task.task_id.clone(), start_time);
    tracing::debug!(entry_id = %entry.id, task_id = %entry.task_id, %start_time, "started entry");
    Ok(entry)
}

/// Creates an already-complete entry covering `[start_time, end_time)`.
pub fn create_manual_entry(
    id: EntryId,
    task: &TaskAssignment,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    comment: impl Into<String>,
) -> Result<Entry, EntryError> {
    create_manual_entry_at(id, task, start_time, end_time, comment, Utc::now())
}

/// Like [`create_manual_entry`], with an explicit current time.
pub fn create_manual_entry_at(
    id: EntryId,
    task: &TaskAssignment,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    comment: impl Into<String>,
    now: DateTime<Utc>,
) -> Result<Entry, EntryError> {
    if start_time >= end_time {
        return Err(EntryError::StartNotBeforeEnd {
            start_time,
            end_time,
        });
    }
    if start_time > now || end_time > now {
        return Err(EntryError::IntervalInFuture {
            start_time,
            end_time,
        });
    }

    let mut entry = Entry::active(id, task.task_id.clone(), start_time);
    entry.comment = comment.into();
    let mut entry = billing::accumulate(entry, start_time, end_time, task.rate);
    entry.end_time = Some(end_time);
    entry.status = EntryStatus::Complete;
    tracing::debug!(
        entry_id = %entry.id,
        task_id = %entry.task_id,
        total_time = entry.total_time,
        "created manual entry"
    );
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};

    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{HourlyRate, UserId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap()
    }

    fn task() -> TaskAssignment {
        TaskAssignment {
            task_id: TaskId::new("task-1").unwrap(),
            user_id: UserId::new("user-1").unwrap(),
            rate: HourlyRate::new(Decimal::from(10)).unwrap(),
        }
    }

    fn entry_id() -> EntryId {
        EntryId::new("entry-1").unwrap()
    }

    #[test]
    fn start_entry_is_active_with_zero_totals() {
        let start = now() - TimeDelta::hours(1);
        let entry = start_entry_at(entry_id(), &task(), start, now()).unwrap();

        assert_eq!(entry.status, EntryStatus::Active);
        assert_eq!(entry.start_time, start);
        assert_eq!(entry.task_id, task().task_id);
        assert_eq!(entry.pause_time, None);
        assert_eq!(entry.end_time, None);
        assert_eq!(entry.total_time, 0);
        assert!(entry.hours.is_zero());
        assert!(entry.bill.is_zero());
    }

    #[test]
    fn start_entry_accepts_current_time() {
        assert!(start_entry_at(entry_id(), &task(), now(), now()).is_ok());
    }

    #[test]
    fn start_entry_rejects_future_start() {
        let err = start_entry_at(entry_id(), &task(), now() + TimeDelta::hours(1), now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FutureTimestamp);
        assert_eq!(
            err.to_string(),
            "An Entry's start time may not exceed the current time."
        );
    }

    #[test]
    fn start_entry_uses_wall_clock() {
        let err = start_entry(entry_id(), &task(), Utc::now() + TimeDelta::hours(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FutureTimestamp);
    }

    #[test]
    fn manual_entry_uses_wall_clock() {
        let start = Utc::now() + TimeDelta::hours(1);
        let err = create_manual_entry(entry_id(), &task(), start, start + TimeDelta::hours(1), "")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FutureTimestamp);

        let end = Utc::now() - TimeDelta::minutes(1);
        let entry =
            create_manual_entry(entry_id(), &task(), end - TimeDelta::hours(1), end, "").unwrap();
        assert_eq!(entry.total_time, 3600);
    }

    #[test]
    fn manual_entry_is_complete_with_billables() {
        let end = now();
        let start = end - TimeDelta::hours(5);
        let entry =
            create_manual_entry_at(entry_id(), &task(), start, end, "Ringwraiths delayed process.", now())
                .unwrap();

        assert_eq!(entry.status, EntryStatus::Complete);
        assert_eq!(entry.end_time, Some(end));
        assert_eq!(entry.pause_time, None);
        assert_eq!(entry.total_time, 5 * 3600);
        assert_eq!(entry.hours, Decimal::from(5));
        assert_eq!(entry.bill.to_string(), "50.00");
        assert_eq!(entry.comment, "Ringwraiths delayed process.");
    }

    #[test]
    fn manual_entry_rejects_equal_instants() {
        let t = now() - TimeDelta::hours(2);
        let err = create_manual_entry_at(entry_id(), &task(), t, t, "", now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemporalOrderingViolation);
        assert_eq!(
            err.to_string(),
            "An Entry's start time may not exceed its end time."
        );
    }

    #[test]
    fn manual_entry_rejects_reversed_interval() {
        let t = now() - TimeDelta::hours(2);
        let err = create_manual_entry_at(entry_id(), &task(), t + TimeDelta::hours(1), t, "", now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemporalOrderingViolation);
    }

    #[test]
    fn manual_entry_rejects_future_interval() {
        let err = create_manual_entry_at(
            entry_id(),
            &task(),
            now() + TimeDelta::hours(2),
            now() + TimeDelta::hours(3),
            "",
            now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FutureTimestamp);
        assert_eq!(
            err.to_string(),
            "The selected start_time/end_time values may not exceed the current time."
        );

        let err = create_manual_entry_at(
            entry_id(),
            &task(),
            now() - TimeDelta::hours(1),
            now() + TimeDelta::minutes(1),
            "",
            now(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FutureTimestamp);
    }

    #[test]
    fn entry_json_exposes_decimal_strings() {
        let end = now();
        let entry =
            create_manual_entry_at(entry_id(), &task(), end - TimeDelta::hours(3), end, "", now()).unwrap();
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["status"], "COMPLETE");
        assert_eq!(json["total_time"], 10_800);
        assert_eq!(json["hours"], "3.000000");
        assert_eq!(json["bill"], "30.00");
        assert_eq!(json["pause_time"], serde_json::Value::Null);
    }
}
