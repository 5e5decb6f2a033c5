//! Entry lifecycle state machine.
//!
//! ```text
//! ACTIVE --PAUSE--> PAUSED --RESUME--> ACTIVE
//!    |                 |
//!    +---COMPLETE------+---COMPLETE--> COMPLETE (terminal)
//! ```
//!
//! Time is accounted for when an active interval closes: on PAUSE and on
//! COMPLETE from ACTIVE. RESUME starts a fresh interval and the paused span
//! is never billed. COMPLETE from PAUSED closes the entry at its pause time
//! without further accounting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::billing;
use crate::entry::Entry;
use crate::error::EntryError;
use crate::status::{EntryAction, EntryStatus};
use crate::types::HourlyRate;

/// A transition request as received from a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub action: EntryAction,
    pub entry_time: DateTime<Utc>,
}

impl TransitionRequest {
    /// Applies this request to `entry`. See [`apply_transition`].
    pub fn apply(&self, entry: &Entry, rate: HourlyRate) -> Result<Entry, EntryError> {
        apply_transition(entry, self.action, self.entry_time, rate)
    }
}

/// Applies `action` at `entry_time`, returning the updated entry.
///
/// The input entry is left untouched; on error nothing has changed.
pub fn apply_transition(
    entry: &Entry,
    action: EntryAction,
    entry_time: DateTime<Utc>,
    rate: HourlyRate,
) -> Result<Entry, EntryError> {
    let next = match (entry.status, action) {
        (EntryStatus::Complete, _) => return Err(EntryError::AlreadyComplete),
        (EntryStatus::Paused, EntryAction::Pause) => return Err(EntryError::NotActive),
        (EntryStatus::Active, EntryAction::Resume) => return Err(EntryError::NotPaused),

        (EntryStatus::Active, EntryAction::Pause) => {
            ensure_not_before_start(entry, entry_time)?;
            let mut next = billing::accumulate(entry.clone(), entry.start_time, entry_time, rate);
            next.pause_time = Some(entry_time);
            next.status = EntryStatus::Paused;
            next
        }
        (EntryStatus::Paused, EntryAction::Resume) => {
            ensure_not_before_start(entry, entry_time)?;
            if let Some(pause_time) = entry.pause_time.filter(|pause_time| entry_time < *pause_time) {
                return Err(EntryError::PrecedesPause {
                    pause_time,
                    entry_time,
                });
            }
            let mut next = entry.clone();
            next.start_time = entry_time;
            next.pause_time = None;
            next.status = EntryStatus::Active;
            next
        }
        (EntryStatus::Active, EntryAction::Complete) => {
            ensure_not_before_start(entry, entry_time)?;
            // Accumulate first, then close.
            let mut next = billing::accumulate(entry.clone(), entry.start_time, entry_time, rate);
            next.end_time = Some(entry_time);
            next.status = EntryStatus::Complete;
            next
        }
        (EntryStatus::Paused, EntryAction::Complete) => {
            ensure_not_before_start(entry, entry_time)?;
            // Time up to the pause was already accounted for; the entry closes at the pause.
            let mut next = entry.clone();
            next.end_time = Some(entry.pause_time.unwrap_or(entry.start_time));
            next.pause_time = None;
            next.status = EntryStatus::Complete;
            next
        }
    };

    tracing::debug!(
        entry_id = %next.id,
        %action,
        from = %entry.status,
        to = %next.status,
        total_time = next.total_time,
        "applied entry transition"
    );
    Ok(next)
}

fn ensure_not_before_start(entry: &Entry, entry_time: DateTime<Utc>) -> Result<(), EntryError> {
    if entry_time < entry.start_time {
        return Err(EntryError::PrecedesStart {
            start_time: entry.start_time,
            entry_time,
        });
    }
    Ok(())
}
