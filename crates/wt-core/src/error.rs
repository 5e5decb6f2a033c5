//! Entry validation failures.
//!
//! The messages are part of the external contract: callers surface them to
//! users verbatim.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Broad category of an [`EntryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The action is not legal from the entry's current status.
    InvalidTransition,
    /// Instants were supplied in the wrong order.
    TemporalOrderingViolation,
    /// A supplied instant lies after the current time.
    FutureTimestamp,
    /// The task belongs to another user.
    TaskNotAssigned,
    /// The task does not exist.
    TaskNotFound,
}

/// A rejected entry creation or transition.
///
/// Every variant is raised before anything is mutated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("You cannot edit an already completed entry.")]
    AlreadyComplete,

    #[error("You cannot pause an entry that is not active.")]
    NotActive,

    #[error("You cannot resume an entry that is not paused.")]
    NotPaused,

    #[error("An Entry's pause/completion time cannot precede its start time.")]
    PrecedesStart {
        start_time: DateTime<Utc>,
        entry_time: DateTime<Utc>,
    },

    #[error("An Entry's resume time cannot precede its pause time.")]
    PrecedesPause {
        pause_time: DateTime<Utc>,
        entry_time: DateTime<Utc>,
    },

    #[error("An Entry's start time may not exceed its end time.")]
    StartNotBeforeEnd {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },

    #[error("An Entry's start time may not exceed the current time.")]
    StartInFuture { start_time: DateTime<Utc> },

    #[error("The selected start_time/end_time values may not exceed the current time.")]
    IntervalInFuture {
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },

    #[error("The selected task has not been assigned to you.")]
    TaskNotAssigned,

    #[error("The selected task does not exist.")]
    TaskNotFound,
}

impl EntryError {
    /// Returns the category this failure belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyComplete | Self::NotActive | Self::NotPaused => {
                ErrorKind::InvalidTransition
            }
            Self::PrecedesStart { .. } | Self::PrecedesPause { .. } | Self::StartNotBeforeEnd { .. } => {
                ErrorKind::TemporalOrderingViolation
            }
            Self::StartInFuture { .. } | Self::IntervalInFuture { .. } => {
                ErrorKind::FutureTimestamp
            }
            Self::TaskNotAssigned => ErrorKind::TaskNotAssigned,
            Self::TaskNotFound => ErrorKind::TaskNotFound,
        }
    }
}
