//! Tasks as seen by the entry lifecycle.
//!
//! The core never loads tasks itself. It asks a [`TaskDirectory`] for the
//! task's assignee and rate, then decides whether the acting user may track
//! time against it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EntryError;
use crate::types::{HourlyRate, TaskId, UserId, ValidationError};

/// Kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    #[default]
    Feature,
    Bug,
    DevOps,
    Documentation,
    Reporting,
    Investigation,
    Database,
}

impl TaskType {
    /// String representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "FEATURE",
            Self::Bug => "BUG",
            Self::DevOps => "DEV_OPS",
            Self::Documentation => "DOCUMENTATION",
            Self::Reporting => "REPORTING",
            Self::Investigation => "INVESTIGATION",
            Self::Database => "DATABASE",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Feature => "Feature",
            Self::Bug => "Bug",
            Self::DevOps => "Dev Ops",
            Self::Documentation => "Documentation",
            Self::Reporting => "Reporting",
            Self::Investigation => "Investigation",
            Self::Database => "Database",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for TaskType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "FEATURE" => Ok(Self::Feature),
            "BUG" => Ok(Self::Bug),
            "DEV_OPS" | "DEVOPS" => Ok(Self::DevOps),
            "DOCUMENTATION" => Ok(Self::Documentation),
            "REPORTING" => Ok(Self::Reporting),
            "INVESTIGATION" => Ok(Self::Investigation),
            "DATABASE" => Ok(Self::Database),
            _ => Err(ValidationError::UnknownVariant {
                field: "task type",
                value: s.to_string(),
            }),
        }
    }
}

/// Progress of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Completed,
    NeedsFeedback,
    Closed,
}

impl TaskStatus {
    /// String representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::NeedsFeedback => "NEEDS_FEEDBACK",
            Self::Closed => "CLOSED",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::NeedsFeedback => "Feedback Needed",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace(['-', ' '], "_").as_str() {
            "NEW" => Ok(Self::New),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "NEEDS_FEEDBACK" => Ok(Self::NeedsFeedback),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(ValidationError::UnknownVariant {
                field: "task status",
                value: s.to_string(),
            }),
        }
    }
}

/// The slice of a task the entry lifecycle needs: who owns it and at what rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAssignment {
    pub task_id: TaskId,
    pub user_id: UserId,
    pub rate: HourlyRate,
}

impl TaskAssignment {
    /// Checks that the task is assigned to `actor`.
    pub fn authorize(self, actor: &UserId) -> Result<Self, EntryError> {
        if &self.user_id == actor {
            Ok(self)
        } else {
            Err(EntryError::TaskNotAssigned)
        }
    }
}

/// Resolves tasks to their assignment.
///
/// Implemented by the storage layer. `find_assignment` returns `Ok(None)` for
/// unknown tasks; lookup failures use the implementor's own error type.
pub trait TaskDirectory {
    type Error: From<EntryError>;

    /// Looks up the assignment for a task.
    fn find_assignment(&self, task_id: &TaskId) -> Result<Option<TaskAssignment>, Self::Error>;

    /// Resolves a task the actor may track time against.
    ///
    /// Fails with [`EntryError::TaskNotFound`] when the task does not exist and
    /// [`EntryError::TaskNotAssigned`] when it belongs to another user.
    fn resolve_assigned(&self, task_id: &TaskId, actor: &UserId) -> Result<TaskAssignment, Self::Error> {
        let assignment = self
            .find_assignment(task_id)?
            .ok_or(EntryError::TaskNotFound)?;
        Ok(assignment.authorize(actor)?)
    }
}
