//! Core domain logic for the work tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: live and manual creation of time entries against tasks
//! - Transitions: the pause/resume/complete state machine
//! - Billing: elapsed time, hours and charges per active interval
//! - Summaries: per-task totals for reporting
//!
//! Nothing here performs I/O. Task lookup is delegated to a [`TaskDirectory`]
//! and the caller persists whatever entry comes back.

pub mod billing;
mod entry;
mod error;
mod status;
mod summary;
mod task;
mod transition;
pub mod types;

pub use billing::{Billables, accumulate};
pub use entry::{Entry, create_manual_entry, create_manual_entry_at, start_entry, start_entry_at};
pub use error::{EntryError, ErrorKind};
pub use status::{EntryAction, EntryStatus};
pub use summary::{Summary, TaskSummary, summarize};
pub use task::{TaskAssignment, TaskDirectory, TaskStatus, TaskType};
pub use transition::{TransitionRequest, apply_transition};
pub use types::{CompanyId, EntryId, HourlyRate, ProjectId, TaskId, UserId, ValidationError};
