//! Per-task totals over a set of entries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::billing::Billables;
use crate::entry::Entry;
use crate::types::TaskId;

/// Totals for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub task_id: TaskId,
    /// Number of entries for the task.
    pub entries: usize,
    /// Entries still active or paused.
    pub open_entries: usize,
    #[serde(flatten)]
    pub totals: Billables,
}

/// Totals across all tasks, with a breakdown per task ordered by task ID.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub tasks: Vec<TaskSummary>,
    pub entries: usize,
    pub open_entries: usize,
    pub totals: Billables,
}

/// Sums the stored accumulators of `entries`.
///
/// Open entries contribute what they have accumulated so far; the running
/// interval of an active entry is not included.
pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Summary {
    let mut by_task: BTreeMap<&TaskId, TaskSummary> = BTreeMap::new();
    for entry in entries {
        let task = by_task.entry(&entry.task_id).or_insert_with(|| TaskSummary {
            task_id: entry.task_id.clone(),
            entries: 0,
            open_entries: 0,
            totals: Billables::default(),
        });
        task.entries += 1;
        if entry.status.is_open() {
            task.open_entries += 1;
        }
        task.totals += entry.billables();
    }

    let mut summary = Summary::default();
    for task in by_task.into_values() {
        summary.entries += task.entries;
        summary.open_entries += task.open_entries;
        summary.totals += task.totals;
        summary.tasks.push(task);
    }
    summary
}
