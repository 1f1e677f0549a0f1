//! Append-only task transition history.

use super::{
    HistoryEntryId, ParseHistorySourceError, Task, TaskId, TaskPlacement, TaskStatus, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of a task transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    /// Performed by a user through the board.
    #[default]
    Manual,
    /// Performed by an external tracker integration.
    Integration,
}

impl HistorySource {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Integration => "integration",
        }
    }
}

impl fmt::Display for HistorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HistorySource {
    type Error = ParseHistorySourceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "integration" => Ok(Self::Integration),
            _ => Err(ParseHistorySourceError(value.to_owned())),
        }
    }
}

/// Sort order for history listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Oldest entry first.
    #[default]
    Ascending,
    /// Newest entry first.
    Descending,
}

/// Immutable record of a single task transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHistoryEntry {
    id: HistoryEntryId,
    task_id: TaskId,
    source: HistorySource,
    before: Option<TaskPlacement>,
    after: TaskPlacement,
    changed_by: UserId,
    changed_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHistoryData {
    /// Entry identifier.
    pub id: HistoryEntryId,
    /// Task the entry belongs to.
    pub task_id: TaskId,
    /// Transition origin.
    pub source: HistorySource,
    /// Placement before the transition; absent for creation entries.
    pub before: Option<TaskPlacement>,
    /// Placement after the transition.
    pub after: TaskPlacement,
    /// Acting user.
    pub changed_by: UserId,
    /// Transition timestamp.
    pub changed_at: DateTime<Utc>,
}

impl TaskHistoryEntry {
    /// Records the initial placement of a newly created task.
    #[must_use]
    pub fn created(task: &Task, source: HistorySource) -> Self {
        Self {
            id: HistoryEntryId::new(),
            task_id: task.id(),
            source,
            before: None,
            after: task.placement(),
            changed_by: task.created_by(),
            changed_at: task.created_at(),
        }
    }

    /// Records a transition from `before` to the task's current placement.
    #[must_use]
    pub fn transition(
        transition: &TaskTransition,
        source: HistorySource,
        changed_by: UserId,
        changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: HistoryEntryId::new(),
            task_id: transition.task.id(),
            source,
            before: Some(transition.before.clone()),
            after: transition.task.placement(),
            changed_by,
            changed_at,
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHistoryData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            source: data.source,
            before: data.before,
            after: data.after,
            changed_by: data.changed_by,
            changed_at: data.changed_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryEntryId {
        self.id
    }

    /// Returns the task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the transition origin.
    #[must_use]
    pub const fn source(&self) -> HistorySource {
        self.source
    }

    /// Returns the placement before the transition.
    #[must_use]
    pub const fn before(&self) -> Option<&TaskPlacement> {
        self.before.as_ref()
    }

    /// Returns the placement after the transition.
    #[must_use]
    pub const fn after(&self) -> &TaskPlacement {
        &self.after
    }

    /// Returns the status before the transition.
    #[must_use]
    pub fn old_status(&self) -> Option<&TaskStatus> {
        self.before.as_ref().map(|placement| &placement.status)
    }

    /// Returns the status after the transition.
    #[must_use]
    pub const fn new_status(&self) -> &TaskStatus {
        &self.after.status
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn changed_by(&self) -> UserId {
        self.changed_by
    }

    /// Returns when the transition happened.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }
}

/// A committed task move or status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTransition {
    /// Placement before the change.
    pub before: TaskPlacement,
    /// Task after the change.
    pub task: Task,
}

impl TaskTransition {
    /// Returns `true` when column, position, and status are unchanged.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.before == self.task.placement()
    }

    /// Returns `true` when the task changed column.
    #[must_use]
    pub fn changed_column(&self) -> bool {
        self.before.column_id != self.task.column_id()
    }
}
