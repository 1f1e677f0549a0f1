//! Task aggregate and the values used to create and edit tasks.

use super::{
    BoardId, Column, ColumnId, Effort, KanbanDomainError, Priority, TaskCode, TaskId, TaskStatus,
    UserId,
    values::{MAX_TITLE_LEN, non_empty, within_limit},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where a task sits on its board: column, rank within the column, and the
/// status it carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskPlacement {
    /// Column holding the task.
    pub column_id: ColumnId,
    /// Zero-based rank within the column.
    pub position: u32,
    /// Logical status carried by the task.
    pub status: TaskStatus,
}

/// Editable task attributes supplied at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task title.
    pub title: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Task priority.
    pub priority: Priority,
    /// Optional assignee.
    pub assignee: Option<UserId>,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
    /// Optional effort estimate.
    pub estimate: Option<Effort>,
}

/// Partial update of editable task attributes.
///
/// `Some(None)` clears an optional field; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title.
    pub title: Option<String>,
    /// New description, or `Some(None)` to clear it.
    pub description: Option<Option<String>>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New assignee, or `Some(None)` to unassign.
    pub assignee: Option<Option<UserId>>,
    /// New due date, or `Some(None)` to clear it.
    pub due_date: Option<Option<NaiveDate>>,
    /// New estimate, or `Some(None)` to clear it.
    pub estimate: Option<Option<Effort>>,
}

impl TaskChanges {
    /// Returns `true` when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.due_date.is_none()
            && self.estimate.is_none()
    }
}

/// A unit of work on a board, owned by exactly one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    board_id: BoardId,
    column_id: ColumnId,
    code: TaskCode,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: Priority,
    position: u32,
    assignee: Option<UserId>,
    due_date: Option<NaiveDate>,
    estimate: Option<Effort>,
    actual: Effort,
    reopened_count: u32,
    locked: bool,
    created_by: UserId,
    updated_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning board.
    pub board_id: BoardId,
    /// Owning column.
    pub column_id: ColumnId,
    /// Generated task code.
    pub code: TaskCode,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: Option<String>,
    /// Logical status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: Priority,
    /// Position within the column.
    pub position: u32,
    /// Assignee.
    pub assignee: Option<UserId>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Effort estimate.
    pub estimate: Option<Effort>,
    /// Tracked effort.
    pub actual: Effort,
    /// Number of times the task entered the reopened status.
    pub reopened_count: u32,
    /// Move lock flag.
    pub locked: bool,
    /// Creating user.
    pub created_by: UserId,
    /// Last updating user.
    pub updated_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task appended to `column` at `position`.
    ///
    /// The task takes the column's bound status.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::EmptyTaskTitle`] when the title is blank
    /// and [`KanbanDomainError::TaskTitleTooLong`] when it is too long.
    pub fn new(
        column: &Column,
        position: u32,
        code: TaskCode,
        draft: TaskDraft,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, KanbanDomainError> {
        let title = task_title(&draft.title)?;
        Ok(Self {
            id: TaskId::new(),
            board_id: column.board_id(),
            column_id: column.id(),
            code,
            title,
            description: draft.description.as_deref().and_then(non_empty),
            status: column.status().clone(),
            priority: draft.priority,
            position,
            assignee: draft.assignee,
            due_date: draft.due_date,
            estimate: draft.estimate,
            actual: Effort::ZERO,
            reopened_count: 0,
            locked: false,
            created_by,
            updated_by: created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            board_id: data.board_id,
            column_id: data.column_id,
            code: data.code,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            position: data.position,
            assignee: data.assignee,
            due_date: data.due_date,
            estimate: data.estimate,
            actual: data.actual,
            reopened_count: data.reopened_count,
            locked: data.locked,
            created_by: data.created_by,
            updated_by: data.updated_by,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the owning column.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the generated task code.
    #[must_use]
    pub const fn code(&self) -> &TaskCode {
        &self.code
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the logical status.
    #[must_use]
    pub const fn status(&self) -> &TaskStatus {
        &self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the zero-based position within the column.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the effort estimate, if any.
    #[must_use]
    pub const fn estimate(&self) -> Option<Effort> {
        self.estimate
    }

    /// Returns the tracked effort.
    #[must_use]
    pub const fn actual(&self) -> Effort {
        self.actual
    }

    /// Returns how many times the task was reopened.
    #[must_use]
    pub const fn reopened_count(&self) -> u32 {
        self.reopened_count
    }

    /// Returns `true` while the task is frozen against moves.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the last updating user.
    #[must_use]
    pub const fn updated_by(&self) -> UserId {
        self.updated_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the task's current column, position, and status.
    #[must_use]
    pub fn placement(&self) -> TaskPlacement {
        TaskPlacement {
            column_id: self.column_id,
            position: self.position,
            status: self.status.clone(),
        }
    }

    /// Fails when the task is locked.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::TaskLocked`] while the lock is set.
    pub const fn ensure_movable(&self) -> Result<(), KanbanDomainError> {
        if self.locked {
            return Err(KanbanDomainError::TaskLocked(self.id));
        }
        Ok(())
    }

    /// Places the task at `placement`, counting entries into the reopened
    /// status.
    pub fn place(&mut self, placement: TaskPlacement, actor: UserId, now: DateTime<Utc>) {
        if placement.status.is_reopened() && !self.status.is_reopened() {
            self.reopened_count = self.reopened_count.saturating_add(1);
        }
        self.column_id = placement.column_id;
        self.position = placement.position;
        self.status = placement.status;
        self.updated_by = actor;
        self.updated_at = now;
    }

    /// Shifts the task to a new rank inside its column as a side effect of
    /// another task's move.
    pub const fn shift_to(&mut self, position: u32) {
        self.position = position;
    }

    /// Applies editable attribute changes.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::EmptyTaskTitle`] when a blank title is
    /// supplied and [`KanbanDomainError::TaskTitleTooLong`] for an overlong
    /// one.
    pub fn apply_changes(
        &mut self,
        changes: TaskChanges,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), KanbanDomainError> {
        let TaskChanges {
            title,
            description,
            priority,
            assignee,
            due_date,
            estimate,
        } = changes;

        if let Some(new_title) = title {
            self.title = task_title(&new_title)?;
        }
        if let Some(new_description) = description {
            self.description = new_description.as_deref().and_then(non_empty);
        }
        if let Some(new_priority) = priority {
            self.priority = new_priority;
        }
        if let Some(new_assignee) = assignee {
            self.assignee = new_assignee;
        }
        if let Some(new_due_date) = due_date {
            self.due_date = new_due_date;
        }
        if let Some(new_estimate) = estimate {
            self.estimate = new_estimate;
        }
        self.updated_by = actor;
        self.updated_at = now;
        Ok(())
    }

    /// Sets or clears the move lock.
    pub const fn set_locked(&mut self, locked: bool, actor: UserId, now: DateTime<Utc>) {
        self.locked = locked;
        self.updated_by = actor;
        self.updated_at = now;
    }

    /// Adds a closed timer session to the tracked effort.
    pub const fn add_tracked(&mut self, effort: Effort, now: DateTime<Utc>) {
        self.actual = self.actual.saturating_add(effort);
        self.updated_at = now;
    }

    /// Overwrites the tracked effort, bypassing the time ledger.
    pub const fn override_actual(&mut self, effort: Effort, actor: UserId, now: DateTime<Utc>) {
        self.actual = effort;
        self.updated_by = actor;
        self.updated_at = now;
    }
}

fn task_title(title: &str) -> Result<String, KanbanDomainError> {
    let trimmed = non_empty(title).ok_or(KanbanDomainError::EmptyTaskTitle)?;
    within_limit(trimmed, MAX_TITLE_LEN, KanbanDomainError::TaskTitleTooLong)
}
