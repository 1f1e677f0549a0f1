//! Error types for Kanban domain validation and parsing.

use super::{ColumnId, TaskId};
use thiserror::Error;

/// Errors returned while constructing or mutating Kanban domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KanbanDomainError {
    /// The board name is empty after trimming.
    #[error("board name must not be empty")]
    EmptyBoardName,

    /// The board name exceeds the given number of characters.
    #[error("board name must be at most {0} characters")]
    BoardNameTooLong(usize),

    /// The column name is empty after trimming.
    #[error("column name must not be empty")]
    EmptyColumnName,

    /// The column name exceeds the given number of characters.
    #[error("column name must be at most {0} characters")]
    ColumnNameTooLong(usize),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The task title exceeds the given number of characters.
    #[error("task title must be at most {0} characters")]
    TaskTitleTooLong(usize),

    /// The status value is empty or contains characters outside `[a-z0-9_]`.
    #[error("invalid status '{0}', expected lowercase letters, digits, or underscores")]
    InvalidStatus(String),

    /// The normalized status exceeds the given number of characters.
    #[error("status must be at most {0} characters")]
    StatusTooLong(usize),

    /// The color is not a `#rrggbb` hex triplet.
    #[error("invalid column color '{0}', expected #rrggbb")]
    InvalidColor(String),

    /// The effort value is negative, not finite, or too large to store.
    #[error("invalid effort value: {0}")]
    InvalidEffort(String),

    /// The task is locked against moves.
    #[error("task {0} is locked")]
    TaskLocked(TaskId),

    /// The column order given to a placement does not contain the task.
    #[error("task {task_id} is not placed in column {column_id}")]
    TaskNotInColumn {
        /// Task that was expected in the column.
        task_id: TaskId,
        /// Column that was searched.
        column_id: ColumnId,
    },
}

/// Error returned while parsing a task priority from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing a member role from input or persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown member role: {0}")]
pub struct ParseMemberRoleError(pub String);

/// Error returned while parsing a history source tag from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown history source: {0}")]
pub struct ParseHistorySourceError(pub String);
