//! Errors shared by the Kanban store ports.

use crate::kanban::domain::{BoardId, ColumnId, KanbanDomainError, TaskId, TaskStatus, UserId};
use std::sync::Arc;
use thiserror::Error;

/// Result type for Kanban store operations.
pub type KanbanStoreResult<T> = Result<T, KanbanStoreError>;

/// Errors returned by Kanban store implementations.
#[derive(Debug, Clone, Error)]
pub enum KanbanStoreError {
    /// The board does not exist.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// The column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The user is not a member of the board.
    #[error("user {user_id} is not a member of board {board_id}")]
    MemberNotFound {
        /// Board that was searched.
        board_id: BoardId,
        /// User that was searched for.
        user_id: UserId,
    },

    /// No timer is running for the task and user.
    #[error("no active timer for task {task_id} and user {user_id}")]
    NoActiveTimer {
        /// Timed task.
        task_id: TaskId,
        /// Timing user.
        user_id: UserId,
    },

    /// A timer is already running for the task and user.
    #[error("active timer exists for task {task_id} and user {user_id}")]
    ActiveTimerExists {
        /// Timed task.
        task_id: TaskId,
        /// Timing user.
        user_id: UserId,
    },

    /// The board has been deactivated.
    #[error("board is inactive: {0}")]
    BoardInactive(BoardId),

    /// The board has no columns to place a task into.
    #[error("board has no columns: {0}")]
    BoardHasNoColumns(BoardId),

    /// The column still holds tasks.
    #[error("column has tasks: {0}")]
    ColumnHasTasks(ColumnId),

    /// Another column on the board is already bound to the status.
    #[error("board {board_id} already has a column bound to status '{status}'")]
    DuplicateColumnStatus {
        /// Board holding the columns.
        board_id: BoardId,
        /// Status bound twice.
        status: TaskStatus,
    },

    /// A reorder request does not list the board's columns exactly once.
    #[error("column order does not match the columns of board {0}")]
    ColumnOrderMismatch(BoardId),

    /// The column belongs to a different board than the task.
    #[error("column {column_id} does not belong to board {board_id}")]
    ColumnOnOtherBoard {
        /// Requested column.
        column_id: ColumnId,
        /// Board of the task.
        board_id: BoardId,
    },

    /// Removing or demoting the member would leave the board without admins.
    #[error("board {0} must keep at least one admin")]
    LastAdmin(BoardId),

    /// The task was moved by another writer between read and lock.
    #[error("task {0} was modified concurrently, retry the operation")]
    ConcurrentModification(TaskId),

    /// A domain rule rejected the change inside the transaction.
    #[error(transparent)]
    Domain(#[from] KanbanDomainError),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl KanbanStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
