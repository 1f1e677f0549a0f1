//! Service-level errors and their client-facing classification.

use crate::kanban::{
    domain::{BoardId, ColumnId, KanbanDomainError, TaskId, TaskStatus, UserId},
    ports::{KanbanStoreError, Permission},
};
use std::fmt;
use thiserror::Error;

/// Client-facing error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed entity does not exist.
    NotFound,
    /// The input is malformed or inconsistent with the board.
    Validation,
    /// The operation conflicts with the current state.
    Conflict,
    /// The actor may not perform the operation.
    Forbidden,
    /// An infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::Forbidden => "forbidden",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the Kanban services.
#[derive(Debug, Clone, Error)]
pub enum KanbanServiceError {
    /// The actor lacks the permission.
    #[error("user {user_id} is not permitted to {permission}")]
    PermissionDenied {
        /// Acting user.
        user_id: UserId,
        /// Missing permission.
        permission: Permission,
    },

    /// The actor is not a member of the board.
    #[error("user {user_id} is not a member of board {board_id}")]
    NotMember {
        /// Addressed board.
        board_id: BoardId,
        /// Acting user.
        user_id: UserId,
    },

    /// The actor is a member but not an admin of the board.
    #[error("user {user_id} is not an admin of board {board_id}")]
    NotBoardAdmin {
        /// Addressed board.
        board_id: BoardId,
        /// Acting user.
        user_id: UserId,
    },

    /// The status transition is not allowed for the actor's role.
    #[error("transition from '{from}' to '{to}' is not allowed")]
    TransitionDenied {
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The board does not exist.
    #[error("board not found: {0}")]
    BoardNotFound(BoardId),

    /// The column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] KanbanDomainError),

    /// The store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] KanbanStoreError),
}

/// Result type for Kanban service operations.
pub type KanbanServiceResult<T> = Result<T, KanbanServiceError>;

impl KanbanServiceError {
    /// Classifies the error for clients.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied { .. }
            | Self::NotMember { .. }
            | Self::NotBoardAdmin { .. }
            | Self::TransitionDenied { .. } => ErrorKind::Forbidden,
            Self::BoardNotFound(_) | Self::ColumnNotFound(_) | Self::TaskNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Domain(err) => domain_kind(err),
            Self::Store(err) => store_kind(err),
        }
    }
}

const fn domain_kind(err: &KanbanDomainError) -> ErrorKind {
    match err {
        KanbanDomainError::TaskLocked(_) => ErrorKind::Conflict,
        KanbanDomainError::TaskNotInColumn { .. } => ErrorKind::Internal,
        KanbanDomainError::EmptyBoardName
        | KanbanDomainError::BoardNameTooLong(_)
        | KanbanDomainError::EmptyColumnName
        | KanbanDomainError::ColumnNameTooLong(_)
        | KanbanDomainError::EmptyTaskTitle
        | KanbanDomainError::TaskTitleTooLong(_)
        | KanbanDomainError::InvalidStatus(_)
        | KanbanDomainError::StatusTooLong(_)
        | KanbanDomainError::InvalidColor(_)
        | KanbanDomainError::InvalidEffort(_) => ErrorKind::Validation,
    }
}

const fn store_kind(err: &KanbanStoreError) -> ErrorKind {
    match err {
        KanbanStoreError::BoardNotFound(_)
        | KanbanStoreError::ColumnNotFound(_)
        | KanbanStoreError::TaskNotFound(_)
        | KanbanStoreError::MemberNotFound { .. }
        | KanbanStoreError::NoActiveTimer { .. } => ErrorKind::NotFound,
        KanbanStoreError::DuplicateColumnStatus { .. }
        | KanbanStoreError::ColumnOrderMismatch(_)
        | KanbanStoreError::ColumnOnOtherBoard { .. }
        | KanbanStoreError::BoardHasNoColumns(_) => ErrorKind::Validation,
        KanbanStoreError::ActiveTimerExists { .. }
        | KanbanStoreError::BoardInactive(_)
        | KanbanStoreError::ColumnHasTasks(_)
        | KanbanStoreError::LastAdmin(_)
        | KanbanStoreError::ConcurrentModification(_) => ErrorKind::Conflict,
        KanbanStoreError::Domain(inner) => domain_kind(inner),
        KanbanStoreError::Persistence(_) => ErrorKind::Internal,
    }
}
