//! Authorization port consumed at the engine boundary.

use crate::kanban::domain::{Actor, ActorRole, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation class an actor must be authorized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create boards.
    CreateBoard,
    /// Rename, deactivate, and manage membership of boards.
    ManageBoard,
    /// Add, edit, reorder, and delete columns.
    ManageColumns,
    /// Create tasks.
    CreateTask,
    /// Edit task attributes and status.
    EditTask,
    /// Move tasks between positions and columns.
    MoveTask,
    /// Delete tasks.
    DeleteTask,
    /// Lock and unlock tasks for external synchronization.
    LockTask,
    /// Overwrite tracked effort.
    AdjustEffort,
}

impl Permission {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateBoard => "create_board",
            Self::ManageBoard => "manage_board",
            Self::ManageColumns => "manage_columns",
            Self::CreateTask => "create_task",
            Self::EditTask => "edit_task",
            Self::MoveTask => "move_task",
            Self::DeleteTask => "delete_task",
            Self::LockTask => "lock_task",
            Self::AdjustEffort => "adjust_effort",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Black-box authorization predicates.
#[cfg_attr(test, mockall::automock)]
pub trait AccessPolicy: Send + Sync {
    /// Returns `true` when `actor` may perform operations of `permission`.
    fn authorize(&self, actor: &Actor, permission: Permission) -> bool;

    /// Returns `true` when an actor with `role` may move a task from status
    /// `from` to status `to`.
    fn can_transition_status(&self, from: &TaskStatus, to: &TaskStatus, role: ActorRole) -> bool;
}
