//! Role-table implementation of the access policy port.

use crate::kanban::{
    domain::{Actor, ActorRole, TaskStatus},
    ports::{AccessPolicy, Permission},
};
use std::collections::HashSet;

/// Access policy backed by a fixed table of permissions per role.
///
/// Admins and managers may do everything. Employees may work tasks but not
/// create boards, manage columns, lock tasks, or adjust tracked effort.
/// Statuses listed as restricted can only be entered by admins and managers.
#[derive(Debug, Clone, Default)]
pub struct RoleAccessPolicy {
    restricted_statuses: HashSet<TaskStatus>,
}

impl RoleAccessPolicy {
    /// Creates a policy without restricted statuses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts entering `status` to admins and managers.
    #[must_use]
    pub fn with_restricted_status(mut self, status: TaskStatus) -> Self {
        self.restricted_statuses.insert(status);
        self
    }

    const fn is_elevated(role: ActorRole) -> bool {
        matches!(role, ActorRole::Admin | ActorRole::Manager)
    }
}

impl AccessPolicy for RoleAccessPolicy {
    fn authorize(&self, actor: &Actor, permission: Permission) -> bool {
        match permission {
            Permission::CreateTask
            | Permission::EditTask
            | Permission::MoveTask
            | Permission::DeleteTask => true,
            Permission::CreateBoard
            | Permission::ManageBoard
            | Permission::ManageColumns
            | Permission::LockTask
            | Permission::AdjustEffort => Self::is_elevated(actor.role()),
        }
    }

    fn can_transition_status(&self, _from: &TaskStatus, to: &TaskStatus, role: ActorRole) -> bool {
        Self::is_elevated(role) || !self.restricted_statuses.contains(to)
    }
}
