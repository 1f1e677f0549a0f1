//! Board aggregate and board membership.

use super::{
    BoardId, KanbanDomainError, ParseMemberRoleError, ProjectId, UserId,
    values::{MAX_TITLE_LEN, non_empty, within_limit},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named Kanban workspace owning columns, tasks, and members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    id: BoardId,
    name: String,
    project_id: Option<ProjectId>,
    active: bool,
    created_by: UserId,
    next_task_number: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedBoardData {
    /// Persisted board identifier.
    pub id: BoardId,
    /// Persisted board name.
    pub name: String,
    /// Persisted project association, if any.
    pub project_id: Option<ProjectId>,
    /// Persisted active flag.
    pub active: bool,
    /// User that created the board.
    pub created_by: UserId,
    /// Next value of the board's task code sequence.
    pub next_task_number: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Creates a new active board.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::EmptyBoardName`] when the name is blank
    /// and [`KanbanDomainError::BoardNameTooLong`] when it is too long.
    pub fn new(
        name: &str,
        project_id: Option<ProjectId>,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, KanbanDomainError> {
        let validated = board_name(name)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: BoardId::new(),
            name: validated,
            project_id,
            active: true,
            created_by,
            next_task_number: 1,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a board from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedBoardData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            project_id: data.project_id,
            active: data.active,
            created_by: data.created_by,
            next_task_number: data.next_task_number,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the board identifier.
    #[must_use]
    pub const fn id(&self) -> BoardId {
        self.id
    }

    /// Returns the board name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the associated project, if any.
    #[must_use]
    pub const fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Returns `true` while the board has not been deactivated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the next unallocated task sequence number.
    #[must_use]
    pub const fn next_task_number(&self) -> u64 {
        self.next_task_number
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

    /// Renames the board.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::EmptyBoardName`] when the name is blank.
    pub fn rename(&mut self, name: &str, clock: &impl Clock) -> Result<(), KanbanDomainError> {
        self.name = board_name(name)?;
        self.updated_at = clock.utc();
        Ok(())
    }

    /// Sets the active flag. Deactivation is the only way a board goes away.
    pub fn set_active(&mut self, active: bool, clock: &impl Clock) {
        self.active = active;
        self.updated_at = clock.utc();
    }

    /// Takes the next task sequence number and advances the sequence.
    pub const fn allocate_task_number(&mut self) -> u64 {
        let number = self.next_task_number;
        self.next_task_number = number.saturating_add(1);
        number
    }
}

fn board_name(name: &str) -> Result<String, KanbanDomainError> {
    let trimmed = non_empty(name).ok_or(KanbanDomainError::EmptyBoardName)?;
    within_limit(trimmed, MAX_TITLE_LEN, KanbanDomainError::BoardNameTooLong)
}

/// Role a user holds on a specific board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// May manage columns and membership.
    Admin,
    /// May view the board and work on tasks.
    Member,
}

impl MemberRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = ParseMemberRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            _ => Err(ParseMemberRoleError(value.to_owned())),
        }
    }
}

/// A user's membership on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMember {
    board_id: BoardId,
    user_id: UserId,
    role: MemberRole,
    joined_at: DateTime<Utc>,
}

impl BoardMember {
    /// Creates a membership record.
    #[must_use]
    pub const fn new(
        board_id: BoardId,
        user_id: UserId,
        role: MemberRole,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            board_id,
            user_id,
            role,
            joined_at,
        }
    }

    /// Returns the board.
    #[must_use]
    pub const fn board_id(&self) -> BoardId {
        self.board_id
    }

    /// Returns the member user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the member's role.
    #[must_use]
    pub const fn role(&self) -> MemberRole {
        self.role
    }

    /// Returns when the user joined the board.
    #[must_use]
    pub const fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Returns `true` for board admins.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, MemberRole::Admin)
    }

    /// Changes the member's role.
    pub const fn set_role(&mut self, role: MemberRole) {
        self.role = role;
    }
}
