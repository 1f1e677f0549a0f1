//! The acting user behind a board operation.

use super::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform-wide role of the acting user, as reported by authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Platform administrator.
    Admin,
    /// Project or team manager.
    Manager,
    /// Regular employee.
    Employee,
}

impl ActorRole {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    user_id: UserId,
    role: ActorRole,
}

impl Actor {
    /// Creates an actor from an authenticated user and role.
    #[must_use]
    pub const fn new(user_id: UserId, role: ActorRole) -> Self {
        Self { user_id, role }
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the acting user's platform role.
    #[must_use]
    pub const fn role(&self) -> ActorRole {
        self.role
    }
}
