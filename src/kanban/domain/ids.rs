//! Identifier newtypes for boards, columns, tasks, users, and ledger rows.
//!
//! Each identifier wraps a UUID so that a column identifier can never be
//! passed where a task identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a Kanban board.
    BoardId
);

uuid_identifier!(
    /// Unique identifier for a board column.
    ColumnId
);

uuid_identifier!(
    /// Unique identifier for a task on a board.
    TaskId
);

uuid_identifier!(
    /// Identifier of a platform user (actor, assignee, or board member).
    UserId
);

uuid_identifier!(
    /// Identifier of the project a board is attached to.
    ProjectId
);

uuid_identifier!(
    /// Unique identifier for a task history entry.
    HistoryEntryId
);

uuid_identifier!(
    /// Unique identifier for a time log session.
    TimeLogId
);
