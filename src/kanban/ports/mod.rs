//! Port contracts for the Kanban engine.
//!
//! Ports define infrastructure-agnostic interfaces used by the services:
//! stores for persistence, an access policy for authorization, and a
//! notifier for change broadcasts.

pub mod access;
pub mod error;
pub mod notify;
pub mod store;

pub use access::{AccessPolicy, Permission};
pub use error::{KanbanStoreError, KanbanStoreResult};
pub use notify::{BoardEvent, BoardNotifier};
pub use store::{
    BoardStore, ChangeStatusCommand, ColumnStore, HistoryStore, KanbanStore, MoveTaskCommand,
    NewTaskCommand, TaskStore, TimeLedgerStore,
};

#[cfg(test)]
pub use access::MockAccessPolicy;
#[cfg(test)]
pub use notify::MockBoardNotifier;
