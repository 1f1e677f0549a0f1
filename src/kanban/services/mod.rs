//! Application services for the Kanban engine.
//!
//! Services check access, delegate each mutation to one atomic store call,
//! record history, and publish board events.

mod board;
mod column;
mod context;
mod error;
mod task;
mod time_ledger;

pub use board::{BoardService, CreateBoardRequest};
pub use column::{AddColumnRequest, ColumnService, UpdateColumnRequest};
pub use context::KanbanContext;
pub use error::{ErrorKind, KanbanServiceError, KanbanServiceResult};
pub use task::{CreateTaskRequest, MoveTaskRequest, SetStatusRequest, TaskService};
pub use time_ledger::{StoppedTimer, TimeLedgerService};
