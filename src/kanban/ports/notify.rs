//! Fire-and-forget notification port for board mutations.

use crate::kanban::domain::{BoardId, ColumnId, Effort, TaskId, TaskStatus, UserId};
use serde::Serialize;

/// Mutation broadcast to interested clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A board was created.
    BoardCreated {
        /// New board.
        board_id: BoardId,
        /// Creating user.
        actor: UserId,
    },
    /// A board was renamed, deactivated, or changed membership.
    BoardUpdated {
        /// Updated board.
        board_id: BoardId,
        /// Acting user.
        actor: UserId,
    },
    /// Columns were added, edited, reordered, or deleted.
    ColumnsChanged {
        /// Board whose column list changed.
        board_id: BoardId,
        /// Acting user.
        actor: UserId,
    },
    /// A task was created.
    TaskCreated {
        /// Board holding the task.
        board_id: BoardId,
        /// New task.
        task_id: TaskId,
        /// Creating user.
        actor: UserId,
    },
    /// Task attributes, lock, or status changed without a re-column.
    TaskUpdated {
        /// Board holding the task.
        board_id: BoardId,
        /// Updated task.
        task_id: TaskId,
        /// Acting user.
        actor: UserId,
    },
    /// A task changed column or position.
    TaskMoved {
        /// Board holding the task.
        board_id: BoardId,
        /// Moved task.
        task_id: TaskId,
        /// Column before the move.
        from_column: ColumnId,
        /// Column after the move.
        to_column: ColumnId,
        /// Position after the move.
        position: u32,
        /// Status after the move.
        status: TaskStatus,
        /// Acting user.
        actor: UserId,
    },
    /// A task was deleted.
    TaskDeleted {
        /// Board that held the task.
        board_id: BoardId,
        /// Deleted task.
        task_id: TaskId,
        /// Acting user.
        actor: UserId,
    },
    /// A timer was started.
    TimerStarted {
        /// Timed task.
        task_id: TaskId,
        /// Timing user.
        user_id: UserId,
    },
    /// A timer was stopped and its effort booked.
    TimerStopped {
        /// Timed task.
        task_id: TaskId,
        /// Timing user.
        user_id: UserId,
        /// Booked effort.
        duration: Effort,
    },
    /// Tracked effort was overwritten outside the ledger.
    EffortAdjusted {
        /// Adjusted task.
        task_id: TaskId,
        /// Effort before the adjustment.
        previous: Effort,
        /// Effort after the adjustment.
        current: Effort,
        /// Acting user.
        actor: UserId,
    },
}

impl BoardEvent {
    /// Returns the snake-case event tag used in serialized payloads.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BoardCreated { .. } => "board_created",
            Self::BoardUpdated { .. } => "board_updated",
            Self::ColumnsChanged { .. } => "columns_changed",
            Self::TaskCreated { .. } => "task_created",
            Self::TaskUpdated { .. } => "task_updated",
            Self::TaskMoved { .. } => "task_moved",
            Self::TaskDeleted { .. } => "task_deleted",
            Self::TimerStarted { .. } => "timer_started",
            Self::TimerStopped { .. } => "timer_stopped",
            Self::EffortAdjusted { .. } => "effort_adjusted",
        }
    }
}

/// Fire-and-forget sink for [`BoardEvent`]s.
///
/// Implementations must not block or fail the calling operation.
#[cfg_attr(test, mockall::automock)]
pub trait BoardNotifier: Send + Sync {
    /// Publishes an event.
    fn notify(&self, event: &BoardEvent);
}
