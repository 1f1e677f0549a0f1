//! Domain model for the Kanban board engine.
//!
//! Boards own ordered columns, columns own densely ranked tasks, and tasks
//! accrue history entries and timer sessions. Everything here is free of
//! infrastructure; the store ports decide how values are persisted.

mod actor;
mod board;
mod column;
mod error;
mod history;
mod ids;
mod placement;
mod task;
mod time_log;
mod values;
mod view;

pub use actor::{Actor, ActorRole};
pub use board::{Board, BoardMember, MemberRole, PersistedBoardData};
pub use column::{
    Column, ColumnChanges, ColumnTemplate, PersistedColumnData, column_for_status,
    is_complete_column_order, next_column_position, resequence_columns,
};
pub use error::{
    KanbanDomainError, ParseHistorySourceError, ParseMemberRoleError, ParsePriorityError,
};
pub use history::{
    HistoryOrder, HistorySource, PersistedHistoryData, TaskHistoryEntry, TaskTransition,
};
pub use ids::{BoardId, ColumnId, HistoryEntryId, ProjectId, TaskId, TimeLogId, UserId};
pub use placement::{ColumnOrder, MovePlan, PositionAssignment, SlotRequest, plan_move};
pub use task::{PersistedTaskData, Task, TaskChanges, TaskDraft, TaskPlacement};
pub use time_log::{PersistedTimeLogData, TimeLogEntry, rounded_minutes};
pub use values::{
    ColumnColor, Effort, MAX_COLUMN_NAME_LEN, MAX_STATUS_LEN, MAX_TITLE_LEN, Priority, TaskCode,
    TaskStatus,
};
pub use view::{BoardSnapshot, ColumnSnapshot};
