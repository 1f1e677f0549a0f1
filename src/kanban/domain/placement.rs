//! Dense per-column ordering and move planning.
//!
//! A [`ColumnOrder`] is a snapshot of one column's tasks ranked by stored
//! position. [`plan_move`] removes the moving task from its source order,
//! inserts it into the target order, and reports every task whose stored
//! position differs from its new rank. Applying the reported assignments
//! leaves each affected column holding exactly the positions
//! `0..len`, which covers both shift rules:
//!
//! - same column, moving down: tasks in `(old, new]` move up by one;
//! - same column, moving up: tasks in `[new, old)` move down by one;
//! - cross column: later tasks in the source close the gap and tasks at or
//!   after the slot in the target make room.

use super::{ColumnId, KanbanDomainError, TaskId};
use serde::{Deserialize, Serialize};

/// Tasks of one column in rank order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrder {
    column_id: ColumnId,
    entries: Vec<(TaskId, u32)>,
}

impl ColumnOrder {
    /// Builds the order of `column_id` from `(task, stored position)` pairs.
    ///
    /// Ties on position are broken by task identifier so the order is
    /// deterministic even for rows written by a faulty writer.
    #[must_use]
    pub fn from_positions(
        column_id: ColumnId,
        positions: impl IntoIterator<Item = (TaskId, u32)>,
    ) -> Self {
        let mut entries: Vec<(TaskId, u32)> = positions.into_iter().collect();
        entries.sort_by_key(|&(task_id, position)| (position, task_id));
        Self { column_id, entries }
    }

    /// Returns the column this order describes.
    #[must_use]
    pub const fn column_id(&self) -> ColumnId {
        self.column_id
    }

    /// Returns the number of tasks in the column.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the column holds no tasks.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the task identifiers in rank order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.entries.iter().map(|&(task_id, _)| task_id)
    }

    /// Returns the rank of `task_id`, if present.
    #[must_use]
    pub fn rank_of(&self, task_id: TaskId) -> Option<usize> {
        self.entries.iter().position(|&(id, _)| id == task_id)
    }

    /// Returns the position a newly appended task receives.
    #[must_use]
    pub fn append_position(&self) -> u32 {
        to_position(self.entries.len())
    }

    /// Returns `true` when stored positions are exactly `0..len`.
    #[must_use]
    pub fn is_dense(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(rank, &(_, position))| position == to_position(rank))
    }

    /// Plans the removal of `task_id`, closing the gap it leaves.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanDomainError::TaskNotInColumn`] when the task is not
    /// part of this order.
    pub fn plan_removal(
        &self,
        task_id: TaskId,
    ) -> Result<Vec<PositionAssignment>, KanbanDomainError> {
        let mut remaining = self.ranked_ids();
        let rank = self.require_rank(task_id)?;
        remaining.remove(rank);
        Ok(self.diff(&remaining, None))
    }

    fn require_rank(&self, task_id: TaskId) -> Result<usize, KanbanDomainError> {
        self.rank_of(task_id)
            .ok_or(KanbanDomainError::TaskNotInColumn {
                task_id,
                column_id: self.column_id,
            })
    }

    fn ranked_ids(&self) -> Vec<TaskId> {
        self.task_ids().collect()
    }

    fn stored_position(&self, task_id: TaskId) -> Option<u32> {
        self.entries
            .iter()
            .find(|&&(id, _)| id == task_id)
            .map(|&(_, position)| position)
    }

    /// Lists every task of `ranked` whose stored position differs from its
    /// rank. `skip` is excluded; the caller reports it separately.
    fn diff(&self, ranked: &[TaskId], skip: Option<TaskId>) -> Vec<PositionAssignment> {
        ranked
            .iter()
            .enumerate()
            .filter(|&(_, &task_id)| Some(task_id) != skip)
            .filter_map(|(rank, &task_id)| {
                let position = to_position(rank);
                (self.stored_position(task_id) != Some(position)).then_some(PositionAssignment {
                    task_id,
                    column_id: self.column_id,
                    position,
                })
            })
            .collect()
    }
}

/// New position for a task displaced by a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionAssignment {
    /// Displaced task.
    pub task_id: TaskId,
    /// Column the task stays in.
    pub column_id: ColumnId,
    /// New zero-based position.
    pub position: u32,
}

/// Outcome of planning a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Task being moved.
    pub task_id: TaskId,
    /// Destination column.
    pub column_id: ColumnId,
    /// Destination position after clamping.
    pub position: u32,
    /// Other tasks whose position changes, in either column.
    pub shifts: Vec<PositionAssignment>,
}

impl MovePlan {
    /// Returns `true` when nothing but the moving task's own row changes.
    #[must_use]
    pub fn is_in_place(&self) -> bool {
        self.shifts.is_empty()
    }
}

/// Requested destination slot for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotRequest {
    /// Insert at this zero-based position, clamped to the column's end.
    At(u32),
    /// Insert after the last task.
    Append,
}

impl SlotRequest {
    /// Resolves the request against a column whose highest valid insertion
    /// index is `max_rank`.
    fn resolve(self, max_rank: usize) -> usize {
        match self {
            Self::At(position) => usize::try_from(position).map_or(max_rank, |p| p.min(max_rank)),
            Self::Append => max_rank,
        }
    }
}

/// Plans moving `task_id` out of `source` into `target`.
///
/// When `target` is `None` or describes the same column as `source`, the
/// move is a same-column reorder and the slot is clamped to `len - 1`;
/// otherwise it is clamped to the target's length (append).
///
/// # Errors
///
/// Returns [`KanbanDomainError::TaskNotInColumn`] when `task_id` is not in
/// `source`.
pub fn plan_move(
    source: &ColumnOrder,
    target: Option<&ColumnOrder>,
    task_id: TaskId,
    slot: SlotRequest,
) -> Result<MovePlan, KanbanDomainError> {
    let old_rank = source.require_rank(task_id)?;
    let mut source_ranked = source.ranked_ids();
    source_ranked.remove(old_rank);

    match target.filter(|order| order.column_id != source.column_id) {
        None => {
            let new_rank = slot.resolve(source_ranked.len());
            source_ranked.insert(new_rank, task_id);
            Ok(MovePlan {
                task_id,
                column_id: source.column_id,
                position: to_position(new_rank),
                shifts: source.diff(&source_ranked, Some(task_id)),
            })
        }
        Some(target_order) => {
            let mut target_ranked = target_order.ranked_ids();
            let new_rank = slot.resolve(target_ranked.len());
            target_ranked.insert(new_rank, task_id);
            let mut shifts = source.diff(&source_ranked, None);
            shifts.extend(target_order.diff(&target_ranked, Some(task_id)));
            Ok(MovePlan {
                task_id,
                column_id: target_order.column_id,
                position: to_position(new_rank),
                shifts,
            })
        }
    }
}

/// Converts a rank to a stored position. Columns never approach `u32::MAX`
/// tasks, so saturation only guards the conversion.
fn to_position(rank: usize) -> u32 {
    u32::try_from(rank).unwrap_or(u32::MAX)
}
