//! Read model of a board with nested columns and tasks.

use super::{Board, BoardMember, Column, ColumnId, Task};
use serde::Serialize;
use std::collections::HashMap;

/// A column with its tasks in position order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSnapshot {
    /// The column.
    pub column: Column,
    /// Tasks held by the column, ordered by position.
    pub tasks: Vec<Task>,
}

/// A board with its members and ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    /// The board.
    pub board: Board,
    /// Board members.
    pub members: Vec<BoardMember>,
    /// Columns ordered by position.
    pub columns: Vec<ColumnSnapshot>,
}

impl BoardSnapshot {
    /// Groups `tasks` under `columns` and orders both by position.
    ///
    /// Tasks whose column is not in `columns` are dropped.
    #[must_use]
    pub fn assemble(
        board: Board,
        members: Vec<BoardMember>,
        mut columns: Vec<Column>,
        tasks: Vec<Task>,
    ) -> Self {
        columns.sort_by_key(|column| (column.position(), column.id()));
        let mut by_column: HashMap<ColumnId, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_column.entry(task.column_id()).or_default().push(task);
        }
        let columns = columns
            .into_iter()
            .map(|column| {
                let mut column_tasks = by_column.remove(&column.id()).unwrap_or_default();
                column_tasks.sort_by_key(|task| (task.position(), task.id()));
                ColumnSnapshot {
                    column,
                    tasks: column_tasks,
                }
            })
            .collect();
        Self {
            board,
            members,
            columns,
        }
    }

    /// Returns the total number of tasks on the board.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|snapshot| snapshot.tasks.len()).sum()
    }

    /// Finds a column snapshot by identifier.
    #[must_use]
    pub fn column(&self, column_id: ColumnId) -> Option<&ColumnSnapshot> {
        self.columns
            .iter()
            .find(|snapshot| snapshot.column.id() == column_id)
    }
}
