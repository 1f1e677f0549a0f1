//! Conversions between Diesel rows and domain values.

use super::models::{
    BoardRow, ColumnRow, HistoryRow, MemberRow, TaskChangeset, TaskRow, TimeLogRow,
};
use crate::kanban::{
    domain::{
        Board, BoardId, BoardMember, Column, ColumnColor, ColumnId, ColumnOrder, Effort,
        HistoryEntryId, HistorySource, MemberRole, PersistedBoardData, PersistedColumnData,
        PersistedHistoryData, PersistedTaskData, PersistedTimeLogData, Priority, ProjectId, Task,
        TaskCode, TaskHistoryEntry, TaskId, TaskPlacement, TaskStatus, TimeLogEntry, TimeLogId,
        UserId,
    },
    ports::{KanbanStoreError, KanbanStoreResult},
};

pub(super) fn to_db_int(value: u32) -> KanbanStoreResult<i32> {
    i32::try_from(value).map_err(KanbanStoreError::persistence)
}

pub(super) fn from_db_int(value: i32) -> KanbanStoreResult<u32> {
    u32::try_from(value).map_err(KanbanStoreError::persistence)
}

pub(super) fn board_to_row(board: &Board) -> KanbanStoreResult<BoardRow> {
    Ok(BoardRow {
        id: board.id().into_inner(),
        name: board.name().to_owned(),
        project_id: board.project_id().map(ProjectId::into_inner),
        is_active: board.is_active(),
        created_by: board.created_by().into_inner(),
        next_task_number: i64::try_from(board.next_task_number())
            .map_err(KanbanStoreError::persistence)?,
        created_at: board.created_at(),
        updated_at: board.updated_at(),
    })
}

pub(super) fn row_to_board(row: BoardRow) -> KanbanStoreResult<Board> {
    Ok(Board::from_persisted(PersistedBoardData {
        id: BoardId::from_uuid(row.id),
        name: row.name,
        project_id: row.project_id.map(ProjectId::from_uuid),
        active: row.is_active,
        created_by: UserId::from_uuid(row.created_by),
        next_task_number: u64::try_from(row.next_task_number)
            .map_err(KanbanStoreError::persistence)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

pub(super) fn member_to_row(member: &BoardMember) -> MemberRow {
    MemberRow {
        board_id: member.board_id().into_inner(),
        user_id: member.user_id().into_inner(),
        role: member.role().as_str().to_owned(),
        joined_at: member.joined_at(),
    }
}

pub(super) fn row_to_member(row: MemberRow) -> KanbanStoreResult<BoardMember> {
    let role = MemberRole::try_from(row.role.as_str()).map_err(KanbanStoreError::persistence)?;
    Ok(BoardMember::new(
        BoardId::from_uuid(row.board_id),
        UserId::from_uuid(row.user_id),
        role,
        row.joined_at,
    ))
}

pub(super) fn column_to_row(column: &Column) -> KanbanStoreResult<ColumnRow> {
    Ok(ColumnRow {
        id: column.id().into_inner(),
        board_id: column.board_id().into_inner(),
        name: column.name().to_owned(),
        status: column.status().as_str().to_owned(),
        position: to_db_int(column.position())?,
        color: column.color().as_str().to_owned(),
        created_at: column.created_at(),
        updated_at: column.updated_at(),
    })
}

pub(super) fn row_to_column(row: ColumnRow) -> KanbanStoreResult<Column> {
    Ok(Column::from_persisted(PersistedColumnData {
        id: ColumnId::from_uuid(row.id),
        board_id: BoardId::from_uuid(row.board_id),
        name: row.name,
        status: TaskStatus::new(row.status).map_err(KanbanStoreError::persistence)?,
        position: from_db_int(row.position)?,
        color: ColumnColor::new(row.color).map_err(KanbanStoreError::persistence)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

pub(super) fn task_to_row(task: &Task) -> KanbanStoreResult<TaskRow> {
    Ok(TaskRow {
        id: task.id().into_inner(),
        board_id: task.board_id().into_inner(),
        column_id: task.column_id().into_inner(),
        code: task.code().as_str().to_owned(),
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        position: to_db_int(task.position())?,
        assignee_id: task.assignee().map(UserId::into_inner),
        due_date: task.due_date(),
        estimated_minutes: task.estimate().map(|e| to_db_int(e.minutes())).transpose()?,
        actual_minutes: to_db_int(task.actual().minutes())?,
        reopened_count: to_db_int(task.reopened_count())?,
        is_locked: task.is_locked(),
        created_by: task.created_by().into_inner(),
        updated_by: task.updated_by().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

pub(super) fn task_to_changeset(task: &Task) -> KanbanStoreResult<TaskChangeset> {
    let TaskRow {
        column_id,
        title,
        description,
        status,
        priority,
        position,
        assignee_id,
        due_date,
        estimated_minutes,
        actual_minutes,
        reopened_count,
        is_locked,
        updated_by,
        updated_at,
        ..
    } = task_to_row(task)?;
    Ok(TaskChangeset {
        column_id,
        title,
        description,
        status,
        priority,
        position,
        assignee_id,
        due_date,
        estimated_minutes,
        actual_minutes,
        reopened_count,
        is_locked,
        updated_by,
        updated_at,
    })
}

pub(super) fn row_to_task(row: TaskRow) -> KanbanStoreResult<Task> {
    let TaskRow {
        id,
        board_id,
        column_id,
        code,
        title,
        description,
        status,
        priority,
        position,
        assignee_id,
        due_date,
        estimated_minutes,
        actual_minutes,
        reopened_count,
        is_locked,
        created_by,
        updated_by,
        created_at,
        updated_at,
    } = row;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        board_id: BoardId::from_uuid(board_id),
        column_id: ColumnId::from_uuid(column_id),
        code: TaskCode::from_persisted(code),
        title,
        description,
        status: TaskStatus::new(status).map_err(KanbanStoreError::persistence)?,
        priority: Priority::try_from(priority.as_str()).map_err(KanbanStoreError::persistence)?,
        position: from_db_int(position)?,
        assignee: assignee_id.map(UserId::from_uuid),
        due_date,
        estimate: estimated_minutes
            .map(|minutes| from_db_int(minutes).map(Effort::from_minutes))
            .transpose()?,
        actual: Effort::from_minutes(from_db_int(actual_minutes)?),
        reopened_count: from_db_int(reopened_count)?,
        locked: is_locked,
        created_by: UserId::from_uuid(created_by),
        updated_by: UserId::from_uuid(updated_by),
        created_at,
        updated_at,
    }))
}

/// Builds the rank order of `column_id` from locked task rows.
pub(super) fn rows_to_order(
    column_id: ColumnId,
    rows: &[TaskRow],
) -> KanbanStoreResult<ColumnOrder> {
    let column_uuid = column_id.into_inner();
    let positions = rows
        .iter()
        .filter(|row| row.column_id == column_uuid)
        .map(|row| Ok((TaskId::from_uuid(row.id), from_db_int(row.position)?)))
        .collect::<KanbanStoreResult<Vec<_>>>()?;
    Ok(ColumnOrder::from_positions(column_id, positions))
}

pub(super) fn history_to_row(entry: &TaskHistoryEntry) -> KanbanStoreResult<HistoryRow> {
    let before = entry.before();
    Ok(HistoryRow {
        id: entry.id().into_inner(),
        task_id: entry.task_id().into_inner(),
        source: entry.source().as_str().to_owned(),
        old_status: before.map(|placement| placement.status.as_str().to_owned()),
        new_status: entry.after().status.as_str().to_owned(),
        old_column_id: before.map(|placement| placement.column_id.into_inner()),
        new_column_id: entry.after().column_id.into_inner(),
        old_position: before.map(|placement| to_db_int(placement.position)).transpose()?,
        new_position: to_db_int(entry.after().position)?,
        changed_by: entry.changed_by().into_inner(),
        changed_at: entry.changed_at(),
    })
}

pub(super) fn row_to_history(row: HistoryRow) -> KanbanStoreResult<TaskHistoryEntry> {
    let before = match (row.old_status, row.old_column_id, row.old_position) {
        (Some(status), Some(column_id), Some(position)) => Some(TaskPlacement {
            column_id: ColumnId::from_uuid(column_id),
            position: from_db_int(position)?,
            status: TaskStatus::new(status).map_err(KanbanStoreError::persistence)?,
        }),
        _ => None,
    };
    Ok(TaskHistoryEntry::from_persisted(PersistedHistoryData {
        id: HistoryEntryId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        source: HistorySource::try_from(row.source.as_str())
            .map_err(KanbanStoreError::persistence)?,
        before,
        after: TaskPlacement {
            column_id: ColumnId::from_uuid(row.new_column_id),
            position: from_db_int(row.new_position)?,
            status: TaskStatus::new(row.new_status).map_err(KanbanStoreError::persistence)?,
        },
        changed_by: UserId::from_uuid(row.changed_by),
        changed_at: row.changed_at,
    }))
}

pub(super) fn time_log_to_row(entry: &TimeLogEntry) -> KanbanStoreResult<TimeLogRow> {
    Ok(TimeLogRow {
        id: entry.id().into_inner(),
        task_id: entry.task_id().into_inner(),
        user_id: entry.user_id().into_inner(),
        started_at: entry.started_at(),
        ended_at: entry.ended_at(),
        duration_minutes: entry.duration().map(|d| to_db_int(d.minutes())).transpose()?,
        is_active: entry.is_active(),
    })
}

pub(super) fn row_to_time_log(row: TimeLogRow) -> KanbanStoreResult<TimeLogEntry> {
    Ok(TimeLogEntry::from_persisted(PersistedTimeLogData {
        id: TimeLogId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        user_id: UserId::from_uuid(row.user_id),
        started_at: row.started_at,
        ended_at: row.ended_at,
        duration: row
            .duration_minutes
            .map(|minutes| from_db_int(minutes).map(Effort::from_minutes))
            .transpose()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::{history_to_row, row_to_history, row_to_task, task_to_row};
    use crate::kanban::domain::{
        BoardId, Column, ColumnTemplate, HistorySource, Priority, TaskCode, TaskDraft,
        TaskHistoryEntry, Task, UserId,
    };
    use chrono::Utc;

    fn sample_task() -> Task {
        let now = Utc::now();
        let template = ColumnTemplate::new("Review", "review", None).expect("valid template");
        let column = Column::new(BoardId::new(), &template, 3, now).expect("valid column");
        let draft = TaskDraft {
            title: "Ship the importer".to_owned(),
            priority: Priority::Critical,
            ..TaskDraft::default()
        };
        Task::new(&column, 4, TaskCode::from_sequence("TASK", 12), draft, UserId::new(), now)
            .expect("valid task")
    }

    #[test]
    fn task_rows_preserve_every_field() {
        let task = sample_task();
        let row = task_to_row(&task).expect("task fits the schema");
        assert_eq!(row.priority, "critical");
        assert_eq!(row.position, 4);
        assert_eq!(row_to_task(row).expect("row converts back"), task);
    }

    #[test]
    fn creation_history_rows_have_no_previous_placement() {
        let task = sample_task();
        let entry = TaskHistoryEntry::created(&task, HistorySource::Integration);
        let row = history_to_row(&entry).expect("entry fits the schema");
        assert!(row.old_status.is_none() && row.old_column_id.is_none());
        assert_eq!(row.source, "integration");
        assert_eq!(row_to_history(row).expect("row converts back"), entry);
    }

    #[test]
    fn unknown_priority_is_a_persistence_error() {
        let mut row = task_to_row(&sample_task()).expect("task fits the schema");
        row.priority = "urgent".to_owned();
        assert!(row_to_task(row).is_err());
    }
}
