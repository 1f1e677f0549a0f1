//! `PostgreSQL` implementation of the Kanban store ports.
//!
//! Every mutating method runs inside one transaction. Row locks are always
//! taken in the same order: the owning `kanban_boards` row when the writer
//! needs it, then the affected `kanban_columns` rows in ascending id order,
//! then the task rows of those columns. Moves within a column are therefore
//! serialized, and no writer waits on a board row while holding a column.

use super::{
    conversion::{
        board_to_row, column_to_row, history_to_row, member_to_row, row_to_board,
        row_to_column, row_to_history, row_to_member, row_to_task, row_to_time_log,
        rows_to_order, task_to_changeset, task_to_row, time_log_to_row, to_db_int,
    },
    models::{BoardRow, ColumnRow, HistoryRow, MemberRow, TaskRow, TimeLogRow},
    schema::{
        kanban_board_members, kanban_boards, kanban_columns, kanban_task_history, kanban_tasks,
        kanban_time_logs,
    },
};
use crate::kanban::{
    domain::{
        Board, BoardId, BoardMember, Column, ColumnChanges, ColumnId, ColumnTemplate, Effort,
        HistoryOrder, MovePlan, SlotRequest, Task, TaskChanges, TaskCode, TaskHistoryEntry,
        TaskId, TaskPlacement, TaskStatus, TaskTransition, TimeLogEntry, UserId,
        column_for_status, is_complete_column_order, next_column_position, plan_move,
        resequence_columns,
    },
    ports::{
        BoardStore, ChangeStatusCommand, ColumnStore, HistoryStore, KanbanStoreError,
        KanbanStoreResult, MoveTaskCommand, NewTaskCommand, TaskStore, TimeLedgerStore,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by the Kanban store.
pub type KanbanPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed Kanban store.
#[derive(Debug, Clone)]
pub struct PostgresKanbanStore {
    pool: KanbanPgPool,
}

impl From<DieselError> for KanbanStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresKanbanStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: KanbanPgPool) -> Self {
        Self { pool }
    }

    /// Builds a store with a fresh pool of at most `max_connections`
    /// connections to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`KanbanStoreError::Persistence`] when the pool cannot
    /// establish its connections.
    pub fn connect(database_url: &str, max_connections: u32) -> KanbanStoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_connections)
            .build(manager)
            .map_err(KanbanStoreError::persistence)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> KanbanStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> KanbanStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(KanbanStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(KanbanStoreError::persistence)?
    }

    async fn run_transaction<F, T>(&self, f: F) -> KanbanStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> KanbanStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(move |connection| {
            connection.transaction::<T, KanbanStoreError, _>(f)
        })
        .await
    }
}

fn lock_board(connection: &mut PgConnection, id: BoardId) -> KanbanStoreResult<Board> {
    let row = kanban_boards::table
        .filter(kanban_boards::id.eq(id.into_inner()))
        .select(BoardRow::as_select())
        .for_update()
        .first::<BoardRow>(connection)
        .optional()?
        .ok_or(KanbanStoreError::BoardNotFound(id))?;
    row_to_board(row)
}

fn load_board(connection: &mut PgConnection, id: BoardId) -> KanbanStoreResult<Board> {
    let row = kanban_boards::table
        .filter(kanban_boards::id.eq(id.into_inner()))
        .select(BoardRow::as_select())
        .first::<BoardRow>(connection)
        .optional()?
        .ok_or(KanbanStoreError::BoardNotFound(id))?;
    row_to_board(row)
}

fn ensure_active(board: &Board) -> KanbanStoreResult<()> {
    if !board.is_active() {
        return Err(KanbanStoreError::BoardInactive(board.id()));
    }
    Ok(())
}

fn load_column(connection: &mut PgConnection, id: ColumnId) -> KanbanStoreResult<Column> {
    let row = kanban_columns::table
        .filter(kanban_columns::id.eq(id.into_inner()))
        .select(ColumnRow::as_select())
        .first::<ColumnRow>(connection)
        .optional()?
        .ok_or(KanbanStoreError::ColumnNotFound(id))?;
    row_to_column(row)
}

fn load_board_columns(
    connection: &mut PgConnection,
    board_id: BoardId,
) -> KanbanStoreResult<Vec<Column>> {
    kanban_columns::table
        .filter(kanban_columns::board_id.eq(board_id.into_inner()))
        .order((kanban_columns::position.asc(), kanban_columns::id.asc()))
        .select(ColumnRow::as_select())
        .load::<ColumnRow>(connection)?
        .into_iter()
        .map(row_to_column)
        .collect()
}

/// Locks the given columns in ascending id order and returns them.
fn lock_columns(
    connection: &mut PgConnection,
    ids: &[ColumnId],
) -> KanbanStoreResult<Vec<Column>> {
    let mut uuids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
    uuids.sort_unstable();
    uuids.dedup();
    let rows = kanban_columns::table
        .filter(kanban_columns::id.eq_any(&uuids))
        .order(kanban_columns::id.asc())
        .select(ColumnRow::as_select())
        .for_update()
        .load::<ColumnRow>(connection)?;
    let columns = rows
        .into_iter()
        .map(row_to_column)
        .collect::<KanbanStoreResult<Vec<_>>>()?;
    for id in ids {
        if !columns.iter().any(|column| column.id() == *id) {
            return Err(KanbanStoreError::ColumnNotFound(*id));
        }
    }
    Ok(columns)
}

/// Locks every task row held by the given (already locked) columns.
fn lock_column_tasks(
    connection: &mut PgConnection,
    ids: &[ColumnId],
) -> KanbanStoreResult<Vec<TaskRow>> {
    let uuids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
    Ok(kanban_tasks::table
        .filter(kanban_tasks::column_id.eq_any(&uuids))
        .order(kanban_tasks::id.asc())
        .select(TaskRow::as_select())
        .for_update()
        .load::<TaskRow>(connection)?)
}

fn load_task_row(connection: &mut PgConnection, id: TaskId) -> KanbanStoreResult<TaskRow> {
    kanban_tasks::table
        .filter(kanban_tasks::id.eq(id.into_inner()))
        .select(TaskRow::as_select())
        .first::<TaskRow>(connection)
        .optional()?
        .ok_or(KanbanStoreError::TaskNotFound(id))
}

fn lock_task(connection: &mut PgConnection, id: TaskId) -> KanbanStoreResult<Task> {
    let row = kanban_tasks::table
        .filter(kanban_tasks::id.eq(id.into_inner()))
        .select(TaskRow::as_select())
        .for_update()
        .first::<TaskRow>(connection)
        .optional()?
        .ok_or(KanbanStoreError::TaskNotFound(id))?;
    row_to_task(row)
}

/// Picks the moving task out of the locked rows, failing when another
/// writer moved it out of `expected_column` before the locks were taken.
fn take_locked_task(
    rows: &[TaskRow],
    id: TaskId,
    expected_column: ColumnId,
) -> KanbanStoreResult<Task> {
    let row = rows
        .iter()
        .find(|row| row.id == id.into_inner())
        .filter(|row| row.column_id == expected_column.into_inner())
        .ok_or(KanbanStoreError::ConcurrentModification(id))?;
    row_to_task(row.clone())
}

fn save_task(connection: &mut PgConnection, task: &Task) -> KanbanStoreResult<()> {
    let changeset = task_to_changeset(task)?;
    diesel::update(kanban_tasks::table.filter(kanban_tasks::id.eq(task.id().into_inner())))
        .set(&changeset)
        .execute(connection)?;
    Ok(())
}

/// Writes a move plan: shifted siblings first, then the moving task.
fn commit_plan(
    connection: &mut PgConnection,
    mut task: Task,
    plan: &MovePlan,
    status: TaskStatus,
    actor: UserId,
    now: DateTime<Utc>,
) -> KanbanStoreResult<TaskTransition> {
    for shift in &plan.shifts {
        diesel::update(kanban_tasks::table.filter(kanban_tasks::id.eq(shift.task_id.into_inner())))
            .set(kanban_tasks::position.eq(to_db_int(shift.position)?))
            .execute(connection)?;
    }
    let before = task.placement();
    task.place(
        TaskPlacement {
            column_id: plan.column_id,
            position: plan.position,
            status,
        },
        actor,
        now,
    );
    save_task(connection, &task)?;
    Ok(TaskTransition { before, task })
}

/// Locks `task_id`'s row, applies `mutate`, and writes it back.
fn update_locked_task<F>(
    connection: &mut PgConnection,
    task_id: TaskId,
    mutate: F,
) -> KanbanStoreResult<Task>
where
    F: FnOnce(&mut Task) -> KanbanStoreResult<()>,
{
    let mut task = lock_task(connection, task_id)?;
    ensure_active(&load_board(connection, task.board_id())?)?;
    mutate(&mut task)?;
    save_task(connection, &task)?;
    Ok(task)
}

fn write_column_position(
    connection: &mut PgConnection,
    id: ColumnId,
    position: u32,
    now: DateTime<Utc>,
) -> KanbanStoreResult<()> {
    diesel::update(kanban_columns::table.filter(kanban_columns::id.eq(id.into_inner())))
        .set((
            kanban_columns::position.eq(to_db_int(position)?),
            kanban_columns::updated_at.eq(now),
        ))
        .execute(connection)?;
    Ok(())
}

fn admin_count(connection: &mut PgConnection, board_id: BoardId) -> KanbanStoreResult<i64> {
    Ok(kanban_board_members::table
        .filter(kanban_board_members::board_id.eq(board_id.into_inner()))
        .filter(kanban_board_members::role.eq("admin"))
        .count()
        .get_result::<i64>(connection)?)
}

fn find_member_row(
    connection: &mut PgConnection,
    board_id: BoardId,
    user_id: UserId,
) -> KanbanStoreResult<Option<MemberRow>> {
    Ok(kanban_board_members::table
        .filter(kanban_board_members::board_id.eq(board_id.into_inner()))
        .filter(kanban_board_members::user_id.eq(user_id.into_inner()))
        .select(MemberRow::as_select())
        .first::<MemberRow>(connection)
        .optional()?)
}

fn find_active_session(
    connection: &mut PgConnection,
    task_id: TaskId,
    user_id: UserId,
    lock: bool,
) -> KanbanStoreResult<Option<TimeLogRow>> {
    let query = kanban_time_logs::table
        .filter(kanban_time_logs::task_id.eq(task_id.into_inner()))
        .filter(kanban_time_logs::user_id.eq(user_id.into_inner()))
        .filter(kanban_time_logs::is_active.eq(true))
        .select(TimeLogRow::as_select());
    let row = if lock {
        query.for_update().first::<TimeLogRow>(connection).optional()?
    } else {
        query.first::<TimeLogRow>(connection).optional()?
    };
    Ok(row)
}

#[async_trait]
impl BoardStore for PostgresKanbanStore {
    async fn create_board(
        &self,
        board: &Board,
        columns: &[Column],
        owner: &BoardMember,
    ) -> KanbanStoreResult<()> {
        let board_row = board_to_row(board)?;
        let column_rows = columns
            .iter()
            .map(column_to_row)
            .collect::<KanbanStoreResult<Vec<_>>>()?;
        let member_row = member_to_row(owner);

        self.run_transaction(move |connection| {
            diesel::insert_into(kanban_boards::table)
                .values(&board_row)
                .execute(connection)?;
            diesel::insert_into(kanban_columns::table)
                .values(&column_rows)
                .execute(connection)?;
            diesel::insert_into(kanban_board_members::table)
                .values(&member_row)
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn find_board(&self, id: BoardId) -> KanbanStoreResult<Option<Board>> {
        self.run_blocking(move |connection| {
            let row = kanban_boards::table
                .filter(kanban_boards::id.eq(id.into_inner()))
                .select(BoardRow::as_select())
                .first::<BoardRow>(connection)
                .optional()?;
            row.map(row_to_board).transpose()
        })
        .await
    }

    async fn update_board(&self, board: &Board) -> KanbanStoreResult<()> {
        let id = board.id();
        let name = board.name().to_owned();
        let is_active = board.is_active();
        let updated_at = board.updated_at();

        self.run_blocking(move |connection| {
            let updated_count =
                diesel::update(kanban_boards::table.filter(kanban_boards::id.eq(id.into_inner())))
                    .set((
                        kanban_boards::name.eq(&name),
                        kanban_boards::is_active.eq(is_active),
                        kanban_boards::updated_at.eq(updated_at),
                    ))
                    .execute(connection)?;
            if updated_count == 0 {
                return Err(KanbanStoreError::BoardNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_boards_for_member(&self, user_id: UserId) -> KanbanStoreResult<Vec<Board>> {
        self.run_blocking(move |connection| {
            kanban_boards::table
                .inner_join(kanban_board_members::table)
                .filter(kanban_board_members::user_id.eq(user_id.into_inner()))
                .order((kanban_boards::created_at.asc(), kanban_boards::id.asc()))
                .select(BoardRow::as_select())
                .load::<BoardRow>(connection)?
                .into_iter()
                .map(row_to_board)
                .collect()
        })
        .await
    }

    async fn find_member(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> KanbanStoreResult<Option<BoardMember>> {
        self.run_blocking(move |connection| {
            find_member_row(connection, board_id, user_id)?
                .map(row_to_member)
                .transpose()
        })
        .await
    }

    async fn list_members(&self, board_id: BoardId) -> KanbanStoreResult<Vec<BoardMember>> {
        self.run_blocking(move |connection| {
            kanban_board_members::table
                .filter(kanban_board_members::board_id.eq(board_id.into_inner()))
                .order((
                    kanban_board_members::joined_at.asc(),
                    kanban_board_members::user_id.asc(),
                ))
                .select(MemberRow::as_select())
                .load::<MemberRow>(connection)?
                .into_iter()
                .map(row_to_member)
                .collect()
        })
        .await
    }

    async fn save_member(&self, member: &BoardMember) -> KanbanStoreResult<()> {
        let board_id = member.board_id();
        let user_id = member.user_id();
        let demoting = !member.is_admin();
        let row = member_to_row(member);

        self.run_transaction(move |connection| {
            lock_board(connection, board_id)?;
            let existing = find_member_row(connection, board_id, user_id)?;
            let was_admin = existing.is_some_and(|current| current.role == "admin");
            if was_admin && demoting && admin_count(connection, board_id)? <= 1 {
                return Err(KanbanStoreError::LastAdmin(board_id));
            }
            diesel::insert_into(kanban_board_members::table)
                .values(&row)
                .on_conflict((kanban_board_members::board_id, kanban_board_members::user_id))
                .do_update()
                .set(kanban_board_members::role.eq(&row.role))
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn remove_member(&self, board_id: BoardId, user_id: UserId) -> KanbanStoreResult<()> {
        self.run_transaction(move |connection| {
            lock_board(connection, board_id)?;
            let existing = find_member_row(connection, board_id, user_id)?
                .ok_or(KanbanStoreError::MemberNotFound { board_id, user_id })?;
            if existing.role == "admin" && admin_count(connection, board_id)? <= 1 {
                return Err(KanbanStoreError::LastAdmin(board_id));
            }
            diesel::delete(
                kanban_board_members::table
                    .filter(kanban_board_members::board_id.eq(board_id.into_inner()))
                    .filter(kanban_board_members::user_id.eq(user_id.into_inner())),
            )
            .execute(connection)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ColumnStore for PostgresKanbanStore {
    async fn find_column(&self, id: ColumnId) -> KanbanStoreResult<Option<Column>> {
        self.run_blocking(move |connection| match load_column(connection, id) {
            Ok(column) => Ok(Some(column)),
            Err(KanbanStoreError::ColumnNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        })
        .await
    }

    async fn list_columns(&self, board_id: BoardId) -> KanbanStoreResult<Vec<Column>> {
        self.run_blocking(move |connection| load_board_columns(connection, board_id))
            .await
    }

    async fn append_column(
        &self,
        board_id: BoardId,
        template: &ColumnTemplate,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Column> {
        let owned_template = template.clone();
        self.run_transaction(move |connection| {
            let board = lock_board(connection, board_id)?;
            ensure_active(&board)?;
            let siblings = load_board_columns(connection, board_id)?;
            if column_for_status(&siblings, &owned_template.status).is_some() {
                return Err(KanbanStoreError::DuplicateColumnStatus {
                    board_id,
                    status: owned_template.status.clone(),
                });
            }
            let column = Column::new(
                board_id,
                &owned_template,
                next_column_position(&siblings),
                now,
            )?;
            diesel::insert_into(kanban_columns::table)
                .values(&column_to_row(&column)?)
                .execute(connection)?;
            Ok(column)
        })
        .await
    }

    async fn update_column(
        &self,
        id: ColumnId,
        changes: &ColumnChanges,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Column> {
        let requested = changes.clone();
        self.run_transaction(move |connection| {
            let board_id = load_column(connection, id)?.board_id();
            let board = lock_board(connection, board_id)?;
            ensure_active(&board)?;
            let mut column = load_column(connection, id)?;
            if let Some(name) = &requested.name {
                column.rename(name, now)?;
            }
            if let Some(color) = requested.color {
                column.recolor(color, now);
            }
            if let Some(position) = requested.position {
                let siblings = load_board_columns(connection, board_id)?;
                let ordered = resequence_columns(&siblings, id, position);
                for (index, column_id) in ordered.iter().enumerate() {
                    let target = u32::try_from(index).map_err(KanbanStoreError::persistence)?;
                    let current = siblings
                        .iter()
                        .find(|sibling| sibling.id() == *column_id)
                        .map(Column::position);
                    if *column_id == id {
                        column.set_position(target, now);
                    } else if current != Some(target) {
                        write_column_position(connection, *column_id, target, now)?;
                    }
                }
            }
            diesel::update(kanban_columns::table.filter(kanban_columns::id.eq(id.into_inner())))
                .set((
                    kanban_columns::name.eq(column.name()),
                    kanban_columns::color.eq(column.color().as_str()),
                    kanban_columns::position.eq(to_db_int(column.position())?),
                    kanban_columns::updated_at.eq(column.updated_at()),
                ))
                .execute(connection)?;
            Ok(column)
        })
        .await
    }

    async fn reorder_columns(
        &self,
        board_id: BoardId,
        ordered: &[ColumnId],
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Vec<Column>> {
        let requested = ordered.to_vec();
        self.run_transaction(move |connection| {
            let board = lock_board(connection, board_id)?;
            ensure_active(&board)?;
            let siblings = load_board_columns(connection, board_id)?;
            if !is_complete_column_order(&siblings, &requested) {
                return Err(KanbanStoreError::ColumnOrderMismatch(board_id));
            }
            for (index, column_id) in requested.iter().enumerate() {
                let position = u32::try_from(index).map_err(KanbanStoreError::persistence)?;
                write_column_position(connection, *column_id, position, now)?;
            }
            load_board_columns(connection, board_id)
        })
        .await
    }

    async fn delete_column(&self, id: ColumnId) -> KanbanStoreResult<Column> {
        self.run_transaction(move |connection| {
            let column = lock_columns(connection, &[id])?
                .into_iter()
                .next()
                .ok_or(KanbanStoreError::ColumnNotFound(id))?;
            ensure_active(&load_board(connection, column.board_id())?)?;
            let task_count = kanban_tasks::table
                .filter(kanban_tasks::column_id.eq(id.into_inner()))
                .count()
                .get_result::<i64>(connection)?;
            if task_count > 0 {
                return Err(KanbanStoreError::ColumnHasTasks(id));
            }
            diesel::delete(kanban_columns::table.filter(kanban_columns::id.eq(id.into_inner())))
                .execute(connection)?;
            Ok(column)
        })
        .await
    }
}

#[async_trait]
impl TaskStore for PostgresKanbanStore {
    async fn create_task(&self, command: &NewTaskCommand) -> KanbanStoreResult<Task> {
        let request = command.clone();
        self.run_transaction(move |connection| {
            let board_id = request.board_id;
            let board = lock_board(connection, board_id)?;
            ensure_active(&board)?;
            let column_id = match request.column_id {
                Some(column_id) => column_id,
                None => load_board_columns(connection, board_id)?
                    .first()
                    .map(Column::id)
                    .ok_or(KanbanStoreError::BoardHasNoColumns(board_id))?,
            };
            let column = lock_columns(connection, &[column_id])?
                .into_iter()
                .next()
                .ok_or(KanbanStoreError::ColumnNotFound(column_id))?;
            if column.board_id() != board_id {
                return Err(KanbanStoreError::ColumnOnOtherBoard {
                    column_id,
                    board_id,
                });
            }
            let rows = lock_column_tasks(connection, &[column_id])?;
            let position = rows_to_order(column_id, &rows)?.append_position();
            // The board row is locked, so its sequence value is ours to take.
            let task = Task::new(
                &column,
                position,
                TaskCode::from_sequence(&request.code_prefix, board.next_task_number()),
                request.draft.clone(),
                request.created_by,
                request.now,
            )?;
            diesel::update(kanban_boards::table.filter(kanban_boards::id.eq(board_id.into_inner())))
                .set(kanban_boards::next_task_number.eq(kanban_boards::next_task_number + 1_i64))
                .execute(connection)?;
            diesel::insert_into(kanban_tasks::table)
                .values(&task_to_row(&task)?)
                .execute(connection)?;
            Ok(task)
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> KanbanStoreResult<Option<Task>> {
        self.run_blocking(move |connection| match load_task_row(connection, id) {
            Ok(row) => row_to_task(row).map(Some),
            Err(KanbanStoreError::TaskNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        })
        .await
    }

    async fn list_board_tasks(&self, board_id: BoardId) -> KanbanStoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            kanban_tasks::table
                .filter(kanban_tasks::board_id.eq(board_id.into_inner()))
                .order((kanban_tasks::column_id.asc(), kanban_tasks::position.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn list_column_tasks(&self, column_id: ColumnId) -> KanbanStoreResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            kanban_tasks::table
                .filter(kanban_tasks::column_id.eq(column_id.into_inner()))
                .order((kanban_tasks::position.asc(), kanban_tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn update_task(
        &self,
        id: TaskId,
        changes: &TaskChanges,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task> {
        let requested = changes.clone();
        self.run_transaction(move |connection| {
            update_locked_task(connection, id, |task| {
                Ok(task.apply_changes(requested, actor, now)?)
            })
        })
        .await
    }

    async fn set_task_locked(
        &self,
        id: TaskId,
        locked: bool,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task> {
        self.run_transaction(move |connection| {
            update_locked_task(connection, id, |task| {
                task.set_locked(locked, actor, now);
                Ok(())
            })
        })
        .await
    }

    async fn move_task(&self, command: &MoveTaskCommand) -> KanbanStoreResult<TaskTransition> {
        let request = *command;
        self.run_transaction(move |connection| {
            let observed = row_to_task(load_task_row(connection, request.task_id)?)?;
            ensure_active(&load_board(connection, observed.board_id())?)?;
            let source_id = observed.column_id();
            let target_id = request.column_id.unwrap_or(source_id);

            let columns = lock_columns(connection, &[source_id, target_id])?;
            let target = columns
                .iter()
                .find(|column| column.id() == target_id)
                .ok_or(KanbanStoreError::ColumnNotFound(target_id))?;
            if target.board_id() != observed.board_id() {
                return Err(KanbanStoreError::ColumnOnOtherBoard {
                    column_id: target_id,
                    board_id: observed.board_id(),
                });
            }

            let rows = lock_column_tasks(connection, &[source_id, target_id])?;
            let task = take_locked_task(&rows, request.task_id, source_id)?;
            task.ensure_movable()?;
            let source_order = rows_to_order(source_id, &rows)?;
            let target_order = rows_to_order(target_id, &rows)?;
            let plan = plan_move(&source_order, Some(&target_order), task.id(), request.slot)?;
            commit_plan(
                connection,
                task,
                &plan,
                target.status().clone(),
                request.actor,
                request.now,
            )
        })
        .await
    }

    async fn change_status(
        &self,
        command: &ChangeStatusCommand,
    ) -> KanbanStoreResult<TaskTransition> {
        let request = command.clone();
        self.run_transaction(move |connection| {
            let observed = row_to_task(load_task_row(connection, request.task_id)?)?;
            if observed.status() == &request.status {
                return Ok(TaskTransition {
                    before: observed.placement(),
                    task: observed,
                });
            }
            ensure_active(&load_board(connection, observed.board_id())?)?;
            let source_id = observed.column_id();
            let columns = load_board_columns(connection, observed.board_id())?;
            let bound_id = column_for_status(&columns, &request.status)
                .map(Column::id)
                .filter(|id| *id != source_id);

            let mut locked_ids = vec![source_id];
            locked_ids.extend(bound_id);
            lock_columns(connection, &locked_ids)?;
            let rows = lock_column_tasks(connection, &locked_ids)?;
            let task = take_locked_task(&rows, request.task_id, source_id)?;
            task.ensure_movable()?;

            let plan = match bound_id {
                Some(target_id) => {
                    let source_order = rows_to_order(source_id, &rows)?;
                    let target_order = rows_to_order(target_id, &rows)?;
                    plan_move(&source_order, Some(&target_order), task.id(), SlotRequest::Append)?
                }
                None => MovePlan {
                    task_id: task.id(),
                    column_id: source_id,
                    position: task.position(),
                    shifts: Vec::new(),
                },
            };
            commit_plan(
                connection,
                task,
                &plan,
                request.status.clone(),
                request.actor,
                request.now,
            )
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> KanbanStoreResult<Task> {
        self.run_transaction(move |connection| {
            let observed = row_to_task(load_task_row(connection, id)?)?;
            ensure_active(&load_board(connection, observed.board_id())?)?;
            let column_id = observed.column_id();
            lock_columns(connection, &[column_id])?;
            let rows = lock_column_tasks(connection, &[column_id])?;
            let task = take_locked_task(&rows, id, column_id)?;
            let shifts = rows_to_order(column_id, &rows)?.plan_removal(id)?;

            diesel::delete(kanban_tasks::table.filter(kanban_tasks::id.eq(id.into_inner())))
                .execute(connection)?;
            for shift in shifts {
                diesel::update(
                    kanban_tasks::table.filter(kanban_tasks::id.eq(shift.task_id.into_inner())),
                )
                .set(kanban_tasks::position.eq(to_db_int(shift.position)?))
                .execute(connection)?;
            }
            Ok(task)
        })
        .await
    }

    async fn override_effort(
        &self,
        id: TaskId,
        effort: Effort,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task> {
        self.run_transaction(move |connection| {
            update_locked_task(connection, id, |task| {
                task.override_actual(effort, actor, now);
                Ok(())
            })
        })
        .await
    }
}

#[async_trait]
impl HistoryStore for PostgresKanbanStore {
    async fn append_history(&self, entry: &TaskHistoryEntry) -> KanbanStoreResult<()> {
        let task_id = entry.task_id();
        let row = history_to_row(entry)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(kanban_task_history::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        KanbanStoreError::TaskNotFound(task_id)
                    }
                    _ => KanbanStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn list_history(
        &self,
        task_id: TaskId,
        order: HistoryOrder,
    ) -> KanbanStoreResult<Vec<TaskHistoryEntry>> {
        self.run_blocking(move |connection| {
            let query = kanban_task_history::table
                .filter(kanban_task_history::task_id.eq(task_id.into_inner()))
                .select(HistoryRow::as_select());
            let rows = match order {
                HistoryOrder::Ascending => query
                    .order((kanban_task_history::changed_at.asc(), kanban_task_history::id.asc()))
                    .load::<HistoryRow>(connection)?,
                HistoryOrder::Descending => query
                    .order((kanban_task_history::changed_at.desc(), kanban_task_history::id.desc()))
                    .load::<HistoryRow>(connection)?,
            };
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }
}

#[async_trait]
impl TimeLedgerStore for PostgresKanbanStore {
    async fn start_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<TimeLogEntry> {
        self.run_transaction(move |connection| {
            // The task row lock serializes timer changes for the task; the
            // partial unique index still backs the check below.
            let task = lock_task(connection, task_id)?;
            ensure_active(&load_board(connection, task.board_id())?)?;
            if find_active_session(connection, task_id, user_id, false)?.is_some() {
                return Err(KanbanStoreError::ActiveTimerExists { task_id, user_id });
            }
            let entry = TimeLogEntry::start(task_id, user_id, now);
            diesel::insert_into(kanban_time_logs::table)
                .values(&time_log_to_row(&entry)?)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        KanbanStoreError::ActiveTimerExists { task_id, user_id }
                    }
                    _ => KanbanStoreError::persistence(err),
                })?;
            Ok(entry)
        })
        .await
    }

    async fn stop_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<(TimeLogEntry, Task)> {
        self.run_transaction(move |connection| {
            let mut task = lock_task(connection, task_id)?;
            let row = find_active_session(connection, task_id, user_id, true)?
                .ok_or(KanbanStoreError::NoActiveTimer { task_id, user_id })?;
            let mut entry = row_to_time_log(row)?;
            let duration = entry.stop(now);
            diesel::update(
                kanban_time_logs::table.filter(kanban_time_logs::id.eq(entry.id().into_inner())),
            )
            .set((
                kanban_time_logs::ended_at.eq(entry.ended_at()),
                kanban_time_logs::duration_minutes.eq(to_db_int(duration.minutes())?),
                kanban_time_logs::is_active.eq(false),
            ))
            .execute(connection)?;
            task.add_tracked(duration, now);
            save_task(connection, &task)?;
            Ok((entry, task))
        })
        .await
    }

    async fn find_active_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> KanbanStoreResult<Option<TimeLogEntry>> {
        self.run_blocking(move |connection| {
            find_active_session(connection, task_id, user_id, false)?
                .map(row_to_time_log)
                .transpose()
        })
        .await
    }

    async fn list_sessions(&self, task_id: TaskId) -> KanbanStoreResult<Vec<TimeLogEntry>> {
        self.run_blocking(move |connection| {
            kanban_time_logs::table
                .filter(kanban_time_logs::task_id.eq(task_id.into_inner()))
                .order((kanban_time_logs::started_at.asc(), kanban_time_logs::id.asc()))
                .select(TimeLogRow::as_select())
                .load::<TimeLogRow>(connection)?
                .into_iter()
                .map(row_to_time_log)
                .collect()
        })
        .await
    }
}
