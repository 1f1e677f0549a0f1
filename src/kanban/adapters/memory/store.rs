//! Thread-safe in-memory implementation of every Kanban store port.
//!
//! A single `RwLock` guards the whole state, so each mutating call runs its
//! read-shift-write sequence under one write guard and is atomic with
//! respect to every other call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::kanban::{
    domain::{
        Board, BoardId, BoardMember, Column, ColumnChanges, ColumnId, ColumnOrder, ColumnTemplate,
        Effort, HistoryOrder, MovePlan, PersistedBoardData, SlotRequest, Task, TaskChanges,
        TaskCode, TaskHistoryEntry, TaskId, TaskPlacement, TaskStatus, TaskTransition,
        TimeLogEntry, UserId,
        column_for_status, is_complete_column_order, next_column_position, plan_move,
        resequence_columns,
    },
    ports::{
        BoardStore, ChangeStatusCommand, ColumnStore, HistoryStore, KanbanStoreError,
        KanbanStoreResult, MoveTaskCommand, NewTaskCommand, TaskStore, TimeLedgerStore,
    },
};

/// In-memory store for boards, columns, tasks, history, and timers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKanbanStore {
    state: Arc<RwLock<InMemoryKanbanState>>,
}

#[derive(Debug, Default)]
struct InMemoryKanbanState {
    boards: HashMap<BoardId, Board>,
    members: HashMap<(BoardId, UserId), BoardMember>,
    columns: HashMap<ColumnId, Column>,
    tasks: HashMap<TaskId, Task>,
    history: Vec<TaskHistoryEntry>,
    sessions: Vec<TimeLogEntry>,
}

impl InMemoryKanbanStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> KanbanStoreResult<RwLockReadGuard<'_, InMemoryKanbanState>> {
        self.state.read().map_err(|err| {
            KanbanStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> KanbanStoreResult<RwLockWriteGuard<'_, InMemoryKanbanState>> {
        self.state.write().map_err(|err| {
            KanbanStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryKanbanState {
    fn board(&self, id: BoardId) -> KanbanStoreResult<&Board> {
        self.boards.get(&id).ok_or(KanbanStoreError::BoardNotFound(id))
    }

    fn active_board(&self, id: BoardId) -> KanbanStoreResult<&Board> {
        let board = self.board(id)?;
        if !board.is_active() {
            return Err(KanbanStoreError::BoardInactive(id));
        }
        Ok(board)
    }

    fn column(&self, id: ColumnId) -> KanbanStoreResult<&Column> {
        self.columns.get(&id).ok_or(KanbanStoreError::ColumnNotFound(id))
    }

    fn task(&self, id: TaskId) -> KanbanStoreResult<&Task> {
        self.tasks.get(&id).ok_or(KanbanStoreError::TaskNotFound(id))
    }

    fn task_mut(&mut self, id: TaskId) -> KanbanStoreResult<&mut Task> {
        self.tasks.get_mut(&id).ok_or(KanbanStoreError::TaskNotFound(id))
    }

    fn board_columns(&self, board_id: BoardId) -> Vec<Column> {
        let mut columns: Vec<Column> = self
            .columns
            .values()
            .filter(|column| column.board_id() == board_id)
            .cloned()
            .collect();
        columns.sort_by_key(|column| (column.position(), column.id()));
        columns
    }

    fn column_order(&self, column_id: ColumnId) -> ColumnOrder {
        ColumnOrder::from_positions(
            column_id,
            self.tasks
                .values()
                .filter(|task| task.column_id() == column_id)
                .map(|task| (task.id(), task.position())),
        )
    }

    fn admin_count(&self, board_id: BoardId) -> usize {
        self.members
            .values()
            .filter(|member| member.board_id() == board_id && member.is_admin())
            .count()
    }

    /// Applies a move plan and places the moving task.
    fn commit_move(
        &mut self,
        plan: &MovePlan,
        placement_status: TaskStatus,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<TaskTransition> {
        for shift in &plan.shifts {
            self.task_mut(shift.task_id)?.shift_to(shift.position);
        }
        let task = self.task_mut(plan.task_id)?;
        let before = task.placement();
        task.place(
            TaskPlacement {
                column_id: plan.column_id,
                position: plan.position,
                status: placement_status,
            },
            actor,
            now,
        );
        Ok(TaskTransition {
            before,
            task: task.clone(),
        })
    }
}

#[async_trait]
impl BoardStore for InMemoryKanbanStore {
    async fn create_board(
        &self,
        board: &Board,
        columns: &[Column],
        owner: &BoardMember,
    ) -> KanbanStoreResult<()> {
        let mut state = self.write()?;
        state.boards.insert(board.id(), board.clone());
        for column in columns {
            state.columns.insert(column.id(), column.clone());
        }
        state
            .members
            .insert((owner.board_id(), owner.user_id()), owner.clone());
        Ok(())
    }

    async fn find_board(&self, id: BoardId) -> KanbanStoreResult<Option<Board>> {
        Ok(self.read()?.boards.get(&id).cloned())
    }

    async fn update_board(&self, board: &Board) -> KanbanStoreResult<()> {
        let mut state = self.write()?;
        let stored = state
            .boards
            .get_mut(&board.id())
            .ok_or(KanbanStoreError::BoardNotFound(board.id()))?;
        // The task sequence is owned by the store; keep the stored counter.
        *stored = Board::from_persisted(PersistedBoardData {
            id: board.id(),
            name: board.name().to_owned(),
            project_id: board.project_id(),
            active: board.is_active(),
            created_by: board.created_by(),
            next_task_number: stored.next_task_number(),
            created_at: board.created_at(),
            updated_at: board.updated_at(),
        });
        Ok(())
    }

    async fn list_boards_for_member(&self, user_id: UserId) -> KanbanStoreResult<Vec<Board>> {
        let state = self.read()?;
        let mut boards: Vec<Board> = state
            .members
            .values()
            .filter(|member| member.user_id() == user_id)
            .filter_map(|member| state.boards.get(&member.board_id()).cloned())
            .collect();
        boards.sort_by_key(|board| (board.created_at(), board.id()));
        Ok(boards)
    }

    async fn find_member(
        &self,
        board_id: BoardId,
        user_id: UserId,
    ) -> KanbanStoreResult<Option<BoardMember>> {
        Ok(self.read()?.members.get(&(board_id, user_id)).cloned())
    }

    async fn list_members(&self, board_id: BoardId) -> KanbanStoreResult<Vec<BoardMember>> {
        let state = self.read()?;
        let mut members: Vec<BoardMember> = state
            .members
            .values()
            .filter(|member| member.board_id() == board_id)
            .cloned()
            .collect();
        members.sort_by_key(|member| (member.joined_at(), member.user_id()));
        Ok(members)
    }

    async fn save_member(&self, member: &BoardMember) -> KanbanStoreResult<()> {
        let mut state = self.write()?;
        state.board(member.board_id())?;
        let key = (member.board_id(), member.user_id());
        let demotes_last_admin = state
            .members
            .get(&key)
            .is_some_and(|existing| existing.is_admin() && !member.is_admin())
            && state.admin_count(member.board_id()) <= 1;
        if demotes_last_admin {
            return Err(KanbanStoreError::LastAdmin(member.board_id()));
        }
        state.members.insert(key, member.clone());
        Ok(())
    }

    async fn remove_member(&self, board_id: BoardId, user_id: UserId) -> KanbanStoreResult<()> {
        let mut state = self.write()?;
        let existing = state
            .members
            .get(&(board_id, user_id))
            .ok_or(KanbanStoreError::MemberNotFound { board_id, user_id })?;
        if existing.is_admin() && state.admin_count(board_id) <= 1 {
            return Err(KanbanStoreError::LastAdmin(board_id));
        }
        state.members.remove(&(board_id, user_id));
        Ok(())
    }
}

#[async_trait]
impl ColumnStore for InMemoryKanbanStore {
    async fn find_column(&self, id: ColumnId) -> KanbanStoreResult<Option<Column>> {
        Ok(self.read()?.columns.get(&id).cloned())
    }

    async fn list_columns(&self, board_id: BoardId) -> KanbanStoreResult<Vec<Column>> {
        Ok(self.read()?.board_columns(board_id))
    }

    async fn append_column(
        &self,
        board_id: BoardId,
        template: &ColumnTemplate,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Column> {
        let mut state = self.write()?;
        state.active_board(board_id)?;
        let siblings = state.board_columns(board_id);
        if column_for_status(&siblings, &template.status).is_some() {
            return Err(KanbanStoreError::DuplicateColumnStatus {
                board_id,
                status: template.status.clone(),
            });
        }
        let column = Column::new(board_id, template, next_column_position(&siblings), now)?;
        state.columns.insert(column.id(), column.clone());
        Ok(column)
    }

    async fn update_column(
        &self,
        id: ColumnId,
        changes: &ColumnChanges,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Column> {
        let mut state = self.write()?;
        let mut column = state.column(id)?.clone();
        state.active_board(column.board_id())?;
        if let Some(name) = &changes.name {
            column.rename(name, now)?;
        }
        if let Some(color) = &changes.color {
            column.recolor(color.clone(), now);
        }
        if let Some(position) = changes.position {
            let siblings = state.board_columns(column.board_id());
            let ordered = resequence_columns(&siblings, id, position);
            for (index, column_id) in ordered.iter().enumerate() {
                let target = u32::try_from(index).unwrap_or(u32::MAX);
                if *column_id == id {
                    column.set_position(target, now);
                } else if let Some(sibling) = state
                    .columns
                    .get_mut(column_id)
                    .filter(|sibling| sibling.position() != target)
                {
                    sibling.set_position(target, now);
                }
            }
        }
        state.columns.insert(id, column.clone());
        Ok(column)
    }

    async fn reorder_columns(
        &self,
        board_id: BoardId,
        ordered: &[ColumnId],
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Vec<Column>> {
        let mut state = self.write()?;
        state.active_board(board_id)?;
        let siblings = state.board_columns(board_id);
        if !is_complete_column_order(&siblings, ordered) {
            return Err(KanbanStoreError::ColumnOrderMismatch(board_id));
        }
        for (index, column_id) in ordered.iter().enumerate() {
            if let Some(column) = state.columns.get_mut(column_id) {
                column.set_position(u32::try_from(index).unwrap_or(u32::MAX), now);
            }
        }
        Ok(state.board_columns(board_id))
    }

    async fn delete_column(&self, id: ColumnId) -> KanbanStoreResult<Column> {
        let mut state = self.write()?;
        let column = state.column(id)?.clone();
        state.active_board(column.board_id())?;
        if state.tasks.values().any(|task| task.column_id() == id) {
            return Err(KanbanStoreError::ColumnHasTasks(id));
        }
        state.columns.remove(&id);
        Ok(column)
    }
}

#[async_trait]
impl TaskStore for InMemoryKanbanStore {
    async fn create_task(&self, command: &NewTaskCommand) -> KanbanStoreResult<Task> {
        let mut state = self.write()?;
        state.active_board(command.board_id)?;
        let column = match command.column_id {
            Some(column_id) => {
                let column = state.column(column_id)?;
                if column.board_id() != command.board_id {
                    return Err(KanbanStoreError::ColumnOnOtherBoard {
                        column_id,
                        board_id: command.board_id,
                    });
                }
                column.clone()
            }
            None => state
                .board_columns(command.board_id)
                .into_iter()
                .next()
                .ok_or(KanbanStoreError::BoardHasNoColumns(command.board_id))?,
        };
        let position = state.column_order(column.id()).append_position();
        let board = state
            .boards
            .get_mut(&command.board_id)
            .ok_or(KanbanStoreError::BoardNotFound(command.board_id))?;
        // The sequence only advances once the draft has validated.
        let task = Task::new(
            &column,
            position,
            TaskCode::from_sequence(&command.code_prefix, board.next_task_number()),
            command.draft.clone(),
            command.created_by,
            command.now,
        )?;
        board.allocate_task_number();
        state.tasks.insert(task.id(), task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: TaskId) -> KanbanStoreResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn list_board_tasks(&self, board_id: BoardId) -> KanbanStoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.board_id() == board_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.column_id(), task.position()));
        Ok(tasks)
    }

    async fn list_column_tasks(&self, column_id: ColumnId) -> KanbanStoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.column_id() == column_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.position(), task.id()));
        Ok(tasks)
    }

    async fn update_task(
        &self,
        id: TaskId,
        changes: &TaskChanges,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task> {
        let mut state = self.write()?;
        let mut task = state.task(id)?.clone();
        state.active_board(task.board_id())?;
        task.apply_changes(changes.clone(), actor, now)?;
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn set_task_locked(
        &self,
        id: TaskId,
        locked: bool,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task> {
        let mut state = self.write()?;
        let board_id = state.task(id)?.board_id();
        state.active_board(board_id)?;
        let task = state.task_mut(id)?;
        task.set_locked(locked, actor, now);
        Ok(task.clone())
    }

    async fn move_task(&self, command: &MoveTaskCommand) -> KanbanStoreResult<TaskTransition> {
        let mut state = self.write()?;
        let task = state.task(command.task_id)?.clone();
        state.active_board(task.board_id())?;
        task.ensure_movable()?;
        let target = state
            .column(command.column_id.unwrap_or_else(|| task.column_id()))?
            .clone();
        if target.board_id() != task.board_id() {
            return Err(KanbanStoreError::ColumnOnOtherBoard {
                column_id: target.id(),
                board_id: task.board_id(),
            });
        }
        let source_order = state.column_order(task.column_id());
        let target_order = state.column_order(target.id());
        let plan = plan_move(&source_order, Some(&target_order), task.id(), command.slot)?;
        state.commit_move(&plan, target.status().clone(), command.actor, command.now)
    }

    async fn change_status(
        &self,
        command: &ChangeStatusCommand,
    ) -> KanbanStoreResult<TaskTransition> {
        let mut state = self.write()?;
        let task = state.task(command.task_id)?.clone();
        if task.status() == &command.status {
            return Ok(TaskTransition {
                before: task.placement(),
                task,
            });
        }
        state.active_board(task.board_id())?;
        task.ensure_movable()?;
        let columns = state.board_columns(task.board_id());
        let bound = column_for_status(&columns, &command.status)
            .filter(|column| column.id() != task.column_id())
            .map(Column::id);
        let plan = match bound {
            Some(column_id) => {
                let source_order = state.column_order(task.column_id());
                let target_order = state.column_order(column_id);
                plan_move(&source_order, Some(&target_order), task.id(), SlotRequest::Append)?
            }
            None => MovePlan {
                task_id: task.id(),
                column_id: task.column_id(),
                position: task.position(),
                shifts: Vec::new(),
            },
        };
        state.commit_move(&plan, command.status.clone(), command.actor, command.now)
    }

    async fn delete_task(&self, id: TaskId) -> KanbanStoreResult<Task> {
        let mut state = self.write()?;
        let task = state.task(id)?.clone();
        state.active_board(task.board_id())?;
        let shifts = state.column_order(task.column_id()).plan_removal(id)?;
        for shift in shifts {
            state.task_mut(shift.task_id)?.shift_to(shift.position);
        }
        state.tasks.remove(&id);
        state.history.retain(|entry| entry.task_id() != id);
        state.sessions.retain(|session| session.task_id() != id);
        Ok(task)
    }

    async fn override_effort(
        &self,
        id: TaskId,
        effort: Effort,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<Task> {
        let mut state = self.write()?;
        let board_id = state.task(id)?.board_id();
        state.active_board(board_id)?;
        let task = state.task_mut(id)?;
        task.override_actual(effort, actor, now);
        Ok(task.clone())
    }
}

#[async_trait]
impl HistoryStore for InMemoryKanbanStore {
    async fn append_history(&self, entry: &TaskHistoryEntry) -> KanbanStoreResult<()> {
        let mut state = self.write()?;
        state.task(entry.task_id())?;
        state.history.push(entry.clone());
        Ok(())
    }

    async fn list_history(
        &self,
        task_id: TaskId,
        order: HistoryOrder,
    ) -> KanbanStoreResult<Vec<TaskHistoryEntry>> {
        let state = self.read()?;
        // Entries are pushed in commit order; a stable sort keeps ties in it.
        let mut entries: Vec<TaskHistoryEntry> = state
            .history
            .iter()
            .filter(|entry| entry.task_id() == task_id)
            .cloned()
            .collect();
        entries.sort_by_key(TaskHistoryEntry::changed_at);
        if order == HistoryOrder::Descending {
            entries.reverse();
        }
        Ok(entries)
    }
}

#[async_trait]
impl TimeLedgerStore for InMemoryKanbanStore {
    async fn start_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<TimeLogEntry> {
        let mut state = self.write()?;
        let board_id = state.task(task_id)?.board_id();
        state.active_board(board_id)?;
        let has_active = state.sessions.iter().any(|session| {
            session.task_id() == task_id && session.user_id() == user_id && session.is_active()
        });
        if has_active {
            return Err(KanbanStoreError::ActiveTimerExists { task_id, user_id });
        }
        let entry = TimeLogEntry::start(task_id, user_id, now);
        state.sessions.push(entry.clone());
        Ok(entry)
    }

    async fn stop_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> KanbanStoreResult<(TimeLogEntry, Task)> {
        let mut state = self.write()?;
        state.task(task_id)?;
        let session = state
            .sessions
            .iter_mut()
            .find(|session| {
                session.task_id() == task_id && session.user_id() == user_id && session.is_active()
            })
            .ok_or(KanbanStoreError::NoActiveTimer { task_id, user_id })?;
        let duration = session.stop(now);
        let closed = session.clone();
        let task = state.task_mut(task_id)?;
        task.add_tracked(duration, now);
        Ok((closed, task.clone()))
    }

    async fn find_active_timer(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> KanbanStoreResult<Option<TimeLogEntry>> {
        let state = self.read()?;
        Ok(state
            .sessions
            .iter()
            .find(|session| {
                session.task_id() == task_id && session.user_id() == user_id && session.is_active()
            })
            .cloned())
    }

    async fn list_sessions(&self, task_id: TaskId) -> KanbanStoreResult<Vec<TimeLogEntry>> {
        let state = self.read()?;
        let mut sessions: Vec<TimeLogEntry> = state
            .sessions
            .iter()
            .filter(|session| session.task_id() == task_id)
            .cloned()
            .collect();
        sessions.sort_by_key(TimeLogEntry::started_at);
        Ok(sessions)
    }
}
