//! Diesel row models for Kanban persistence.

use super::schema::{
    kanban_board_members, kanban_boards, kanban_columns, kanban_task_history, kanban_tasks,
    kanban_time_logs,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Board record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = kanban_boards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BoardRow {
    pub id: Uuid,
    pub name: String,
    pub project_id: Option<Uuid>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub next_task_number: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = kanban_board_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MemberRow {
    pub board_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

/// Column record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = kanban_columns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ColumnRow {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub status: String,
    pub position: i32,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = kanban_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: Uuid,
    pub board_id: Uuid,
    pub column_id: Uuid,
    pub code: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub position: i32,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: i32,
    pub reopened_count: i32,
    pub is_locked: bool,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable task columns written back after a locked read.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = kanban_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub position: i32,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: i32,
    pub reopened_count: i32,
    pub is_locked: bool,
    pub updated_by: Uuid,
    pub updated_at: DateTime<Utc>,
}

/// History record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = kanban_task_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub source: String,
    pub old_status: Option<String>,
    pub new_status: String,
    pub old_column_id: Option<Uuid>,
    pub new_column_id: Uuid,
    pub old_position: Option<i32>,
    pub new_position: i32,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
}

/// Timer session record.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = kanban_time_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TimeLogRow {
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
}
