//! Diesel schema for Kanban persistence.

diesel::table! {
    /// Kanban boards.
    kanban_boards (id) {
        /// Board identifier.
        id -> Uuid,
        /// Board name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional project association.
        project_id -> Nullable<Uuid>,
        /// Soft-deactivation flag.
        is_active -> Bool,
        /// Creating user.
        created_by -> Uuid,
        /// Next task code sequence value.
        next_task_number -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Board memberships.
    kanban_board_members (board_id, user_id) {
        /// Board identifier.
        board_id -> Uuid,
        /// Member user.
        user_id -> Uuid,
        /// Member role.
        #[max_length = 20]
        role -> Varchar,
        /// Enrollment timestamp.
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Board columns.
    kanban_columns (id) {
        /// Column identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Display name.
        #[max_length = 100]
        name -> Varchar,
        /// Bound logical status.
        #[max_length = 50]
        status -> Varchar,
        /// Position within the board.
        position -> Int4,
        /// Display color.
        #[max_length = 7]
        color -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Board tasks.
    kanban_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// Owning column.
        column_id -> Uuid,
        /// Generated code.
        #[max_length = 50]
        code -> Varchar,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Description.
        description -> Nullable<Text>,
        /// Logical status.
        #[max_length = 50]
        status -> Varchar,
        /// Priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Position within the column.
        position -> Int4,
        /// Assignee.
        assignee_id -> Nullable<Uuid>,
        /// Due date.
        due_date -> Nullable<Date>,
        /// Effort estimate in minutes.
        estimated_minutes -> Nullable<Int4>,
        /// Tracked effort in minutes.
        actual_minutes -> Int4,
        /// Reopen counter.
        reopened_count -> Int4,
        /// Move lock.
        is_locked -> Bool,
        /// Creating user.
        created_by -> Uuid,
        /// Last updating user.
        updated_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only task transition history.
    kanban_task_history (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Task.
        task_id -> Uuid,
        /// Transition origin.
        #[max_length = 20]
        source -> Varchar,
        /// Status before.
        #[max_length = 50]
        old_status -> Nullable<Varchar>,
        /// Status after.
        #[max_length = 50]
        new_status -> Varchar,
        /// Column before.
        old_column_id -> Nullable<Uuid>,
        /// Column after.
        new_column_id -> Uuid,
        /// Position before.
        old_position -> Nullable<Int4>,
        /// Position after.
        new_position -> Int4,
        /// Acting user.
        changed_by -> Uuid,
        /// Transition timestamp.
        changed_at -> Timestamptz,
    }
}

diesel::table! {
    /// Timer sessions.
    kanban_time_logs (id) {
        /// Session identifier.
        id -> Uuid,
        /// Timed task.
        task_id -> Uuid,
        /// Timing user.
        user_id -> Uuid,
        /// Start timestamp.
        started_at -> Timestamptz,
        /// Stop timestamp.
        ended_at -> Nullable<Timestamptz>,
        /// Rounded duration.
        duration_minutes -> Nullable<Int4>,
        /// Active flag.
        is_active -> Bool,
    }
}

diesel::joinable!(kanban_board_members -> kanban_boards (board_id));
diesel::joinable!(kanban_columns -> kanban_boards (board_id));
diesel::joinable!(kanban_tasks -> kanban_columns (column_id));
diesel::joinable!(kanban_task_history -> kanban_tasks (task_id));
diesel::joinable!(kanban_time_logs -> kanban_tasks (task_id));

diesel::allow_tables_to_appear_in_same_query!(
    kanban_boards,
    kanban_board_members,
    kanban_columns,
    kanban_tasks,
    kanban_task_history,
    kanban_time_logs,
);
