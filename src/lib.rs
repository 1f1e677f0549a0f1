//! Kanban board engine for an internal operations platform.
//!
//! This crate keeps multi-column task boards consistent: task positions
//! stay densely ranked inside every column, a task's column always matches
//! its logical status, every placement change is recorded, and a
//! per-user time ledger accumulates tracked effort.
//!
//! # Architecture
//!
//! The engine follows hexagonal architecture principles:
//!
//! - **Domain**: Pure board, column, task, and ledger rules
//! - **Ports**: Store, access policy, and notifier traits
//! - **Adapters**: In-memory and `PostgreSQL` stores, a role-table policy,
//!   and notifier sinks
//! - **Services**: Access-checked operations that record history and
//!   publish events
//!
//! # Modules
//!
//! - [`kanban`]: Boards, columns, tasks, history, and the time ledger

pub mod kanban;
