//! `PostgreSQL` adapters for Kanban persistence.

mod conversion;
mod models;
mod schema;
mod store;

pub use store::{KanbanPgPool, PostgresKanbanStore};
