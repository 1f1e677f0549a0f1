//! Unit tests for the Kanban services, adapters, and placement properties.

mod board_tests;
mod status_tests;
