//! In-memory integration tests for the Kanban engine.
//!
//! Tests are organized into modules by functionality:
//! - `workflow_tests`: Board setup, task flow across columns, history
//! - `configuration_tests`: Configured column templates and task codes
//! - `ledger_tests`: Timers on active and deactivated boards

mod in_memory {
    pub mod helpers;

    mod configuration_tests;
    mod ledger_tests;
    mod workflow_tests;
}
