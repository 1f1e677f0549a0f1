//! Adapter implementations for Kanban ports.

pub mod memory;
pub mod notify;
pub mod policy;
pub mod postgres;
