//! Kanban board engine.
//!
//! Boards own an ordered sequence of status-bound columns; columns hold
//! densely ranked tasks. Moves, status changes, and timer bookkeeping each
//! commit atomically through the store ports, and every placement change
//! lands in the task's history. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Engine configuration in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
