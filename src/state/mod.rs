//! State management module
//!
//! Handles watermark (cursor) tracking and sensor activation state.
//! State is persisted between evaluations so a restarted poller resumes
//! where it left off instead of re-emitting old candidates.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - Per-sensor cursor, status override and last tick
//! - `StateManager` - File-based state persistence
//!
//! The store is read-then-write with no compare-and-swap; a single process
//! owns a state file at a time.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{SensorState, State};
