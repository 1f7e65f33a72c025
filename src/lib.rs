//! # Taskboard Core
//!
//! Ordering and filtering engine for Kanban task boards.
//!
//! This crate keeps status columns and the tasks inside them in a stable
//! order using fractional position keys, enforces the invariants on a
//! board's statuses, and evaluates composite task filters. It performs no
//! I/O of its own; persistence sits behind the [`BoardStore`] trait.

pub mod config;
pub mod domain;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::OrderingConfig;
pub use domain::{
    board::{Board, BoardStatus, StatusColor},
    filter::{AssigneeFilter, FilterEngine, FilterState},
    ids::{BoardId, LabelId, StatusId, TaskId, UserId},
    lifecycle::StatusLifecycleGuard,
    position::{PositionSequencer, Positioned},
    reorder::{Direction, PositionUpdate, ReorderCoordinator, Reordering},
    task::{Priority, Task},
};
pub use error::{BoardError, Result};
pub use session::{BoardSession, Pending};
pub use storage::{BoardStore, MemoryStore};
