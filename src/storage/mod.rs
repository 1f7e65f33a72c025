use crate::{
    domain::{Board, BoardId, BoardStatus, Reordering, StatusId, Task, TaskId},
    error::Result,
};
use async_trait::async_trait;

pub mod memory;

pub use memory::MemoryStore;

/// Data-access boundary for boards and their tasks.
///
/// The core computes position and attribute changes; implementations decide
/// how to persist them. Reorder calls carry the complete final id order.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Loads a board with its statuses sorted by position
    async fn load_board(&self, id: &BoardId) -> Result<Board>;

    /// Loads every task of a board
    async fn load_tasks(&self, board_id: &BoardId) -> Result<Vec<Task>>;

    /// Creates or updates a status
    async fn save_status(&self, status: &BoardStatus) -> Result<()>;

    /// Creates a status, together with the renumbering of the existing
    /// statuses that made room for it. Applied as one write.
    async fn create_status(
        &self,
        status: &BoardStatus,
        renumbered: Option<&Reordering<StatusId>>,
    ) -> Result<()>;

    /// Deletes a status
    async fn delete_status(&self, board_id: &BoardId, id: &StatusId) -> Result<()>;

    /// Number of tasks currently referencing a status
    async fn count_tasks(&self, status_id: &StatusId) -> Result<usize>;

    /// Persists a new status order for a board
    async fn persist_status_order(
        &self,
        board_id: &BoardId,
        reordering: &Reordering<StatusId>,
    ) -> Result<()>;

    /// Creates or updates a task
    async fn save_task(&self, task: &Task) -> Result<()>;

    /// Persists a new task order within one status column
    async fn persist_task_order(
        &self,
        status_id: &StatusId,
        reordering: &Reordering<TaskId>,
    ) -> Result<()>;

    /// Moves `task` into the column named by its `status_id` and persists
    /// that column's new order. Applied as one write.
    async fn relocate_task(&self, task: &Task, reordering: &Reordering<TaskId>) -> Result<()>;
}
