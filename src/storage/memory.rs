use crate::{
    domain::{Board, BoardId, BoardStatus, Reordering, StatusId, Task, TaskId},
    error::{BoardError, Result},
    storage::BoardStore,
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    boards: HashMap<BoardId, Board>,
    tasks: HashMap<TaskId, Task>,
    status_orders: HashMap<BoardId, Vec<StatusId>>,
    task_orders: HashMap<StatusId, Vec<TaskId>>,
}

/// In-process [`BoardStore`].
///
/// A single upcoming write can be made to fail with
/// [`fail_write`](Self::fail_write) to exercise rollback paths. Every write
/// takes the lock once, so a failed write leaves the state untouched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    /// Writes left until the injected failure; 0 when none is armed
    fail_in: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_board(&self, board: Board) {
        self.state.write().await.boards.insert(board.id, board);
    }

    pub async fn insert_task(&self, task: Task) {
        self.state.write().await.tasks.insert(task.id, task);
    }

    /// Makes the next write operation return a storage error
    pub fn fail_next_write(&self) {
        self.fail_write(1);
    }

    /// Makes the `nth` write from now return a storage error, counting the
    /// next write as 1. Passing 0 disarms a pending failure.
    pub fn fail_write(&self, nth: usize) {
        self.fail_in.store(nth, Ordering::SeqCst);
    }

    /// The last status order persisted for a board
    pub async fn status_order(&self, board_id: &BoardId) -> Option<Vec<StatusId>> {
        self.state.read().await.status_orders.get(board_id).cloned()
    }

    /// The last task order persisted for a status column
    pub async fn task_order(&self, status_id: &StatusId) -> Option<Vec<TaskId>> {
        self.state.read().await.task_orders.get(status_id).cloned()
    }

    pub async fn task(&self, id: &TaskId) -> Option<Task> {
        self.state.read().await.tasks.get(id).cloned()
    }

    fn check_write(&self) -> Result<()> {
        let countdown = self
            .fail_in
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if countdown == Ok(1) {
            return Err(BoardError::StorageError("write rejected".to_string()));
        }
        Ok(())
    }
}

fn board_mut<'a>(state: &'a mut MemoryState, id: &BoardId) -> Result<&'a mut Board> {
    state
        .boards
        .get_mut(id)
        .ok_or_else(|| BoardError::NotFound(id.to_string()))
}

/// Rebuilds `board` with `status` inserted or replaced, after writing the
/// keys of `renumbered` into the existing statuses
fn upsert_status(
    board: &mut Board,
    status: &BoardStatus,
    renumbered: Option<&Reordering<StatusId>>,
) -> Result<()> {
    let mut statuses: Vec<BoardStatus> = board
        .statuses()
        .iter()
        .filter(|s| s.id != status.id)
        .cloned()
        .collect();
    if let Some(reordering) = renumbered {
        reordering.write_keys(&mut statuses);
    }
    statuses.push(status.clone());

    *board = Board::from_statuses(board.id, board.name.clone(), statuses)?;
    Ok(())
}

/// Writes new task keys, failing before any change if an id is unknown
fn write_task_keys(tasks: &mut HashMap<TaskId, Task>, reordering: &Reordering<TaskId>) -> Result<()> {
    if let Some(missing) = reordering.updates.iter().find(|u| !tasks.contains_key(&u.id)) {
        return Err(BoardError::NotFound(missing.id.to_string()));
    }
    for update in &reordering.updates {
        if let Some(task) = tasks.get_mut(&update.id) {
            task.order_index = update.order_index;
        }
    }
    Ok(())
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        self.state
            .read()
            .await
            .boards
            .get(id)
            .cloned()
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    async fn load_tasks(&self, board_id: &BoardId) -> Result<Vec<Task>> {
        let state = self.state.read().await;
        let board = state
            .boards
            .get(board_id)
            .ok_or_else(|| BoardError::NotFound(board_id.to_string()))?;

        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| board.status(&t.status_id).is_some())
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.order_index.total_cmp(&b.order_index));
        Ok(tasks)
    }

    async fn save_status(&self, status: &BoardStatus) -> Result<()> {
        self.check_write()?;
        let mut state = self.state.write().await;
        upsert_status(board_mut(&mut state, &status.board_id)?, status, None)
    }

    async fn create_status(
        &self,
        status: &BoardStatus,
        renumbered: Option<&Reordering<StatusId>>,
    ) -> Result<()> {
        self.check_write()?;
        let mut state = self.state.write().await;
        upsert_status(board_mut(&mut state, &status.board_id)?, status, renumbered)?;
        if let Some(reordering) = renumbered {
            state
                .status_orders
                .insert(status.board_id, reordering.order.clone());
        }
        Ok(())
    }

    async fn delete_status(&self, board_id: &BoardId, id: &StatusId) -> Result<()> {
        self.check_write()?;
        let mut state = self.state.write().await;
        let task_count = state.tasks.values().filter(|t| &t.status_id == id).count();
        board_mut(&mut state, board_id)?.delete_status(id, task_count)?;
        Ok(())
    }

    async fn count_tasks(&self, status_id: &StatusId) -> Result<usize> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .values()
            .filter(|t| &t.status_id == status_id)
            .count())
    }

    async fn persist_status_order(
        &self,
        board_id: &BoardId,
        reordering: &Reordering<StatusId>,
    ) -> Result<()> {
        self.check_write()?;
        let mut state = self.state.write().await;
        board_mut(&mut state, board_id)?.apply_reordering(reordering);
        state
            .status_orders
            .insert(*board_id, reordering.order.clone());
        Ok(())
    }

    async fn save_task(&self, task: &Task) -> Result<()> {
        self.check_write()?;
        self.state.write().await.tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn persist_task_order(
        &self,
        status_id: &StatusId,
        reordering: &Reordering<TaskId>,
    ) -> Result<()> {
        self.check_write()?;
        let mut state = self.state.write().await;
        write_task_keys(&mut state.tasks, reordering)?;
        state
            .task_orders
            .insert(*status_id, reordering.order.clone());
        Ok(())
    }

    async fn relocate_task(&self, task: &Task, reordering: &Reordering<TaskId>) -> Result<()> {
        self.check_write()?;
        let mut state = self.state.write().await;
        let mut tasks = state.tasks.clone();
        tasks.insert(task.id, task.clone());
        write_task_keys(&mut tasks, reordering)?;

        state.tasks = tasks;
        state
            .task_orders
            .insert(task.status_id, reordering.order.clone());
        Ok(())
    }
}
