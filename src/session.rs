//! Optimistic board editing.
//!
//! A [`BoardSession`] applies every change locally first, then hands it to
//! the [`BoardStore`]. If the store rejects the change the local state is
//! rolled back to the snapshot taken before the change.

use crate::{
    domain::{
        task, Board, BoardId, Direction, FilterEngine, FilterState, Positioned, ReorderCoordinator,
        Reordering, StatusColor, StatusId, Task, TaskId,
    },
    error::{BoardError, Result},
    storage::BoardStore,
};
use chrono::{DateTime, Utc};
use log::warn;

/// Snapshot of a state taken before an optimistic change
#[derive(Debug)]
pub struct Pending<T> {
    snapshot: T,
}

impl<T: Clone> Pending<T> {
    /// Applies `change` to `state` in place, keeping a snapshot to revert to.
    ///
    /// If `change` fails, `state` is restored immediately.
    pub fn apply<R>(state: &mut T, change: impl FnOnce(&mut T) -> Result<R>) -> Result<(Self, R)> {
        let snapshot = state.clone();
        match change(state) {
            Ok(result) => Ok((Self { snapshot }, result)),
            Err(err) => {
                *state = snapshot;
                Err(err)
            }
        }
    }
}

impl<T> Pending<T> {
    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }

    /// Keeps the applied change.
    ///
    /// The change already lives in the state, so dropping the snapshot is
    /// all there is to do.
    pub fn confirm(self) {}

    /// Restores the state captured before the change
    pub fn revert(self, state: &mut T) {
        *state = self.snapshot;
    }

    /// Confirms on success, reverts on failure
    pub fn settle(self, state: &mut T, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.confirm();
                Ok(())
            }
            Err(err) => {
                warn!("remote update failed, reverting local change: {}", err);
                self.revert(state);
                Err(err)
            }
        }
    }
}

/// One board and its tasks, kept in sync with a store.
///
/// Operations take `&mut self`, so changes to one session are serialized.
pub struct BoardSession<S: BoardStore> {
    store: S,
    board: Board,
    tasks: Vec<Task>,
    coordinator: ReorderCoordinator,
}

impl<S: BoardStore> BoardSession<S> {
    pub async fn open(store: S, board_id: &BoardId) -> Result<Self> {
        let board = store.load_board(board_id).await?;
        let tasks = store.load_tasks(board_id).await?;
        Ok(Self {
            store,
            board,
            tasks,
            coordinator: ReorderCoordinator::default(),
        })
    }

    pub fn with_coordinator(mut self, coordinator: ReorderCoordinator) -> Self {
        self.board = self.board.with_sequencer(*coordinator.sequencer());
        self.coordinator = coordinator;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks of one status in display order
    pub fn column(&self, status_id: StatusId) -> Vec<&Task> {
        task::column(&self.tasks, status_id)
    }

    /// Tasks matching `filters`, evaluated at `now`
    pub fn filtered(&self, filters: &FilterState, now: DateTime<Utc>) -> Vec<&Task> {
        FilterEngine::for_board(&self.board, now).apply(&self.tasks, filters)
    }

    /// Appends a status, persisting any renumbering it caused in the same
    /// store write
    pub async fn add_status(&mut self, name: &str, color: StatusColor) -> Result<StatusId> {
        let (pending, (id, renumbered)) =
            Pending::apply(&mut self.board, |board| board.add_status(name, color))?;
        let outcome = match self.board.status(&id) {
            Some(status) => self.store.create_status(status, renumbered.as_ref()).await,
            None => Err(BoardError::NotFound(id.to_string())),
        };
        pending.settle(&mut self.board, outcome)?;
        Ok(id)
    }

    pub async fn rename_status(&mut self, id: &StatusId, name: &str) -> Result<()> {
        let (pending, ()) = Pending::apply(&mut self.board, |board| board.rename_status(id, name))?;
        let outcome = self.save_status(id).await;
        pending.settle(&mut self.board, outcome)
    }

    pub async fn recolor_status(&mut self, id: &StatusId, color: StatusColor) -> Result<()> {
        let (pending, ()) =
            Pending::apply(&mut self.board, |board| board.recolor_status(id, color))?;
        let outcome = self.save_status(id).await;
        pending.settle(&mut self.board, outcome)
    }

    async fn save_status(&self, id: &StatusId) -> Result<()> {
        let status = self
            .board
            .status(id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
        self.store.save_status(status).await
    }

    /// Deletes a status after asking the store how many tasks still use it
    pub async fn delete_status(&mut self, id: &StatusId) -> Result<()> {
        let task_count = self.store.count_tasks(id).await?;
        let (pending, _) =
            Pending::apply(&mut self.board, |board| board.delete_status(id, task_count))?;
        let outcome = self.store.delete_status(&self.board.id, id).await;
        pending.settle(&mut self.board, outcome)
    }

    pub async fn move_status(
        &mut self,
        id: &StatusId,
        direction: Direction,
    ) -> Result<Reordering<StatusId>> {
        let (pending, reordering) =
            Pending::apply(&mut self.board, |board| board.move_status(id, direction))?;
        self.persist_statuses(pending, reordering).await
    }

    pub async fn reorder_statuses(&mut self, ordered_ids: &[StatusId]) -> Result<Reordering<StatusId>> {
        let (pending, reordering) =
            Pending::apply(&mut self.board, |board| board.reorder_statuses(ordered_ids))?;
        self.persist_statuses(pending, reordering).await
    }

    async fn persist_statuses(
        &mut self,
        pending: Pending<Board>,
        reordering: Reordering<StatusId>,
    ) -> Result<Reordering<StatusId>> {
        if reordering.is_noop() {
            pending.confirm();
            return Ok(reordering);
        }
        let outcome = self
            .store
            .persist_status_order(&self.board.id, &reordering)
            .await;
        pending.settle(&mut self.board, outcome)?;
        Ok(reordering)
    }

    /// Moves a task one step within its column
    pub async fn move_task(&mut self, id: &TaskId, direction: Direction) -> Result<Reordering<TaskId>> {
        let status_id = self.task_status(id)?;
        let column = self.column_snapshot(status_id);
        let reordering = self.coordinator.move_one(&column, id, direction)?;
        self.persist_column(status_id, reordering).await
    }

    /// Replaces the order of one column, e.g. after a drag within it
    pub async fn reorder_column(
        &mut self,
        status_id: StatusId,
        ordered_ids: &[TaskId],
    ) -> Result<Reordering<TaskId>> {
        let column = self.column_snapshot(status_id);
        let reordering = self.coordinator.apply_full_order(&column, ordered_ids)?;
        self.persist_column(status_id, reordering).await
    }

    /// Drops a task into `status_id` at `index`, moving it across columns
    /// if needed
    pub async fn drop_task(
        &mut self,
        id: &TaskId,
        status_id: StatusId,
        index: usize,
    ) -> Result<Reordering<TaskId>> {
        let source = self.task_status(id)?;
        if self.board.status(&status_id).is_none() {
            return Err(BoardError::NotFound(status_id.to_string()));
        }
        if source == status_id {
            let column = self.column_snapshot(status_id);
            let reordering = self.coordinator.place_at(&column, id, index)?;
            return self.persist_column(status_id, reordering).await;
        }

        let target = self.column_snapshot(status_id);
        let reordering = self.coordinator.place_at(&target, id, index)?;

        let (pending, ()) = Pending::apply(&mut self.tasks, |tasks| {
            reordering.write_keys(tasks);
            let task = tasks
                .iter_mut()
                .find(|t| &t.id == id)
                .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
            task.status_id = status_id;
            Ok(())
        })?;

        let outcome = match self.tasks.iter().find(|t| &t.id == id) {
            Some(task) => self.store.relocate_task(task, &reordering).await,
            None => Err(BoardError::NotFound(id.to_string())),
        };
        pending.settle(&mut self.tasks, outcome)?;
        Ok(reordering)
    }

    async fn persist_column(
        &mut self,
        status_id: StatusId,
        reordering: Reordering<TaskId>,
    ) -> Result<Reordering<TaskId>> {
        if reordering.is_noop() {
            return Ok(reordering);
        }
        let (pending, ()) = Pending::apply(&mut self.tasks, |tasks| {
            reordering.write_keys(tasks);
            Ok(())
        })?;
        let outcome = self.store.persist_task_order(&status_id, &reordering).await;
        pending.settle(&mut self.tasks, outcome)?;
        Ok(reordering)
    }

    fn task_status(&self, id: &TaskId) -> Result<StatusId> {
        self.tasks
            .iter()
            .find(|t| t.position_id() == id)
            .map(|t| t.status_id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    fn column_snapshot(&self, status_id: StatusId) -> Vec<Task> {
        self.column(status_id).into_iter().cloned().collect()
    }
}
