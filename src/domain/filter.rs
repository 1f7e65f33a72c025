//! Composite task filters.
//!
//! A [`FilterState`] holds several independent dimensions. A task matches
//! when every populated dimension matches (AND); inside a set dimension any
//! member may match (OR). Empty sets and unset flags place no constraint.

use crate::domain::board::Board;
use crate::domain::ids::{StatusId, UserId};
use crate::domain::task::{Priority, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One entry of the assignee filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssigneeFilter {
    /// Tasks without an assignee
    Unassigned,
    User(UserId),
}

impl AssigneeFilter {
    fn matches(&self, assignee: Option<&UserId>) -> bool {
        match (self, assignee) {
            (Self::Unassigned, None) => true,
            (Self::User(wanted), Some(actual)) => wanted == actual,
            _ => false,
        }
    }
}

/// Client-held filter selection for a task list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub status: BTreeSet<StatusId>,
    pub priority: BTreeSet<Priority>,
    pub assignee: BTreeSet<AssigneeFilter>,
    /// `Some(true)`: at least one label, `Some(false)`: no labels
    pub has_labels: Option<bool>,
    /// `Some(true)`: only overdue tasks, `Some(false)`: hide overdue tasks
    pub is_overdue: Option<bool>,
}

impl FilterState {
    /// The empty filter, matching every task
    pub fn clear() -> Self {
        Self::default()
    }

    pub fn has_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Number of dimensions that currently constrain the result
    pub fn active_count(&self) -> usize {
        [
            !self.status.is_empty(),
            !self.priority.is_empty(),
            !self.assignee.is_empty(),
            self.has_labels.is_some(),
            self.is_overdue.is_some(),
        ]
        .iter()
        .filter(|&&active| active)
        .count()
    }

    /// Adds or removes a status; returns whether it is now selected
    pub fn toggle_status(&mut self, status: StatusId) -> bool {
        toggle(&mut self.status, status)
    }

    pub fn toggle_priority(&mut self, priority: Priority) -> bool {
        toggle(&mut self.priority, priority)
    }

    pub fn toggle_assignee(&mut self, assignee: AssigneeFilter) -> bool {
        toggle(&mut self.assignee, assignee)
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// Evaluates filters at a fixed instant against one board's statuses
#[derive(Debug, Clone)]
pub struct FilterEngine {
    now: DateTime<Utc>,
    done_statuses: HashSet<StatusId>,
}

impl FilterEngine {
    pub fn new(now: DateTime<Utc>, done_statuses: impl IntoIterator<Item = StatusId>) -> Self {
        Self {
            now,
            done_statuses: done_statuses.into_iter().collect(),
        }
    }

    pub fn for_board(board: &Board, now: DateTime<Utc>) -> Self {
        Self::new(now, board.done_status_ids())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Due before now and not sitting in a done status
    pub fn is_overdue(&self, task: &Task) -> bool {
        task.due_date.is_some_and(|due| due < self.now)
            && !self.done_statuses.contains(&task.status_id)
    }

    pub fn matches(&self, task: &Task, filters: &FilterState) -> bool {
        let in_set = |empty: bool, hit: bool| empty || hit;

        in_set(filters.status.is_empty(), filters.status.contains(&task.status_id))
            && in_set(
                filters.priority.is_empty(),
                filters.priority.contains(&task.priority),
            )
            && in_set(
                filters.assignee.is_empty(),
                filters
                    .assignee
                    .iter()
                    .any(|a| a.matches(task.assignee_id.as_ref())),
            )
            && filters
                .has_labels
                .map_or(true, |wanted| task.has_labels() == wanted)
            && filters
                .is_overdue
                .map_or(true, |wanted| self.is_overdue(task) == wanted)
    }

    /// Matching tasks in their original relative order
    pub fn apply<'a>(&self, tasks: &'a [Task], filters: &FilterState) -> Vec<&'a Task> {
        if !filters.has_active() {
            return tasks.iter().collect();
        }
        tasks.iter().filter(|t| self.matches(t, filters)).collect()
    }
}
