use crate::domain::ids::{LabelId, StatusId, TaskId, UserId};
use crate::domain::position::Positioned;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

/// Task priority, from most to least pressing
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Higher rank means more pressing
    pub fn rank(&self) -> u8 {
        match self {
            Self::Urgent => 3,
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Urgent => write!(f, "urgent"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!(
                "Invalid priority '{}'. Valid priorities: urgent, high, medium, low",
                s
            )),
        }
    }
}

/// A task as seen by the ordering and filtering engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status_id: StatusId,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<LabelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub order_index: f64,
}

impl Task {
    /// Creates an unassigned, unlabeled task of medium priority
    pub fn new(title: impl Into<String>, status_id: StatusId, order_index: f64) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            status_id,
            priority: Priority::default(),
            assignee_id: None,
            labels: BTreeSet::new(),
            due_date: None,
            order_index,
        }
    }

    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee_id = Some(assignee);
        self
    }

    pub fn with_label(mut self, label: LabelId) -> Self {
        self.labels.insert(label);
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn is_assigned(&self) -> bool {
        self.assignee_id.is_some()
    }

    pub fn has_labels(&self) -> bool {
        !self.labels.is_empty()
    }
}

impl Positioned for Task {
    type Id = TaskId;

    fn position_id(&self) -> &TaskId {
        &self.id
    }

    fn order_index(&self) -> f64 {
        self.order_index
    }

    fn set_order_index(&mut self, order_index: f64) {
        self.order_index = order_index;
    }
}

/// Tasks of a single status column, in display order.
///
/// Ties on `order_index` keep their input order.
pub fn column(tasks: &[Task], status_id: StatusId) -> Vec<&Task> {
    let mut column: Vec<&Task> = tasks.iter().filter(|t| t.status_id == status_id).collect();
    column.sort_by(|a, b| a.order_index.total_cmp(&b.order_index));
    column
}
