use crate::domain::task::Task;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields a task list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Position,
    Title,
    Priority,
    Due,
    Labels,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "position" => Ok(SortField::Position),
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "due" => Ok(SortField::Due),
            "labels" => Ok(SortField::Labels),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: position, title, priority, due, labels",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts tasks in place; equal elements keep their relative order.
///
/// # Examples
/// ```
/// use taskboard_core::domain::ids::StatusId;
/// use taskboard_core::domain::sorting::{sort_tasks, SortField, SortOrder};
/// use taskboard_core::domain::task::{Priority, Task};
///
/// let status = StatusId::new();
/// let mut tasks = vec![
///     Task::new("Later", status, 1.0).with_priority(Priority::Low),
///     Task::new("Now", status, 2.0).with_priority(Priority::Urgent),
/// ];
///
/// sort_tasks(&mut tasks, SortField::Priority, SortOrder::Descending);
/// assert_eq!(tasks[0].title, "Now");
/// ```
pub fn sort_tasks(tasks: &mut [Task], field: SortField, order: SortOrder) {
    let directed = |cmp: Ordering| match order {
        SortOrder::Ascending => cmp,
        SortOrder::Descending => cmp.reverse(),
    };

    tasks.sort_by(|a, b| match field {
        SortField::Position => directed(a.order_index.total_cmp(&b.order_index)),
        SortField::Title => directed(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
        SortField::Priority => directed(a.priority.rank().cmp(&b.priority.rank())),
        SortField::Due => compare_option_dates(a.due_date, b.due_date, directed),
        SortField::Labels => directed(a.labels.len().cmp(&b.labels.len())),
    });
}

/// Dated tasks come before undated ones in either direction
fn compare_option_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    directed: impl Fn(Ordering) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => directed(a_date.cmp(&b_date)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{LabelId, StatusId};
    use crate::domain::task::Priority;

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_sort_by_position() {
        let s = StatusId::new();
        let mut tasks = vec![Task::new("c", s, 3.0), Task::new("a", s, -1.0), Task::new("b", s, 0.5)];

        sort_tasks(&mut tasks, SortField::Position, SortOrder::Ascending);
        assert_eq!(titles(&tasks), vec!["a", "b", "c"]);

        sort_tasks(&mut tasks, SortField::Position, SortOrder::Descending);
        assert_eq!(titles(&tasks), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_by_title_case_insensitive() {
        let s = StatusId::new();
        let mut tasks = vec![
            Task::new("zebra", s, 1.0),
            Task::new("Apple", s, 2.0),
            Task::new("BANANA", s, 3.0),
        ];

        sort_tasks(&mut tasks, SortField::Title, SortOrder::Ascending);
        assert_eq!(titles(&tasks), vec!["Apple", "BANANA", "zebra"]);
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let s = StatusId::new();
        let mut tasks = vec![
            Task::new("low", s, 1.0).with_priority(Priority::Low),
            Task::new("high-1", s, 2.0).with_priority(Priority::High),
            Task::new("urgent", s, 3.0).with_priority(Priority::Urgent),
            Task::new("high-2", s, 4.0).with_priority(Priority::High),
        ];

        sort_tasks(&mut tasks, SortField::Priority, SortOrder::Descending);
        assert_eq!(titles(&tasks), vec!["urgent", "high-1", "high-2", "low"]);
    }

    #[test]
    fn test_sort_by_due_keeps_undated_last() {
        let s = StatusId::new();
        let early = Utc::now();
        let late = early + chrono::Duration::days(5);
        let mut tasks = vec![
            Task::new("none", s, 1.0),
            Task::new("late", s, 2.0).with_due_date(late),
            Task::new("early", s, 3.0).with_due_date(early),
        ];

        sort_tasks(&mut tasks, SortField::Due, SortOrder::Ascending);
        assert_eq!(titles(&tasks), vec!["early", "late", "none"]);

        sort_tasks(&mut tasks, SortField::Due, SortOrder::Descending);
        assert_eq!(titles(&tasks), vec!["late", "early", "none"]);
    }

    #[test]
    fn test_sort_by_label_count() {
        let s = StatusId::new();
        let mut tasks = vec![
            Task::new("two", s, 1.0).with_label(LabelId::new()).with_label(LabelId::new()),
            Task::new("zero", s, 2.0),
            Task::new("one", s, 3.0).with_label(LabelId::new()),
        ];

        sort_tasks(&mut tasks, SortField::Labels, SortOrder::Ascending);
        assert_eq!(titles(&tasks), vec!["zero", "one", "two"]);
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!(SortField::from_str("Priority").unwrap(), SortField::Priority);
        assert_eq!(SortOrder::from_str("DESC").unwrap(), SortOrder::Descending);
        assert!(SortField::from_str("color").is_err());
        assert!(SortOrder::from_str("up").is_err());
    }
}
