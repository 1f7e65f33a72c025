//! Invariants on the set of statuses of one board.

use crate::domain::board::BoardStatus;
use crate::domain::ids::StatusId;
use crate::domain::position::PositionSequencer;
use crate::error::{BoardError, Result};

/// Guards creation, renaming and deletion of board statuses.
///
/// Names are compared after trimming surrounding whitespace and are
/// case-sensitive: "Done" and "done" may coexist.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusLifecycleGuard {
    sequencer: PositionSequencer,
}

impl StatusLifecycleGuard {
    pub fn new(sequencer: PositionSequencer) -> Self {
        Self { sequencer }
    }

    /// Explains why `status` cannot be deleted, if it cannot
    pub fn check_delete(&self, status: &BoardStatus, task_count: usize) -> Result<()> {
        if status.is_default {
            return Err(BoardError::DefaultStatusProtected);
        }
        if task_count > 0 {
            return Err(BoardError::StatusInUse { task_count });
        }
        Ok(())
    }

    pub fn can_delete(&self, status: &BoardStatus, task_count: usize) -> bool {
        self.check_delete(status, task_count).is_ok()
    }

    /// Validates a new status name and returns it trimmed
    pub fn validate_create(&self, existing: &[BoardStatus], proposed: &str) -> Result<String> {
        self.validate_name(existing.iter(), proposed)
    }

    /// Like [`validate_create`](Self::validate_create), ignoring the status
    /// being renamed so it may keep its own name
    pub fn validate_rename(
        &self,
        existing: &[BoardStatus],
        id: &StatusId,
        proposed: &str,
    ) -> Result<String> {
        self.validate_name(existing.iter().filter(|s| &s.id != id), proposed)
    }

    fn validate_name<'a>(
        &self,
        mut others: impl Iterator<Item = &'a BoardStatus>,
        proposed: &str,
    ) -> Result<String> {
        let name = proposed.trim();
        if name.is_empty() {
            return Err(BoardError::EmptyStatusName);
        }
        if others.any(|s| s.name.trim() == name) {
            return Err(BoardError::NameCollision(name.to_string()));
        }
        Ok(name.to_string())
    }

    /// Key that appends a status after every existing one
    pub fn next_order_index(&self, existing: &[BoardStatus]) -> Result<f64> {
        let last = existing
            .iter()
            .map(|s| s.order_index)
            .filter(|k| k.is_finite())
            .max_by(|a, b| a.total_cmp(b));
        self.sequencer.key_between(last, None)
    }

    /// Verifies exactly one status is marked default
    pub fn check_single_default(&self, statuses: &[BoardStatus]) -> Result<()> {
        match statuses.iter().filter(|s| s.is_default).count() {
            1 => Ok(()),
            0 => Err(BoardError::NoDefaultStatus),
            n => Err(BoardError::MultipleDefaultStatuses(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::StatusColor;
    use crate::domain::ids::BoardId;

    fn status(name: &str, order_index: f64, is_default: bool) -> BoardStatus {
        let mut status = BoardStatus::new(BoardId::new(), name, StatusColor::Gray, order_index);
        status.is_default = is_default;
        status
    }

    #[test]
    fn test_default_status_is_protected() {
        let guard = StatusLifecycleGuard::default();
        let default = status("To Do", 1.0, true);

        assert!(matches!(
            guard.check_delete(&default, 0),
            Err(BoardError::DefaultStatusProtected)
        ));
        assert!(matches!(
            guard.check_delete(&default, 5),
            Err(BoardError::DefaultStatusProtected)
        ));
        assert!(!guard.can_delete(&default, 0));
    }

    #[test]
    fn test_status_in_use() {
        let guard = StatusLifecycleGuard::default();
        let review = status("Review", 2.0, false);

        assert!(matches!(
            guard.check_delete(&review, 3),
            Err(BoardError::StatusInUse { task_count: 3 })
        ));
        assert!(guard.can_delete(&review, 0));
    }

    #[test]
    fn test_validate_create_trims_and_detects_collision() {
        let guard = StatusLifecycleGuard::default();
        let existing = vec![status("To Do", 1.0, true), status("Done", 2.0, false)];

        assert_eq!(guard.validate_create(&existing, "  Review ").unwrap(), "Review");
        assert!(matches!(
            guard.validate_create(&existing, " Done "),
            Err(BoardError::NameCollision(name)) if name == "Done"
        ));
    }

    #[test]
    fn test_validate_create_is_case_sensitive() {
        let guard = StatusLifecycleGuard::default();
        let existing = vec![status("Done", 1.0, true)];

        assert_eq!(guard.validate_create(&existing, "done").unwrap(), "done");
    }

    #[test]
    fn test_validate_create_rejects_blank() {
        let guard = StatusLifecycleGuard::default();
        assert!(matches!(
            guard.validate_create(&[], "   "),
            Err(BoardError::EmptyStatusName)
        ));
    }

    #[test]
    fn test_validate_rename_allows_own_name() {
        let guard = StatusLifecycleGuard::default();
        let existing = vec![status("To Do", 1.0, true), status("Done", 2.0, false)];
        let done_id = existing[1].id;

        assert_eq!(guard.validate_rename(&existing, &done_id, "Done ").unwrap(), "Done");
        assert!(guard.validate_rename(&existing, &done_id, "To Do").is_err());
    }

    #[test]
    fn test_next_order_index_appends() {
        let guard = StatusLifecycleGuard::default();
        let existing = vec![status("A", 3.0, true), status("B", 7.5, false), status("C", 2.0, false)];

        assert_eq!(guard.next_order_index(&existing).unwrap(), 8.5);
        assert_eq!(guard.next_order_index(&[]).unwrap(), 1.0);
    }

    #[test]
    fn test_check_single_default() {
        let guard = StatusLifecycleGuard::default();

        assert!(guard
            .check_single_default(&[status("A", 1.0, true), status("B", 2.0, false)])
            .is_ok());
        assert!(matches!(
            guard.check_single_default(&[status("A", 1.0, false)]),
            Err(BoardError::NoDefaultStatus)
        ));
        assert!(matches!(
            guard.check_single_default(&[status("A", 1.0, true), status("B", 2.0, true)]),
            Err(BoardError::MultipleDefaultStatuses(2))
        ));
    }
}
