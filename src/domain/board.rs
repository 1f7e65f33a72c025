use crate::domain::ids::{BoardId, StatusId};
use crate::domain::lifecycle::StatusLifecycleGuard;
use crate::domain::position::{PositionSequencer, Positioned};
use crate::domain::reorder::{Direction, ReorderCoordinator, Reordering};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::{fmt, str::FromStr};

/// Palette available to status columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    #[default]
    Gray,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
}

impl StatusColor {
    pub const ALL: [StatusColor; 8] = [
        StatusColor::Gray,
        StatusColor::Red,
        StatusColor::Orange,
        StatusColor::Yellow,
        StatusColor::Green,
        StatusColor::Blue,
        StatusColor::Purple,
        StatusColor::Pink,
    ];
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gray => "gray",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Pink => "pink",
        };
        f.write_str(name)
    }
}

impl FromStr for StatusColor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|color| color.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid color '{}'. Valid colors: gray, red, orange, yellow, green, blue, purple, pink",
                    s
                )
            })
    }
}

/// A status column on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardStatus {
    pub id: StatusId,
    pub board_id: BoardId,
    pub name: String,
    pub color: StatusColor,
    pub order_index: f64,
    pub is_default: bool,
    /// Tasks in a done status are never overdue
    #[serde(default)]
    pub is_done: bool,
}

impl BoardStatus {
    pub fn new(board_id: BoardId, name: impl Into<String>, color: StatusColor, order_index: f64) -> Self {
        Self {
            id: StatusId::new(),
            board_id,
            name: name.into(),
            color,
            order_index,
            is_default: false,
            is_done: false,
        }
    }

    fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    fn done(mut self) -> Self {
        self.is_done = true;
        self
    }
}

impl Positioned for BoardStatus {
    type Id = StatusId;

    fn position_id(&self) -> &StatusId {
        &self.id
    }

    fn order_index(&self) -> f64 {
        self.order_index
    }

    fn set_order_index(&mut self, order_index: f64) {
        self.order_index = order_index;
    }
}

/// The statuses of one board, kept sorted by `order_index`.
///
/// Every mutating method leaves the board untouched when it fails.
/// Deserialization goes through [`Board::from_statuses`], so a stored board
/// with unsorted keys or without exactly one default is sorted or rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BoardRecord")]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    statuses: Vec<BoardStatus>,
    #[serde(skip)]
    sequencer: PositionSequencer,
}

#[derive(Deserialize)]
struct BoardRecord {
    id: BoardId,
    name: String,
    statuses: Vec<BoardStatus>,
}

impl TryFrom<BoardRecord> for Board {
    type Error = BoardError;

    fn try_from(record: BoardRecord) -> Result<Self> {
        Board::from_statuses(record.id, record.name, record.statuses)
    }
}

impl Board {
    /// Creates a board with the usual To Do / In Progress / Done columns
    pub fn new(name: impl Into<String>) -> Self {
        let id = BoardId::new();
        let statuses = vec![
            BoardStatus::new(id, "To Do", StatusColor::Gray, 0.0).as_default(),
            BoardStatus::new(id, "In Progress", StatusColor::Blue, 1000.0),
            BoardStatus::new(id, "Done", StatusColor::Green, 2000.0).done(),
        ];
        Self {
            id,
            name: name.into(),
            statuses,
            sequencer: PositionSequencer::default(),
        }
    }

    /// Rebuilds a board from statuses supplied by the data-access layer
    pub fn from_statuses(
        id: BoardId,
        name: impl Into<String>,
        mut statuses: Vec<BoardStatus>,
    ) -> Result<Self> {
        if let Some(stray) = statuses.iter().find(|s| s.board_id != id) {
            return Err(BoardError::NotFound(format!(
                "status {} does not belong to board {}",
                stray.id, id
            )));
        }
        statuses.sort_by(|a, b| a.order_index.total_cmp(&b.order_index));

        let board = Self {
            id,
            name: name.into(),
            statuses,
            sequencer: PositionSequencer::default(),
        };
        board.guard().check_single_default(&board.statuses)?;
        Ok(board)
    }

    pub fn with_sequencer(mut self, sequencer: PositionSequencer) -> Self {
        self.sequencer = sequencer;
        self
    }

    fn guard(&self) -> StatusLifecycleGuard {
        StatusLifecycleGuard::new(self.sequencer)
    }

    fn coordinator(&self) -> ReorderCoordinator {
        ReorderCoordinator::new(self.sequencer)
    }

    pub fn statuses(&self) -> &[BoardStatus] {
        &self.statuses
    }

    pub fn status(&self, id: &StatusId) -> Option<&BoardStatus> {
        self.statuses.iter().find(|s| &s.id == id)
    }

    fn status_mut(&mut self, id: &StatusId) -> Result<&mut BoardStatus> {
        self.statuses
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))
    }

    pub fn default_status(&self) -> Option<&BoardStatus> {
        self.statuses.iter().find(|s| s.is_default)
    }

    pub fn done_status_ids(&self) -> HashSet<StatusId> {
        self.statuses
            .iter()
            .filter(|s| s.is_done)
            .map(|s| s.id)
            .collect()
    }

    /// Appends a new status and returns its id.
    ///
    /// When there is no room after the last key the existing statuses are
    /// renumbered first; that reordering is returned alongside the id so it
    /// can be persisted with the new status.
    pub fn add_status(
        &mut self,
        name: &str,
        color: StatusColor,
    ) -> Result<(StatusId, Option<Reordering<StatusId>>)> {
        let name = self.guard().validate_create(&self.statuses, name)?;
        let mut status = BoardStatus::new(self.id, name, color, 0.0);

        let renumbered = match self.guard().next_order_index(&self.statuses) {
            Ok(key) => {
                status.order_index = key;
                None
            }
            Err(err) if err.is_precision_exhausted() => {
                let placed = self
                    .coordinator()
                    .place_at(&self.statuses, &status.id, self.statuses.len())?;
                status.order_index = placed
                    .key_for(&status.id)
                    .ok_or_else(|| BoardError::precision(None, None))?;
                placed.apply_to(&mut self.statuses);
                Some(placed)
            }
            Err(err) => return Err(err),
        };

        let id = status.id;
        self.statuses.push(status);
        Ok((id, renumbered))
    }

    pub fn rename_status(&mut self, id: &StatusId, name: &str) -> Result<()> {
        let name = self.guard().validate_rename(&self.statuses, id, name)?;
        self.status_mut(id)?.name = name;
        Ok(())
    }

    pub fn recolor_status(&mut self, id: &StatusId, color: StatusColor) -> Result<()> {
        self.status_mut(id)?.color = color;
        Ok(())
    }

    /// Makes `id` the single default status
    pub fn set_default_status(&mut self, id: &StatusId) -> Result<()> {
        self.status_mut(id)?;
        for status in &mut self.statuses {
            status.is_default = &status.id == id;
        }
        Ok(())
    }

    pub fn set_done_status(&mut self, id: &StatusId, is_done: bool) -> Result<()> {
        self.status_mut(id)?.is_done = is_done;
        Ok(())
    }

    /// Removes a status that is neither default nor referenced by any task
    pub fn delete_status(&mut self, id: &StatusId, task_count: usize) -> Result<BoardStatus> {
        let index = self
            .statuses
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| BoardError::NotFound(id.to_string()))?;
        self.guard().check_delete(&self.statuses[index], task_count)?;
        Ok(self.statuses.remove(index))
    }

    pub fn move_status(&mut self, id: &StatusId, direction: Direction) -> Result<Reordering<StatusId>> {
        let reordering = self.coordinator().move_one(&self.statuses, id, direction)?;
        reordering.apply_to(&mut self.statuses);
        Ok(reordering)
    }

    pub fn reorder_statuses(&mut self, ordered_ids: &[StatusId]) -> Result<Reordering<StatusId>> {
        let reordering = self.coordinator().apply_full_order(&self.statuses, ordered_ids)?;
        reordering.apply_to(&mut self.statuses);
        Ok(reordering)
    }

    /// Applies position updates computed elsewhere, e.g. echoed by the
    /// data-access layer
    pub fn apply_reordering(&mut self, reordering: &Reordering<StatusId>) {
        reordering.apply_to(&mut self.statuses);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new("Default Board")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(board: &Board) -> Vec<&str> {
        board.statuses().iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_board_creation() {
        let board = Board::default();

        assert_eq!(names(&board), vec!["To Do", "In Progress", "Done"]);
        assert_eq!(board.default_status().unwrap().name, "To Do");
        assert_eq!(board.done_status_ids().len(), 1);
        assert!(board.statuses().iter().all(|s| s.board_id == board.id));
    }

    #[test]
    fn test_add_status_appends() {
        let mut board = Board::default();
        let (id, renumbered) = board.add_status("  Review ", StatusColor::Purple).unwrap();

        let status = board.status(&id).unwrap();
        assert_eq!(status.name, "Review");
        assert_eq!(status.order_index, 2001.0);
        assert!(!status.is_default);
        assert_eq!(names(&board).last(), Some(&"Review"));
        assert!(renumbered.is_none());
    }

    #[test]
    fn test_add_status_renumbers_when_out_of_room() {
        let id = BoardId::new();
        let statuses = vec![
            BoardStatus::new(id, "A", StatusColor::Gray, 0.0).as_default(),
            BoardStatus::new(id, "B", StatusColor::Blue, 1e300),
        ];
        let mut board = Board::from_statuses(id, "Crowded", statuses).unwrap();

        let (c, renumbered) = board.add_status("C", StatusColor::Green).unwrap();

        let keys: Vec<(&str, f64)> = board
            .statuses()
            .iter()
            .map(|s| (s.name.as_str(), s.order_index))
            .collect();
        assert_eq!(keys, vec![("A", 0.0), ("B", 1000.0), ("C", 1001.0)]);

        let renumbered = renumbered.unwrap();
        assert!(renumbered.renormalized);
        let b = board.statuses()[1].id;
        assert_eq!(renumbered.key_for(&b), Some(1000.0));
        assert_eq!(renumbered.key_for(&c), Some(1001.0));
        assert_eq!(renumbered.order.last(), Some(&c));
    }

    #[test]
    fn test_add_status_name_collision_leaves_board_untouched() {
        let mut board = Board::default();
        let err = board.add_status("Done", StatusColor::Red).unwrap_err();

        assert!(matches!(err, BoardError::NameCollision(_)));
        assert_eq!(board.statuses().len(), 3);
    }

    #[test]
    fn test_rename_and_recolor() {
        let mut board = Board::default();
        let id = board.statuses()[1].id;

        board.rename_status(&id, "Doing").unwrap();
        board.recolor_status(&id, StatusColor::Orange).unwrap();

        let status = board.status(&id).unwrap();
        assert_eq!(status.name, "Doing");
        assert_eq!(status.color, StatusColor::Orange);
        assert!(board.rename_status(&id, "Done").is_err());
    }

    #[test]
    fn test_set_default_status_keeps_exactly_one() {
        let mut board = Board::default();
        let done = board.statuses()[2].id;

        board.set_default_status(&done).unwrap();

        let defaults: Vec<_> = board.statuses().iter().filter(|s| s.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, done);
        assert!(board.set_default_status(&StatusId::new()).is_err());
    }

    #[test]
    fn test_delete_status_rules() {
        let mut board = Board::default();
        let todo = board.statuses()[0].id;
        let doing = board.statuses()[1].id;

        assert!(matches!(
            board.delete_status(&todo, 0),
            Err(BoardError::DefaultStatusProtected)
        ));
        assert!(matches!(
            board.delete_status(&doing, 2),
            Err(BoardError::StatusInUse { task_count: 2 })
        ));

        let removed = board.delete_status(&doing, 0).unwrap();
        assert_eq!(removed.name, "In Progress");
        assert_eq!(names(&board), vec!["To Do", "Done"]);
        assert!(matches!(
            board.delete_status(&doing, 0),
            Err(BoardError::NotFound(_))
        ));
    }

    #[test]
    fn test_move_status_up() {
        let id = BoardId::new();
        let a = BoardStatus::new(id, "A", StatusColor::Gray, 1.0).as_default();
        let b = BoardStatus::new(id, "B", StatusColor::Blue, 2.0);
        let c = BoardStatus::new(id, "C", StatusColor::Green, 3.0);
        let b_id = b.id;
        let mut board = Board::from_statuses(id, "Test", vec![a, b, c]).unwrap();

        let reordering = board.move_status(&b_id, Direction::Up).unwrap();

        assert_eq!(names(&board), vec!["B", "A", "C"]);
        assert_eq!(reordering.updates.len(), 1);
        assert!(board.status(&b_id).unwrap().order_index < 1.0);
        assert_eq!(board.statuses()[2].order_index, 3.0);
    }

    #[test]
    fn test_reorder_statuses() {
        let mut board = Board::default();
        let ids: Vec<StatusId> = board.statuses().iter().rev().map(|s| s.id).collect();

        board.reorder_statuses(&ids).unwrap();
        assert_eq!(names(&board), vec!["Done", "In Progress", "To Do"]);

        assert!(matches!(
            board.reorder_statuses(&ids[..2]),
            Err(BoardError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_from_statuses_requires_single_default() {
        let id = BoardId::new();
        let a = BoardStatus::new(id, "A", StatusColor::Gray, 1.0);
        assert!(matches!(
            Board::from_statuses(id, "Test", vec![a]),
            Err(BoardError::NoDefaultStatus)
        ));
    }

    #[test]
    fn test_from_statuses_sorts_by_position() {
        let id = BoardId::new();
        let late = BoardStatus::new(id, "Late", StatusColor::Gray, 5.0);
        let early = BoardStatus::new(id, "Early", StatusColor::Gray, 1.0).as_default();

        let board = Board::from_statuses(id, "Test", vec![late, early]).unwrap();
        assert_eq!(names(&board), vec!["Early", "Late"]);
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(StatusColor::from_str("Purple").unwrap(), StatusColor::Purple);
        assert_eq!(StatusColor::Pink.to_string(), "pink");
        assert!(StatusColor::from_str("teal").is_err());
        assert_eq!(StatusColor::default(), StatusColor::Gray);
    }

    #[test]
    fn test_board_serialization() {
        let board = Board::default();
        let json = serde_json::to_string(&board).unwrap();
        let restored: Board = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, board.id);
        assert_eq!(restored.statuses(), board.statuses());
    }

    #[test]
    fn test_deserialization_sorts_statuses() {
        let board = Board::default();
        let mut json = serde_json::to_value(&board).unwrap();
        json["statuses"][0]["order_index"] = serde_json::json!(9999.0);

        let restored: Board = serde_json::from_value(json).unwrap();
        assert_eq!(names(&restored), vec!["In Progress", "Done", "To Do"]);
    }

    #[test]
    fn test_deserialization_rejects_several_defaults() {
        let board = Board::default();
        let mut json = serde_json::to_value(&board).unwrap();
        for status in json["statuses"].as_array_mut().unwrap() {
            status["is_default"] = serde_json::json!(true);
        }

        let err = serde_json::from_value::<Board>(json).unwrap_err();
        assert!(err.to_string().contains("has 3 default statuses"));
    }
}
