pub mod board;
pub mod filter;
pub mod ids;
pub mod lifecycle;
pub mod position;
pub mod reorder;
pub mod sorting;
pub mod task;

pub use board::{Board, BoardStatus, StatusColor};
pub use filter::{AssigneeFilter, FilterEngine, FilterState};
pub use ids::{BoardId, LabelId, StatusId, TaskId, UserId};
pub use lifecycle::StatusLifecycleGuard;
pub use position::{PositionSequencer, Positioned};
pub use reorder::{Direction, PositionUpdate, ReorderCoordinator, Reordering};
pub use sorting::{sort_tasks, SortField, SortOrder};
pub use task::{Priority, Task};
