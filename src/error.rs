use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Position precision exhausted between {before:?} and {after:?}")]
    PrecisionExhausted {
        before: Option<f64>,
        after: Option<f64>,
    },

    #[error("A status named '{0}' already exists on this board")]
    NameCollision(String),

    #[error("Status name must not be empty")]
    EmptyStatusName,

    #[error("The default status cannot be deleted")]
    DefaultStatusProtected,

    #[error("Status is used by {task_count} task(s)")]
    StatusInUse { task_count: usize },

    #[error("Board has no default status")]
    NoDefaultStatus,

    #[error("Board has {0} default statuses, expected exactly one")]
    MultipleDefaultStatuses(usize),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BoardError {
    pub(crate) fn precision(before: Option<f64>, after: Option<f64>) -> Self {
        Self::PrecisionExhausted { before, after }
    }

    /// True for the internal signal that triggers renormalization
    pub fn is_precision_exhausted(&self) -> bool {
        matches!(self, Self::PrecisionExhausted { .. })
    }
}
