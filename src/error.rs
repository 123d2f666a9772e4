use crate::remote::RemoteOperation;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardSyncError>;

#[derive(Debug, Error)]
pub enum BoardSyncError {
    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid column order: {0}")]
    InvalidOrder(String),

    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A persist call to the remote service was rejected. Any compensating
    /// resync has already run by the time this is returned.
    #[error("{operation} failed: {source}")]
    PersistFailure {
        operation: RemoteOperation,
        #[source]
        source: Box<BoardSyncError>,
    },

    #[error("Remote error: {0}")]
    Remote(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BoardSyncError {
    /// Wraps a remote error as a persist failure for `operation`
    pub fn persist(operation: RemoteOperation, source: BoardSyncError) -> Self {
        Self::PersistFailure {
            operation,
            source: Box::new(source),
        }
    }

    pub fn is_persist_failure(&self) -> bool {
        matches!(self, Self::PersistFailure { .. })
    }

    /// Short message suitable for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            Self::PersistFailure { operation, .. } => match operation {
                RemoteOperation::MoveCard => "Failed to move card.".to_string(),
                RemoteOperation::ReorderColumns => "Failed to reorder columns.".to_string(),
                RemoteOperation::FetchBoard => "Failed to fetch board.".to_string(),
                other => format!("Failed to {}.", other.describe()),
            },
            other => other.to_string(),
        }
    }
}
