//! Error types for grade stores

use gradebook_table::GradeError;

/// Storage-layer failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite call failed
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored document could not be encoded or decoded
    #[error("document encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blocking storage task panicked or was cancelled
    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Store used after `close`
    #[error("store is closed")]
    Closed,
}

impl From<StoreError> for GradeError {
    fn from(err: StoreError) -> Self {
        GradeError::Db(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
