use thiserror::Error;

/// Result type for world-state operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// World-state errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A key read by the transaction changed before it could commit.
    #[error("MVCC read conflict on key '{key}' in transaction {tx_id}")]
    Conflict { key: String, tx_id: String },

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Conflicts are safe to resubmit; other failures are not known to be.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
