use medtrace_store::StoreError;
use thiserror::Error;

/// Result type for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;

/// Contract failures. None are recovered locally; every one reaches the caller.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("the medicine {0} does not exist")]
    NotFound(String),

    #[error("the medicine {0} already exists")]
    AlreadyExists(String),

    #[error("failed to decode medicine record {key}: {source}")]
    CorruptRecord {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The store call failed, including commit conflicts.
    #[error("world state unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to encode result: {0}")]
    Encoding(String),
}

impl ContractError {
    /// Whether resubmitting the same invocation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(err) if err.is_conflict())
    }
}
