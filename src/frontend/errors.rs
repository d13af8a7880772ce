//! Front end errors

use thiserror::Error;

/// Result type for front end operations
pub type FrontendResult<T> = Result<T, FrontendError>;

/// Front end errors
#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("Operator I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Result encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Operator channel closed")]
    Closed,
}
