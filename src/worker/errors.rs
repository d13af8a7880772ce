//! Worker errors

use thiserror::Error;

use crate::transport::CommError;
use crate::wire::WireError;

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Worker errors
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Rank {0} is not a worker")]
    NotAWorker(usize),

    #[error("Expected exactly one query from coordinator {coordinator}, got {count}")]
    MalformedRequest { coordinator: usize, count: usize },

    #[error(transparent)]
    Comm(#[from] CommError),

    #[error(transparent)]
    Wire(#[from] WireError),
}
