//! Communication error types
//!
//! Every communication failure is fatal to the calling process. There is
//! no retry: a failed collective leaves peers out of lockstep.

use std::fmt;

use crate::wire::WireError;

/// Communication error
#[derive(Debug, Clone)]
pub struct CommError {
    /// Error kind
    pub kind: CommErrorKind,
    /// Error message
    pub message: String,
}

/// Communication error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommErrorKind {
    /// Rank is outside the world or group
    InvalidRank,

    /// Incoming message does not fit the receive buffer
    Truncated,

    /// Declared shape of a collective does not match what arrived
    ShapeMismatch,

    /// Message payload could not be decoded
    Codec,

    /// A peer aborted the cluster
    Aborted,

    /// Receive timed out (only when a timeout is layered on)
    Timeout,
}

impl CommError {
    /// Create a new communication error.
    pub fn new(kind: CommErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create an invalid rank error.
    pub fn invalid_rank(message: impl Into<String>) -> Self {
        Self::new(CommErrorKind::InvalidRank, message)
    }

    /// Create a truncation error.
    pub fn truncated(message: impl Into<String>) -> Self {
        Self::new(CommErrorKind::Truncated, message)
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(message: impl Into<String>) -> Self {
        Self::new(CommErrorKind::ShapeMismatch, message)
    }

    /// Create an aborted error.
    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(CommErrorKind::Aborted, message)
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(CommErrorKind::Timeout, message)
    }

    /// Whether the failure originated at another process
    pub fn is_remote(&self) -> bool {
        self.kind == CommErrorKind::Aborted
    }
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommError({:?}): {}", self.kind, self.message)
    }
}

impl std::error::Error for CommError {}

impl From<WireError> for CommError {
    fn from(e: WireError) -> Self {
        Self::new(CommErrorKind::Codec, e.to_string())
    }
}

/// Result type for communication operations
pub type CommResult<T> = Result<T, CommError>;
