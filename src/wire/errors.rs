//! Wire codec errors

use thiserror::Error;

/// Result type for wire operations
pub type WireResult<T> = Result<T, WireError>;

/// Wire codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("{datatype} message of {len} bytes is not a whole number of {stride}-byte records")]
    PartialRecord {
        datatype: &'static str,
        len: usize,
        stride: usize,
    },

    #[error("{datatype} record needs {expected} bytes, got {actual}")]
    ShortRecord {
        datatype: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown query type discriminant: {0}")]
    UnknownQueryType(u8),

    #[error("Invalid date encoding: {0} days from CE")]
    InvalidDate(i32),
}
