//! Topology error types
//!
//! Error codes:
//! - PARADB_TOPOLOGY_INVALID (FATAL)
//! - PARADB_TOPOLOGY_GROUP_FAILED (FATAL)

use std::fmt;

use crate::transport::CommError;

/// Topology error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyErrorCode {
    /// World cannot be split into coordinator/worker pairs
    InvalidWorld,
    /// A process group could not be constructed
    GroupFailed,
}

impl TopologyErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            TopologyErrorCode::InvalidWorld => "PARADB_TOPOLOGY_INVALID",
            TopologyErrorCode::GroupFailed => "PARADB_TOPOLOGY_GROUP_FAILED",
        }
    }
}

impl fmt::Display for TopologyErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Topology error. Always fatal: the process must not enter its main loop.
#[derive(Debug)]
pub struct TopologyError {
    code: TopologyErrorCode,
    message: String,
}

impl TopologyError {
    /// World size cannot be split into pairs
    pub fn invalid_world(world_size: usize) -> Self {
        Self {
            code: TopologyErrorCode::InvalidWorld,
            message: format!(
                "world of {} processes cannot be split into coordinator/worker pairs",
                world_size
            ),
        }
    }

    /// Group construction failed
    pub fn group_failed(err: CommError) -> Self {
        Self {
            code: TopologyErrorCode::GroupFailed,
            message: err.to_string(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> TopologyErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Topology errors are always fatal
    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code, self.message)
    }
}

impl std::error::Error for TopologyError {}

/// Result type for topology operations
pub type TopologyResult<T> = Result<T, TopologyError>;
