//! Cluster bootstrap errors

use std::fmt;

use thiserror::Error;

use crate::topology::Role;

/// Result type for cluster bootstrap
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Failure reported by one rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankFailure {
    pub rank: usize,
    pub role: Role,
    pub message: String,
}

impl fmt::Display for RankFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.role.as_str(), self.rank, self.message)
    }
}

/// Cluster bootstrap errors
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration file already exists: {0}")]
    AlreadyExists(String),

    #[error("Configuration I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected {expected} worker tables, got {actual}")]
    TableCount { expected: usize, actual: usize },

    #[error("Cluster aborted: {reason}")]
    Aborted {
        reason: String,
        failures: Vec<RankFailure>,
    },
}

impl ClusterError {
    /// Ranks that reported a failure, if the cluster aborted
    pub fn failures(&self) -> &[RankFailure] {
        match self {
            ClusterError::Aborted { failures, .. } => failures,
            _ => &[],
        }
    }
}
