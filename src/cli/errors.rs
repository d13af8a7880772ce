//! CLI-specific error types
//!
//! All CLI errors are fatal: the process exits non-zero.

use std::fmt;
use std::io;

use crate::cluster::ClusterError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Configuration file already present
    AlreadyInitialized,
    /// Cluster aborted while serving
    ClusterFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PARADB_CLI_CONFIG_ERROR",
            Self::IoError => "PARADB_CLI_IO_ERROR",
            Self::AlreadyInitialized => "PARADB_CLI_ALREADY_INITIALIZED",
            Self::ClusterFailed => "PARADB_CLI_CLUSTER_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Cluster failed
    pub fn cluster_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ClusterFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<ClusterError> for CliError {
    fn from(e: ClusterError) -> Self {
        match e {
            ClusterError::AlreadyExists(_) => {
                Self::new(CliErrorCode::AlreadyInitialized, e.to_string())
            }
            ClusterError::Aborted { .. } => Self::cluster_failed(e.to_string()),
            _ => Self::config_error(e.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
