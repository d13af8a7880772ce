//! Coordinator error types
//!
//! Error codes:
//! - PARADB_COMM_FAILED (FATAL)
//! - PARADB_WIRE_INVALID (FATAL)
//! - PARADB_PROTOCOL_VIOLATION (FATAL)
//! - PARADB_QUERY_UNSUPPORTED (FATAL)
//! - PARADB_COORDINATOR_CONFIG (FATAL)
//! - PARADB_FRONTEND_FAILED (ERROR)

use std::fmt;

use crate::frontend::FrontendError;
use crate::transport::CommError;
use crate::wire::WireError;

/// Severity levels for coordinator errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed but the cluster stays in lockstep
    Error,
    /// The process must abort; peers cannot continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Coordinator error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorErrorCode {
    /// A collective or point-to-point call failed
    CommFailed,
    /// A message could not be decoded
    WireInvalid,
    /// Coordinators disagree on a shape the protocol requires them to share
    ProtocolViolation,
    /// Query type has no aggregation strategy
    QueryUnsupported,
    /// Coordinator started without what its role requires
    Configuration,
    /// Operator front end failed
    FrontendFailed,
}

impl CoordinatorErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CoordinatorErrorCode::CommFailed => "PARADB_COMM_FAILED",
            CoordinatorErrorCode::WireInvalid => "PARADB_WIRE_INVALID",
            CoordinatorErrorCode::ProtocolViolation => "PARADB_PROTOCOL_VIOLATION",
            CoordinatorErrorCode::QueryUnsupported => "PARADB_QUERY_UNSUPPORTED",
            CoordinatorErrorCode::Configuration => "PARADB_COORDINATOR_CONFIG",
            CoordinatorErrorCode::FrontendFailed => "PARADB_FRONTEND_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            CoordinatorErrorCode::FrontendFailed => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for CoordinatorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Coordinator error type with full context
#[derive(Debug)]
pub struct CoordinatorError {
    code: CoordinatorErrorCode,
    message: String,
}

impl CoordinatorError {
    fn new(code: CoordinatorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Coordinators disagree on a shared shape
    pub fn protocol_violation(reason: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorCode::ProtocolViolation, reason)
    }

    /// No aggregation strategy for this query type
    pub fn query_unsupported(reason: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorCode::QueryUnsupported, reason)
    }

    /// Coordinator misconfigured for its role
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::new(CoordinatorErrorCode::Configuration, reason)
    }

    /// Returns the error code
    pub fn code(&self) -> CoordinatorErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for CoordinatorError {}

impl From<CommError> for CoordinatorError {
    fn from(e: CommError) -> Self {
        Self::new(CoordinatorErrorCode::CommFailed, e.to_string())
    }
}

impl From<WireError> for CoordinatorError {
    fn from(e: WireError) -> Self {
        Self::new(CoordinatorErrorCode::WireInvalid, e.to_string())
    }
}

impl From<FrontendError> for CoordinatorError {
    fn from(e: FrontendError) -> Self {
        Self::new(CoordinatorErrorCode::FrontendFailed, e.to_string())
    }
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CoordinatorErrorCode::CommFailed.code(), "PARADB_COMM_FAILED");
        assert_eq!(
            CoordinatorErrorCode::ProtocolViolation.code(),
            "PARADB_PROTOCOL_VIOLATION"
        );
        assert_eq!(
            CoordinatorErrorCode::QueryUnsupported.code(),
            "PARADB_QUERY_UNSUPPORTED"
        );
    }

    #[test]
    fn test_communication_failure_is_fatal() {
        let err: CoordinatorError = CommError::aborted("rank 3 aborted").into();
        assert!(err.is_fatal());
        assert_eq!(err.code(), CoordinatorErrorCode::CommFailed);
    }

    #[test]
    fn test_frontend_failure_not_fatal() {
        let err: CoordinatorError = FrontendError::Closed.into();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = CoordinatorError::protocol_violation("group counts differ");
        let display = format!("{}", err);
        assert!(display.contains("FATAL"));
        assert!(display.contains("PARADB_PROTOCOL_VIOLATION"));
        assert!(display.contains("group counts differ"));
    }
}
