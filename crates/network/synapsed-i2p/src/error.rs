//! Error types for the router lifecycle controller.

use crate::state::RouterState;
use std::fmt;
use thiserror::Error;

/// Type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, RouterError>;

/// Main error type for router lifecycle operations.
///
/// Only configuration, state and start failures are ever surfaced. Readiness
/// timeouts and a missing router identity are normal transient conditions of a
/// bootstrapping node and are reported through status queries instead.
#[derive(Error, Debug)]
pub enum RouterError {
    /// Malformed, missing or unusable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The engine refused to start
    #[error("Engine start failed: {0}")]
    EngineStartFailed(#[source] EngineError),

    /// The operation is not permitted in the current state
    #[error("Cannot {operation} while router is {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// State the controller was in
        state: RouterState,
    },

    /// I/O errors while preparing the data directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors reported by the embedded engine at its entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine rejected its configuration
    #[error("configuration rejected: {0}")]
    Rejected(String),

    /// The engine failed to bring up its subsystems
    #[error("startup failed: {0}")]
    Startup(String),

    /// The requested data has not been established yet
    #[error("not ready: {0}")]
    NotReady(String),

    /// Unexpected internal fault
    #[error("internal fault: {0}")]
    Internal(String),
}

impl RouterError {
    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Self::Configuration(msg.to_string())
    }

    /// Returns the severity of this error for observability purposes.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RouterError::Configuration(_) => ErrorSeverity::Critical,
            RouterError::Parse(_) => ErrorSeverity::Critical,
            RouterError::EngineStartFailed(_) => ErrorSeverity::Major,
            RouterError::Io(_) => ErrorSeverity::Major,
            RouterError::InvalidState { .. } => ErrorSeverity::Minor,
        }
    }

    /// Classifies the error for metrics without revealing details.
    pub fn classify(&self) -> ErrorClass {
        match self {
            RouterError::Configuration(_) | RouterError::Parse(_) | RouterError::Io(_) => {
                ErrorClass::ConfigError
            }
            RouterError::EngineStartFailed(_) => ErrorClass::StartFailure,
            RouterError::InvalidState { .. } => ErrorClass::InvalidState,
        }
    }

    /// Whether the caller may retry the operation after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RouterError::EngineStartFailed(_) | RouterError::Io(_))
    }
}

/// Error severity levels for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical errors that require immediate attention
    Critical,
    /// Major errors that impact functionality
    Major,
    /// Minor errors that can be recovered from
    Minor,
}

/// Error classification for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorClass {
    /// Invalid or unusable configuration
    ConfigError,
    /// Engine refused to start
    StartFailure,
    /// Operation issued in the wrong state
    InvalidState,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::ConfigError => write!(f, "config_error"),
            ErrorClass::StartFailure => write!(f, "start_failure"),
            ErrorClass::InvalidState => write!(f, "invalid_state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = RouterError::config("sam.port must be non-zero");
        assert_eq!(err.classify(), ErrorClass::ConfigError);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(!err.is_retryable());

        let err = RouterError::EngineStartFailed(EngineError::Startup("no transports".into()));
        assert_eq!(err.classify(), ErrorClass::StartFailure);
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Engine start failed: startup failed: no transports");
    }

    #[test]
    fn test_invalid_state_message() {
        let err = RouterError::InvalidState {
            operation: "start",
            state: RouterState::Uninitialized,
        };
        assert_eq!(err.to_string(), "Cannot start while router is uninitialized");
        assert_eq!(err.classify().to_string(), "invalid_state");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: RouterError = io_err.into();
        assert!(matches!(err, RouterError::Io(_)));
        assert_eq!(err.severity(), ErrorSeverity::Major);
    }
}
