//! Error types for CloudGate Common
//!
//! Structured error handling shared across all CloudGate crates. Per-call
//! failures (binding, routing, collaborator errors) live with the engine in
//! `cloudgate-tools`; this module carries the infrastructure errors and the
//! severity classification trait the rest of the workspace implements.

use std::io;
use thiserror::Error as ThisError;

/// Severity levels for error classification
///
/// - **Warning**: potential issue but the operation can proceed.
/// - **Error**: the operation failed but the process can continue.
/// - **Critical**: the process cannot continue and requires attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,
    /// Operation failed but system can continue
    Error,
    /// System cannot continue, requires immediate attention
    Critical,
}

/// Trait for error types that have severity levels
///
/// All CloudGate error types should implement this trait so logging levels
/// and user-facing presentation stay consistent across crates.
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

/// Result type alias for CloudGate operations
pub type Result<T> = std::result::Result<T, CloudGateError>;

/// Common error types for CloudGate infrastructure
///
/// Domain-specific errors are defined in their owning crates and converted
/// to these common types at the edges as needed.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum CloudGateError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for errors that do not fit other categories
    #[error("{message}")]
    Other {
        /// Description of what went wrong
        message: String,
    },
}

impl CloudGateError {
    /// Create an `Other` error from any displayable value
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl Severity for CloudGateError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CloudGateError::Io(_) => ErrorSeverity::Error,
            CloudGateError::Serialization(_) => ErrorSeverity::Error,
            CloudGateError::Other { .. } => ErrorSeverity::Error,
        }
    }
}
