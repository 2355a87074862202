//! Per-call and build-time error taxonomy for the command engine
//!
//! Binding and routing failures never escape the engine: the invoker and the
//! exposure router convert them into a well-formed [`ResponseEnvelope`]
//! before anything crosses a process boundary. Collaborator errors are
//! treated opaquely and mapped through the owning operation's classifier.
//! Startup errors abort registry construction and are never surfaced on a
//! per-call basis.
//!
//! [`ResponseEnvelope`]: crate::engine::envelope::ResponseEnvelope

use cloudgate_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Failure to bind raw input to an operation's schema set
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindingFailure {
    /// One or more required options were not supplied. Every missing name is
    /// collected so the caller sees the complete deficiency in one round trip.
    #[error("Missing required arguments: {}", missing.join(", "))]
    MissingRequired {
        /// Names of all required options that were absent
        missing: Vec<String>,
    },

    /// The input could not be parsed against the operation's schema
    /// (unknown flag, malformed value, wrong token shape)
    #[error("{message}")]
    InvalidArguments {
        /// Parser diagnostic describing the problem
        message: String,
    },
}

impl Severity for BindingFailure {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

/// Failure to resolve an inbound tool call to an operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoutingError {
    /// The advertised tool name has no match under the active exposure mode
    #[error("Unknown tool: {name}")]
    UnknownTool {
        /// The advertised name the caller supplied
        name: String,
    },

    /// The leaf-path selector does not resolve under the chosen group/root
    #[error("Unknown operation path: {path}")]
    UnknownOperationPath {
        /// The selector that failed to resolve
        path: String,
    },

    /// The exposure mode requires a leaf-path selector and none was supplied
    #[error("Tool '{tool}' requires an operation path in the '{key}' argument")]
    MissingSelector {
        /// The advertised tool name
        tool: String,
        /// The reserved argument key the selector was expected under
        key: &'static str,
    },
}

impl RoutingError {
    /// Status code the routing failure maps to in a response envelope
    pub fn status(&self) -> u16 {
        404
    }
}

impl Severity for RoutingError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Error
    }
}

/// Error raised by an operation's execute step
///
/// The engine does not interpret these beyond logging; status/message mapping
/// is delegated to the operation's `classify_error` hook, defaulting to 500
/// with the error message.
#[derive(Debug, Clone, Error)]
pub enum CollaboratorError {
    /// The named service was not wired into the service resolver
    #[error("service '{service}' is not available")]
    ServiceUnavailable {
        /// Name of the missing service
        service: &'static str,
    },

    /// The requested resource does not exist in the collaborator
    #[error("{resource} not found")]
    NotFound {
        /// Description of the resource that was looked up
        resource: String,
    },

    /// The collaborator reported a failure
    #[error("{service}: {message}")]
    Service {
        /// Name of the failing service
        service: &'static str,
        /// The collaborator's diagnostic
        message: String,
    },

    /// Anything else an execute step needs to surface
    #[error("{0}")]
    Other(String),
}

impl Severity for CollaboratorError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CollaboratorError::ServiceUnavailable { .. } => ErrorSeverity::Critical,
            CollaboratorError::NotFound { .. } => ErrorSeverity::Warning,
            CollaboratorError::Service { .. } => ErrorSeverity::Error,
            CollaboratorError::Other(_) => ErrorSeverity::Error,
        }
    }
}

/// Tree-integrity failure detected while building the registry
///
/// These are fatal: the process must refuse to start rather than serve a
/// tree with ambiguous dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StartupError {
    /// Two children of the same node share a name
    #[error("duplicate name '{name}' under '{parent}'")]
    DuplicateSibling {
        /// Path of the parent node ("root" for top level)
        parent: String,
        /// The colliding child name
        name: String,
    },

    /// Two operations resolved to the same flat path
    #[error("duplicate operation path '{path}'")]
    DuplicatePath {
        /// The colliding flat path
        path: String,
    },
}

impl Severity for StartupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Critical
    }
}
