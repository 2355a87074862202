//! The command registration and invocation-routing engine
//!
//! Everything surface-agnostic lives here: the operation tree and its
//! registry, the option schema model with fragment inheritance, the
//! dual-input binder, the invoker with its fixed response envelope, and the
//! exposure-mode router. The CLI and MCP layers are thin adapters over these
//! types.

pub mod bind;
pub mod context;
pub mod envelope;
pub mod errors;
pub mod exposure;
pub mod group;
pub mod invoke;
pub mod operation;
pub mod option;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use bind::{Binder, BoundParameters, OptionValue};
pub use context::ToolContext;
pub use envelope::ResponseEnvelope;
pub use errors::{BindingFailure, CollaboratorError, RoutingError, StartupError};
pub use exposure::{
    ExposureMode, ExposureRouter, ToolDescriptor, PROXY_TOOL_NAME, SELECTOR_KEY,
};
pub use group::OperationGroup;
pub use invoke::{invoke, InvocationInput};
pub use operation::CommandOperation;
pub use option::{effective_options, OptionFragment, OptionKind, OptionSchema};
pub use registry::{
    AreaRegistrar, CommandRegistry, RegisteredOperation, ADVERTISED_SEPARATOR, PATH_SEPARATOR,
};
