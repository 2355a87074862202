//! CloudGate engine, areas, and MCP server
//!
//! The crate is organized around one immutable command registry:
//!
//! - `engine`: the surface-agnostic core (operation tree, option fragments,
//!   dual-input binder, invoker, response envelope, exposure router).
//! - `services`: narrow collaborator traits plus the in-memory catalog the
//!   binary and tests run against.
//! - `tools`: the shipped area registrars (`cache`, `vault`, `cluster`, and
//!   the hidden introspection area).
//! - `mcp`: the rmcp server handler and its stdio/HTTP transports.

pub mod engine;
pub mod mcp;
pub mod services;
pub mod tools;

use std::sync::Arc;

use engine::context::ToolContext;
use engine::errors::StartupError;
use engine::registry::CommandRegistry;
use services::ServiceResolver;

/// Crate version, reported in the MCP server implementation info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the registry with every shipped area registered
pub fn build_default_registry() -> Result<CommandRegistry, StartupError> {
    CommandRegistry::build(&[tools::register_default_areas])
}

/// Context wired to the in-memory sample catalog
pub fn default_context(registry: Arc<CommandRegistry>) -> ToolContext {
    ToolContext::new(registry, Arc::new(ServiceResolver::sample()))
}
