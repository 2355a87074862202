//! Shared context handed to every operation execution

use std::sync::Arc;

use cloudgate_common::ResourceCache;

use crate::engine::registry::CommandRegistry;
use crate::services::ServiceResolver;

/// Dependencies an operation may reach during execution.
///
/// Collaborators are resolved through explicit typed accessors on the
/// resolver, never a global lookup, so a test can wire exactly the services
/// it exercises and an unwired service fails loudly.
#[derive(Clone)]
pub struct ToolContext {
    /// Typed accessors for the collaborator services
    pub services: Arc<ServiceResolver>,
    /// The built registry, for introspection operations
    pub registry: Arc<CommandRegistry>,
    /// Process-wide collaborator lookup cache
    pub cache: Arc<ResourceCache>,
}

impl ToolContext {
    /// Context with a fresh cache
    pub fn new(registry: Arc<CommandRegistry>, services: Arc<ServiceResolver>) -> Self {
        Self {
            services,
            registry,
            cache: Arc::new(ResourceCache::new()),
        }
    }

    /// Context sharing an existing cache
    pub fn with_cache(
        registry: Arc<CommandRegistry>,
        services: Arc<ServiceResolver>,
        cache: Arc<ResourceCache>,
    ) -> Self {
        Self {
            services,
            registry,
            cache,
        }
    }
}
