//! Shared fixtures for engine tests

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::engine::bind::BoundParameters;
use crate::engine::context::ToolContext;
use crate::engine::errors::{CollaboratorError, StartupError};
use crate::engine::group::OperationGroup;
use crate::engine::operation::CommandOperation;
use crate::engine::option::{effective_options, OptionSchema};
use crate::engine::registry::{CommandRegistry, RegisteredOperation};
use crate::services::ServiceResolver;

/// Configurable leaf used across engine tests
pub(crate) struct StubOperation {
    name: &'static str,
    pub options: Vec<OptionSchema>,
    hidden: bool,
    result: Option<Value>,
    failure: Option<CollaboratorError>,
    classify_not_found: bool,
}

impl StubOperation {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            options: Vec::new(),
            hidden: false,
            result: None,
            failure: None,
            classify_not_found: false,
        }
    }

    pub fn with_options(mut self, options: Vec<OptionSchema>) -> Self {
        self.options = options;
        self
    }

    pub fn returning(mut self, value: Value) -> Self {
        self.result = Some(value);
        self
    }

    pub fn failing(mut self, error: CollaboratorError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn classifying_not_found(mut self) -> Self {
        self.classify_not_found = true;
        self
    }
}

#[async_trait]
impl CommandOperation for StubOperation {
    fn name(&self) -> &'static str {
        self.name
    }

    fn title(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "stub operation"
    }

    fn options(&self) -> Vec<OptionSchema> {
        self.options.clone()
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    async fn execute(
        &self,
        _params: &BoundParameters,
        _context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        Ok(self.result.clone())
    }

    fn classify_error(&self, error: &CollaboratorError) -> Option<(u16, String)> {
        if self.classify_not_found {
            if let CollaboratorError::NotFound { .. } = error {
                return Some((404, error.to_string()));
            }
        }
        None
    }
}

/// A single-segment registered operation over the given options
pub(crate) fn registered_with(options: Vec<OptionSchema>) -> RegisteredOperation {
    let stub = StubOperation::named("test").with_options(options);
    RegisteredOperation {
        path: vec!["test".to_string()],
        options: effective_options(&[], &stub.options),
        hidden: false,
        operation: Arc::new(stub),
    }
}

fn sample_area(root: &mut OperationGroup) -> Result<(), StartupError> {
    let mut cache = OperationGroup::new("cache", "Cache instance operations");
    cache.push_operation(
        StubOperation::named("list")
            .with_options(vec![OptionSchema::string("subscription", "Subscription").required()])
            .returning(json!([{"name": "redis-a"}])),
    )?;
    root.push_group(cache)?;

    let mut vault = OperationGroup::new("vault", "Vault operations");
    let mut secret = OperationGroup::new("secret", "Secret operations");
    secret.push_operation(StubOperation::named("list").returning(json!([])))?;
    secret.push_operation(StubOperation::named("get").returning(json!({"value": "s"})))?;
    vault.push_group(secret)?;
    root.push_group(vault)?;

    let mut internal = OperationGroup::new("internal", "Internal plumbing").hidden();
    internal.push_operation(StubOperation::named("dump").returning(json!({"ok": true})))?;
    root.push_group(internal)?;
    Ok(())
}

/// A small three-area registry with one hidden subtree
pub(crate) fn sample_registry() -> Arc<CommandRegistry> {
    Arc::new(CommandRegistry::build(&[sample_area]).unwrap())
}

/// Context over an empty registry and no wired services
pub(crate) fn test_context() -> ToolContext {
    let registry = Arc::new(CommandRegistry::build(&[]).unwrap());
    test_context_with(registry)
}

/// Context over the given registry and no wired services
pub(crate) fn test_context_with(registry: Arc<CommandRegistry>) -> ToolContext {
    ToolContext::new(registry, Arc::new(ServiceResolver::new()))
}
