//! Cache instance area

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::engine::bind::BoundParameters;
use crate::engine::context::ToolContext;
use crate::engine::errors::{CollaboratorError, StartupError};
use crate::engine::group::OperationGroup;
use crate::engine::operation::CommandOperation;
use crate::engine::option::OptionFragment;
use crate::tools::{retry_fragment, scope_fragment};

/// Register the `cache` subtree
pub fn register(root: &mut OperationGroup) -> Result<(), StartupError> {
    let mut cache = OperationGroup::new("cache", "Managed cache instances");
    cache.push_operation(CacheListOperation)?;
    root.push_group(cache)
}

/// `cache list`
///
/// Instance inventories change rarely, so results are kept in the shared
/// lookup cache keyed by subscription; a provider-side change is picked up
/// by invalidating the `cache-instances` group.
pub struct CacheListOperation;

const LOOKUP_GROUP: &str = "cache-instances";

#[async_trait]
impl CommandOperation for CacheListOperation {
    fn name(&self) -> &'static str {
        "list"
    }

    fn title(&self) -> &'static str {
        "List cache instances"
    }

    fn description(&self) -> &'static str {
        "List the managed cache instances in a subscription"
    }

    fn fragments(&self) -> Vec<&'static OptionFragment> {
        vec![scope_fragment(), retry_fragment()]
    }

    async fn execute(
        &self,
        params: &BoundParameters,
        context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError> {
        let subscription = params.require_str("subscription")?;

        if let Some(cached) = context.cache.get(LOOKUP_GROUP, subscription) {
            debug!(subscription, "serving cache instance list from lookup cache");
            return Ok(Some(cached));
        }

        let instances = context
            .services
            .cache()?
            .list_instances(subscription)
            .await?;
        let results = serde_json::to_value(instances)
            .map_err(|e| CollaboratorError::Other(e.to_string()))?;
        context.cache.set(LOOKUP_GROUP, subscription, results.clone());
        Ok(Some(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::registry::CommandRegistry;
    use crate::services::ServiceResolver;
    use std::sync::Arc;

    fn context() -> ToolContext {
        let registry = Arc::new(CommandRegistry::build(&[register]).unwrap());
        ToolContext::new(registry, Arc::new(ServiceResolver::sample()))
    }

    fn bound(subscription: &str) -> BoundParameters {
        let registry = Arc::new(CommandRegistry::build(&[register]).unwrap());
        let op = registry.resolve("cache list").unwrap();
        crate::engine::bind::Binder::bind_tokens(
            op,
            &["--subscription".to_string(), subscription.to_string()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_returns_subscription_instances() {
        let ctx = context();
        let params = bound("sub-1");
        let results = CacheListOperation.execute(&params, &ctx).await.unwrap();
        let items = results.unwrap();
        assert_eq!(items.as_array().unwrap().len(), 2);
        assert_eq!(items[0]["name"], "redis-orders");
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_lookup_cache() {
        let ctx = context();
        let params = bound("sub-1");
        CacheListOperation.execute(&params, &ctx).await.unwrap();
        assert!(ctx.cache.get("cache-instances", "sub-1").is_some());

        // Unwire the service; the cached entry must still answer.
        let starved = ToolContext::with_cache(
            ctx.registry.clone(),
            Arc::new(ServiceResolver::new()),
            ctx.cache.clone(),
        );
        let results = CacheListOperation.execute(&params, &starved).await.unwrap();
        assert!(results.is_some());
    }

    #[tokio::test]
    async fn test_unwired_service_surfaces_unavailable() {
        let registry = Arc::new(CommandRegistry::build(&[register]).unwrap());
        let ctx = ToolContext::new(registry, Arc::new(ServiceResolver::new()));
        let params = bound("sub-1");
        let err = CacheListOperation.execute(&params, &ctx).await.unwrap_err();
        assert!(matches!(
            err,
            CollaboratorError::ServiceUnavailable { service: "cache" }
        ));
    }
}
