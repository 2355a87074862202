//! Vault area: the `vault secret` nested group

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::bind::BoundParameters;
use crate::engine::context::ToolContext;
use crate::engine::errors::{CollaboratorError, StartupError};
use crate::engine::group::OperationGroup;
use crate::engine::operation::CommandOperation;
use crate::engine::option::{OptionFragment, OptionSchema};
use crate::services::SecretRecord;
use crate::tools::{retry_fragment, scope_fragment};

/// Register the `vault` subtree
pub fn register(root: &mut OperationGroup) -> Result<(), StartupError> {
    let mut secret = OperationGroup::new("secret", "Secrets within a vault");
    secret.push_operation(SecretListOperation)?;
    secret.push_operation(SecretGetOperation)?;
    secret.push_operation(SecretShowOperation)?;

    let mut vault = OperationGroup::new("vault", "Key vault operations");
    vault.push_group(secret)?;
    root.push_group(vault)
}

fn vault_option() -> OptionSchema {
    OptionSchema::string("vault", "Name of the vault").required()
}

fn to_results<T: serde::Serialize>(value: T) -> Result<Option<Value>, CollaboratorError> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(|e| CollaboratorError::Other(e.to_string()))
}

fn not_found_as_404(error: &CollaboratorError) -> Option<(u16, String)> {
    match error {
        CollaboratorError::NotFound { .. } => Some((404, error.to_string())),
        _ => None,
    }
}

/// `vault secret list`
pub struct SecretListOperation;

#[async_trait]
impl CommandOperation for SecretListOperation {
    fn name(&self) -> &'static str {
        "list"
    }

    fn title(&self) -> &'static str {
        "List secrets"
    }

    fn description(&self) -> &'static str {
        "List secret metadata in a vault; values are never included"
    }

    fn fragments(&self) -> Vec<&'static OptionFragment> {
        vec![scope_fragment(), retry_fragment()]
    }

    fn options(&self) -> Vec<OptionSchema> {
        vec![
            vault_option(),
            OptionSchema::boolean("include-disabled", "Include disabled secrets"),
            OptionSchema::datetime(
                "created-after",
                "Only secrets created at or after this RFC 3339 timestamp",
            ),
        ]
    }

    async fn execute(
        &self,
        params: &BoundParameters,
        context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError> {
        let subscription = params.require_str("subscription")?;
        let vault = params.require_str("vault")?;
        let include_disabled = params.flag("include-disabled");
        let created_after = params.get_datetime("created-after");

        let secrets: Vec<SecretRecord> = context
            .services
            .vault()?
            .list_secrets(subscription, vault)
            .await?
            .into_iter()
            .filter(|secret| include_disabled || secret.enabled)
            .filter(|secret| created_after.is_none_or(|bound| secret.created >= bound))
            .collect();
        to_results(secrets)
    }
}

/// `vault secret get`
pub struct SecretGetOperation;

#[async_trait]
impl CommandOperation for SecretGetOperation {
    fn name(&self) -> &'static str {
        "get"
    }

    fn title(&self) -> &'static str {
        "Get a secret value"
    }

    fn description(&self) -> &'static str {
        "Retrieve one secret including its value"
    }

    fn fragments(&self) -> Vec<&'static OptionFragment> {
        vec![scope_fragment(), retry_fragment()]
    }

    fn options(&self) -> Vec<OptionSchema> {
        vec![
            vault_option(),
            OptionSchema::string("name", "Name of the secret").required(),
        ]
    }

    async fn execute(
        &self,
        params: &BoundParameters,
        context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError> {
        let secret = context
            .services
            .vault()?
            .get_secret(
                params.require_str("subscription")?,
                params.require_str("vault")?,
                params.require_str("name")?,
            )
            .await?;
        to_results(secret)
    }

    fn classify_error(&self, error: &CollaboratorError) -> Option<(u16, String)> {
        not_found_as_404(error)
    }
}

/// `vault secret show`
pub struct SecretShowOperation;

#[async_trait]
impl CommandOperation for SecretShowOperation {
    fn name(&self) -> &'static str {
        "show"
    }

    fn title(&self) -> &'static str {
        "Show secret metadata"
    }

    fn description(&self) -> &'static str {
        "Show one secret's metadata without revealing its value"
    }

    fn fragments(&self) -> Vec<&'static OptionFragment> {
        vec![scope_fragment(), retry_fragment()]
    }

    fn options(&self) -> Vec<OptionSchema> {
        vec![
            vault_option(),
            OptionSchema::string("name", "Name of the secret").required(),
        ]
    }

    async fn execute(
        &self,
        params: &BoundParameters,
        context: &ToolContext,
    ) -> Result<Option<Value>, CollaboratorError> {
        let secret = context
            .services
            .vault()?
            .get_secret(
                params.require_str("subscription")?,
                params.require_str("vault")?,
                params.require_str("name")?,
            )
            .await?;
        to_results(SecretRecord {
            value: None,
            ..secret
        })
    }

    fn classify_error(&self, error: &CollaboratorError) -> Option<(u16, String)> {
        not_found_as_404(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bind::Binder;
    use crate::engine::invoke::{invoke, InvocationInput};
    use crate::engine::registry::CommandRegistry;
    use crate::services::ServiceResolver;
    use std::sync::Arc;

    fn context() -> ToolContext {
        let registry = Arc::new(CommandRegistry::build(&[register]).unwrap());
        ToolContext::new(registry, Arc::new(ServiceResolver::sample()))
    }

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_list_excludes_disabled_by_default() {
        let ctx = context();
        let op = ctx.registry.resolve("vault secret list").unwrap().clone();
        let envelope = invoke(
            &op,
            InvocationInput::Tokens(&tokens(&[
                "--subscription",
                "sub-1",
                "--vault",
                "kv-prod",
            ])),
            &ctx,
        )
        .await;
        assert_eq!(envelope.status, 200);
        let items = envelope.results.unwrap();
        assert_eq!(items.as_array().unwrap().len(), 2);
        assert!(items
            .as_array()
            .unwrap()
            .iter()
            .all(|item| item["enabled"] == true));
    }

    #[tokio::test]
    async fn test_list_created_after_filter() {
        let ctx = context();
        let op = ctx.registry.resolve("vault secret list").unwrap().clone();
        let envelope = invoke(
            &op,
            InvocationInput::Tokens(&tokens(&[
                "--subscription",
                "sub-1",
                "--vault",
                "kv-prod",
                "--include-disabled",
                "--created-after",
                "2026-01-01T00:00:00Z",
            ])),
            &ctx,
        )
        .await;
        let items = envelope.results.unwrap();
        assert_eq!(items.as_array().unwrap().len(), 1);
        assert_eq!(items[0]["name"], "api-key");
    }

    #[tokio::test]
    async fn test_get_includes_value_show_does_not() {
        let ctx = context();
        let base = [
            "--subscription",
            "sub-1",
            "--vault",
            "kv-prod",
            "--name",
            "db-password",
        ];

        let get = ctx.registry.resolve("vault secret get").unwrap().clone();
        let envelope = invoke(&get, InvocationInput::Tokens(&tokens(&base)), &ctx).await;
        assert_eq!(envelope.results.as_ref().unwrap()["value"], "s3cr3t-db");

        let show = ctx.registry.resolve("vault secret show").unwrap().clone();
        let envelope = invoke(&show, InvocationInput::Tokens(&tokens(&base)), &ctx).await;
        assert!(envelope.results.as_ref().unwrap().get("value").is_none());
    }

    #[tokio::test]
    async fn test_get_miss_is_classified_as_404() {
        let ctx = context();
        let op = ctx.registry.resolve("vault secret get").unwrap().clone();
        let envelope = invoke(
            &op,
            InvocationInput::Tokens(&tokens(&[
                "--subscription",
                "sub-1",
                "--vault",
                "kv-prod",
                "--name",
                "missing",
            ])),
            &ctx,
        )
        .await;
        assert_eq!(envelope.status, 404);
        assert_eq!(envelope.message, "secret 'missing' in vault 'kv-prod' not found");
    }

    #[test]
    fn test_effective_options_include_scope_fragment() {
        let registry = CommandRegistry::build(&[register]).unwrap();
        let op = registry.resolve("vault secret get").unwrap();
        let names: Vec<&str> = op.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "subscription",
                "tenant",
                "auth-method",
                "max-retries",
                "retry-delay",
                "vault",
                "name"
            ]
        );
        // The bound surface accepts the hidden auth option even though
        // listings never show it.
        let bound = Binder::bind_tokens(
            op,
            &tokens(&[
                "--subscription",
                "s",
                "--vault",
                "v",
                "--name",
                "n",
                "--auth-method",
                "cli",
            ]),
        )
        .unwrap();
        assert_eq!(bound.get_str("auth-method"), Some("cli"));
    }
}
