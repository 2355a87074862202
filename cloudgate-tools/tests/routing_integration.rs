//! End-to-end routing over the full shipped registry

use std::sync::Arc;

use cloudgate_tools::engine::bind::Binder;
use cloudgate_tools::engine::exposure::{
    ExposureMode, ExposureRouter, PROXY_TOOL_NAME, SELECTOR_KEY,
};
use cloudgate_tools::engine::invoke::{invoke, InvocationInput};
use cloudgate_tools::{build_default_registry, default_context};
use serde_json::json;

fn router(mode: ExposureMode) -> ExposureRouter {
    ExposureRouter::new(Arc::new(build_default_registry().unwrap()), mode)
}

#[test]
fn every_advertised_name_round_trips_through_resolve() {
    let per_op = router(ExposureMode::PerOperation);
    for tool in per_op.list_tools() {
        let resolved = per_op.resolve(&tool.advertised_name, None).unwrap();
        assert_eq!(resolved.advertised_name(), tool.advertised_name);
    }
}

#[tokio::test]
async fn per_group_selector_reaches_nested_operations() {
    let per_group = router(ExposureMode::PerGroup);
    let ctx = default_context(per_group.registry().clone());

    let args = json!({
        SELECTOR_KEY: "secret get",
        "subscription": "sub-1",
        "vault": "kv-prod",
        "name": "api-key",
    });
    let envelope = per_group
        .dispatch("vault", args.as_object().unwrap().clone(), &ctx)
        .await;
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.results.unwrap()["value"], "s3cr3t-api");
}

#[tokio::test]
async fn proxy_and_cli_surfaces_agree() {
    let proxy = router(ExposureMode::SingleProxy);
    let registry = proxy.registry().clone();
    let ctx = default_context(registry.clone());

    let mut args = json!({
        "subscription": "sub-1",
        "resource-group": "rg-staging",
    })
    .as_object()
    .unwrap()
    .clone();
    args.insert(SELECTOR_KEY.to_string(), json!("cluster list"));
    let via_proxy = proxy.dispatch(PROXY_TOOL_NAME, args, &ctx).await;

    let op = registry.resolve("cluster list").unwrap();
    let tokens: Vec<String> = [
        "--subscription",
        "sub-1",
        "--resource-group",
        "rg-staging",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let via_tokens = invoke(op, InvocationInput::Tokens(&tokens), &ctx).await;

    assert_eq!(via_proxy.status, via_tokens.status);
    assert_eq!(via_proxy.results, via_tokens.results);
    assert_eq!(via_tokens.results.as_ref().unwrap()[0]["name"], "aks-staging");
}

#[tokio::test]
async fn hidden_introspection_is_unlisted_but_reachable() {
    let proxy = router(ExposureMode::SingleProxy);
    let ctx = default_context(proxy.registry().clone());

    let per_op = router(ExposureMode::PerOperation);
    assert!(!per_op
        .list_tools()
        .iter()
        .any(|tool| tool.advertised_name.starts_with("tools")));

    let mut args = serde_json::Map::new();
    args.insert(SELECTOR_KEY.to_string(), json!("tools list"));
    let envelope = proxy.dispatch(PROXY_TOOL_NAME, args, &ctx).await;
    assert_eq!(envelope.status, 200);
    assert!(envelope.results.is_some());
}

#[tokio::test]
async fn missing_required_reports_every_name_across_surfaces() {
    let proxy = router(ExposureMode::SingleProxy);
    let ctx = default_context(proxy.registry().clone());

    let mut args = serde_json::Map::new();
    args.insert(SELECTOR_KEY.to_string(), json!("vault secret get"));
    let envelope = proxy.dispatch(PROXY_TOOL_NAME, args, &ctx).await;
    assert_eq!(envelope.status, 400);
    assert_eq!(
        envelope.message,
        "Missing required arguments: subscription, vault, name"
    );
}

#[test]
fn map_and_token_binding_agree_on_the_shipped_surface() {
    let registry = build_default_registry().unwrap();
    let op = registry.resolve("vault secret list").unwrap();

    let tokens: Vec<String> = [
        "--subscription",
        "sub-1",
        "--vault",
        "kv-prod",
        "--include-disabled",
        "--created-after",
        "2025-01-01T00:00:00Z",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let from_tokens = Binder::bind_tokens(op, &tokens).unwrap();

    let map = json!({
        "subscription": "sub-1",
        "vault": "kv-prod",
        "include-disabled": true,
        "created-after": "2025-01-01T00:00:00Z",
    });
    let from_map = Binder::bind_map(op, map.as_object().unwrap()).unwrap();

    assert_eq!(from_tokens, from_map);
}
