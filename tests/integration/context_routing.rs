use agent_relay::agent::SwapAgent;
use agent_relay::context::{
    AllowAllPolicy, ContextDefinition, ContextRouter, ContextType, GrantPolicy,
};
use agent_relay::error::ApiError;
use agent_relay::types::{AgentId, ContextId};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn id(raw: &str) -> ContextId {
    ContextId::parse(raw).unwrap()
}

fn jupiter() -> ContextDefinition {
    ContextDefinition::new(id("jupiter-dex-v4"), "Jupiter", ContextType::Dex)
        .with_capabilities(["token_swaps", "route_optimization"])
}

fn sample_contexts_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("contexts")
}

#[test]
fn test_jupiter_capability_scenario() {
    let router = ContextRouter::new();
    router.register_context(jupiter());

    let found = router.find_contexts_by_capabilities(["token_swaps"]);
    assert_eq!(found, vec![jupiter()]);

    let found = router.find_contexts_by_capabilities(["token_swaps", "governance_voting"]);
    assert!(found.is_empty());
}

#[test]
fn test_empty_capability_query_returns_every_context() {
    let router = ContextRouter::new();
    router.register_context(jupiter());
    router.register_context(ContextDefinition::new(
        id("pyth-oracle"),
        "Pyth",
        ContextType::Oracle,
    ));

    let found = router.find_contexts_by_capabilities(Vec::<&str>::new());
    assert_eq!(found.len(), 2);
}

#[test]
fn test_capability_query_is_case_insensitive() {
    let router = ContextRouter::new();
    router.register_context(
        ContextDefinition::new(id("jupiter-dex-v4"), "Jupiter", ContextType::Dex)
            .with_capabilities(["Token_Swaps"]),
    );
    assert_eq!(router.find_contexts_by_capabilities(["token_swaps"]).len(), 1);
    assert_eq!(router.find_contexts_by_capabilities(["TOKEN_SWAPS"]).len(), 1);
}

#[test]
fn test_reregistration_keeps_second_definition() {
    let router = ContextRouter::new();
    router.register_context(jupiter());
    let replacement = ContextDefinition::new(id("jupiter-dex-v4"), "Jupiter v6", ContextType::Dex)
        .with_capabilities(["token_swaps"]);
    router.register_context(replacement.clone());

    assert_eq!(router.len(), 1);
    assert_eq!(router.find_contexts_by_type(ContextType::Dex), vec![replacement]);
}

#[tokio::test]
async fn test_route_to_unregistered_context_is_not_found_under_allow_all() {
    let router = ContextRouter::new().with_policy(Arc::new(AllowAllPolicy));
    let agent = SwapAgent::new(AgentId::from("swap-agent"));

    let err = router
        .route_request(&agent, &id("nowhere"), json!({"amount": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ContextNotFound(missing) if missing == id("nowhere")));
}

#[test]
fn test_single_file_directory_round_trip() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("jupiter.yaml"),
        r#"
id: jupiter-dex-v4
name: Jupiter
description: Swap aggregator
type: DEX
capabilities: [token_swaps, route_optimization]
endpoint: https://quote-api.jup.ag/v4
public_key: JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB
auth_required: false
"#,
    )
    .unwrap();

    let router = ContextRouter::new();
    assert_eq!(router.load_contexts(dir.path()).unwrap(), 1);

    let expected = jupiter()
        .with_description("Swap aggregator")
        .with_endpoint("https://quote-api.jup.ag/v4");
    let expected = ContextDefinition {
        public_key: Some("JUP4Fb2cqiRUcaTHdrPC8h2gNsA2ETXiPDD33WcGuJB".to_string()),
        ..expected
    };
    assert_eq!(router.find_contexts_by_type(ContextType::Dex), vec![expected]);
}

#[test]
fn test_partial_load_keeps_earlier_definitions() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("a-good.json"),
        r#"{"id": "good", "name": "Good", "type": "oracle"}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("b-bad.yaml"), "id: [unterminated").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let router = ContextRouter::new();
    let err = router.load_contexts(dir.path()).unwrap_err();
    assert!(matches!(err, ApiError::LoadFailure { ref path, .. } if path.ends_with("b-bad.yaml")));
    assert!(router.get_context(&id("good")).is_some());
    assert_eq!(router.len(), 1);
}

#[test]
fn test_unreadable_directory_is_load_failure() {
    let dir = TempDir::new().unwrap();
    let router = ContextRouter::new();
    let err = router.load_contexts(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, ApiError::LoadFailure { .. }));
    assert!(router.is_empty());
}

#[test]
fn test_bundled_contexts_load() {
    let router = ContextRouter::new();
    assert_eq!(router.load_contexts(&sample_contexts_dir()).unwrap(), 4);

    let quotes: Vec<String> = router
        .find_contexts_by_capabilities(["price_quotes"])
        .into_iter()
        .map(|c| c.id.to_string())
        .collect();
    assert_eq!(quotes.len(), 2);
    assert!(quotes.contains(&"jupiter-dex-v4".to_string()));
    assert!(quotes.contains(&"pyth-oracle".to_string()));

    let governance = router.find_contexts_by_type(ContextType::Governance);
    assert_eq!(governance.len(), 1);
    assert!(governance[0].auth_required);
}

#[tokio::test]
async fn test_grants_open_auth_required_contexts() {
    let policy = GrantPolicy::new().with_grant(AgentId::from("swap-agent"), id("realms-governance"));
    let router = ContextRouter::new().with_policy(Arc::new(policy));
    router.load_contexts(&sample_contexts_dir()).unwrap();

    let granted = SwapAgent::new(AgentId::from("swap-agent"));
    let stranger = SwapAgent::new(AgentId::from("other-agent"));
    let realms = id("realms-governance");

    assert!(router.check_permission(&granted, &realms).await);
    assert!(!router.check_permission(&stranger, &realms).await);
    assert!(router.check_permission(&stranger, &id("pyth-oracle")).await);

    let routed = router
        .route_request(&granted, &realms, json!({"vote": "yes"}))
        .await
        .unwrap();
    assert!(routed.success);
    assert_eq!(routed.context_id, realms);

    let err = router
        .route_request(&stranger, &realms, json!({"vote": "yes"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied { .. }));
}
