use agent_relay::agent::{Agent, AgentRegistry, LiquidityAgent, NftAgent, SwapAgent};
use agent_relay::types::AgentId;
use serde_json::Value;

#[tokio::test]
async fn test_unrecognized_action_is_400_for_every_agent() {
    let agents: Vec<Box<dyn Agent>> = vec![
        Box::new(SwapAgent::new(AgentId::from("swap-agent"))),
        Box::new(LiquidityAgent::new(AgentId::from("liquidity-agent"))),
        Box::new(NftAgent::new(AgentId::from("nft-agent"))),
    ];

    for agent in agents {
        let response = agent.process_instruction("teleport my bags to the moon").await;
        assert!(!response.success, "{} accepted an unknown action", agent.id());
        assert_eq!(response.error_code(), Some(400));
    }
}

#[tokio::test]
async fn test_failure_envelope_serializes_with_error_body() {
    let agent = SwapAgent::new(AgentId::from("swap-agent"));
    let response = agent.process_instruction("buy nft degods for 40 sol").await;

    let wire: Value = serde_json::to_value(&response).unwrap();
    assert_eq!(wire["success"], false);
    assert_eq!(wire["error"]["code"], 400);
    assert!(wire.get("transactionId").is_none());
}

#[tokio::test]
async fn test_swap_updates_state_and_balances() {
    let agent = SwapAgent::new(AgentId::from("swap-agent"));
    let response = agent.process_instruction("swap 2 SOL for USDC").await;
    assert!(response.success, "{:?}", response.error);

    let state = agent.state().await;
    assert_eq!(state.instructions_processed, 1);
    assert_eq!(state.transactions_executed, 1);
    assert_eq!(state.last_transaction, response.transaction_id);
    assert!((agent.balance("SOL") - 8.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_liquidity_round_trip_closes_position() {
    let agent = LiquidityAgent::new(AgentId::from("liquidity-agent"));
    let added = agent
        .process_instruction("add liquidity 1 SOL and 150 USDC")
        .await;
    assert!(added.success, "{:?}", added.error);
    assert_eq!(agent.positions().len(), 1);

    let removed = agent.process_instruction("remove liquidity").await;
    assert!(removed.success, "{:?}", removed.error);
    assert!(agent.positions().is_empty());
}

#[tokio::test]
async fn test_registry_routes_instructions_by_capability() {
    let registry = AgentRegistry::with_default_agents();
    let traders = registry.find_by_capability("NFT_TRADING");
    assert_eq!(traders.len(), 1);

    let response = traders[0].process_instruction("buy a mad_lads nft").await;
    assert!(response.success, "{:?}", response.error);
    assert!(response.transaction_id.is_some());
}
