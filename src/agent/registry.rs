//! Agent registry: running agents by id.

use super::contract::Agent;
use super::liquidity::LiquidityAgent;
use super::nft::NftAgent;
use super::swap::SwapAgent;
use crate::context::capability::normalize_capability;
use crate::error::ApiError;
use crate::types::AgentId;
use std::collections::HashMap;
use std::sync::Arc;

/// Agent registry for looking up agents by id or capability.
///
/// The router does not own agent lifecycle; callers hold agents here and pass
/// them to the router per request.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `swap-agent`, `liquidity-agent` and `nft-agent`.
    pub fn with_default_agents() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(SwapAgent::new(AgentId::from("swap-agent"))));
        registry.register(Arc::new(LiquidityAgent::new(AgentId::from(
            "liquidity-agent",
        ))));
        registry.register(Arc::new(NftAgent::new(AgentId::from("nft-agent"))));
        registry
    }

    /// Register an agent, replacing any agent with the same id.
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        let id = agent.id().clone();
        if self.agents.insert(id.clone(), agent).is_some() {
            tracing::warn!(agent_id = %id, "Replacing registered agent");
        }
    }

    pub fn get(&self, agent_id: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(&AgentId::from(agent_id)).cloned()
    }

    pub fn get_or_error(&self, agent_id: &str) -> Result<Arc<dyn Agent>, ApiError> {
        self.get(agent_id)
            .ok_or_else(|| ApiError::AgentNotFound(agent_id.to_string()))
    }

    /// All agents sorted by id.
    pub fn list_all(&self) -> Vec<Arc<dyn Agent>> {
        let mut agents: Vec<_> = self.agents.values().cloned().collect();
        agents.sort_by(|a, b| a.id().cmp(b.id()));
        agents
    }

    /// Agents declaring `capability` (case-insensitive), sorted by id.
    pub fn find_by_capability(&self, capability: &str) -> Vec<Arc<dyn Agent>> {
        let wanted = normalize_capability(capability);
        self.list_all()
            .into_iter()
            .filter(|agent| {
                agent
                    .capabilities()
                    .iter()
                    .any(|c| normalize_capability(c) == wanted)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
