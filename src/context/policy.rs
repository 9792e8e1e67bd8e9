//! Authorization seam for routing agents to contexts.

use super::definition::ContextDefinition;
use crate::agent::AgentState;
use crate::types::{AgentId, ContextId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Decides whether an agent may be routed to a context.
///
/// Implementations may consult external systems (policy engines, on-chain
/// registries), so the decision is async.
#[async_trait]
pub trait AuthorizationPolicy: Send + Sync {
    async fn authorize(&self, agent: &AgentState, context: &ContextDefinition) -> bool;
}

/// Default policy: contexts without `auth_required` are open to every agent;
/// auth-required contexts only to agents holding an explicit grant.
#[derive(Debug, Clone, Default)]
pub struct GrantPolicy {
    grants: HashMap<AgentId, HashSet<ContextId>>,
}

impl GrantPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, agent_id: AgentId, context_id: ContextId) {
        self.grants.entry(agent_id).or_default().insert(context_id);
    }

    pub fn with_grant(mut self, agent_id: AgentId, context_id: ContextId) -> Self {
        self.grant(agent_id, context_id);
        self
    }

    pub fn is_granted(&self, agent_id: &AgentId, context_id: &ContextId) -> bool {
        self.grants
            .get(agent_id)
            .map(|contexts| contexts.contains(context_id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl AuthorizationPolicy for GrantPolicy {
    async fn authorize(&self, agent: &AgentState, context: &ContextDefinition) -> bool {
        if !context.auth_required {
            return true;
        }
        let granted = self.is_granted(&agent.agent_id, &context.id);
        if !granted {
            tracing::debug!(
                agent_id = %agent.agent_id,
                context_id = %context.id,
                "No grant for auth-required context"
            );
        }
        granted
    }
}

/// Grants every request. Only for tests and local simulation; must be injected explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllPolicy;

#[async_trait]
impl AuthorizationPolicy for AllowAllPolicy {
    async fn authorize(&self, _agent: &AgentState, _context: &ContextDefinition) -> bool {
        true
    }
}
