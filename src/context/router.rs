//! Context router: registry of discoverable contexts and the routing entry point.

use super::definition::{ContextDefinition, ContextType};
use super::loader::{context_files, parse_context_file};
use super::policy::{AuthorizationPolicy, GrantPolicy};
use super::transport::{SimulatedTransport, TransportClient};
use crate::agent::Agent;
use crate::error::ApiError;
use crate::types::ContextId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on a single routed request.
pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Envelope returned by a successful route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub context_id: ContextId,
    pub context: String,
    pub request: Value,
    pub response: Value,
}

/// Registry of context definitions keyed by id.
///
/// Mutation takes the write lock; queries clone out of a read lock, so the
/// router can be shared across tasks behind an `Arc`. No lock is held across
/// an await point.
pub struct ContextRouter {
    contexts: RwLock<HashMap<ContextId, ContextDefinition>>,
    policy: Arc<dyn AuthorizationPolicy>,
    transport: Arc<dyn TransportClient>,
    timeout: Duration,
}

impl ContextRouter {
    /// Empty router with the grant policy (no grants), simulated transport and default timeout.
    pub fn new() -> Self {
        Self {
            contexts: RwLock::new(HashMap::new()),
            policy: Arc::new(GrantPolicy::new()),
            transport: Arc::new(SimulatedTransport),
            timeout: DEFAULT_ROUTE_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn TransportClient>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load every recognized context file in `directory` and register it.
    ///
    /// Stops at the first failure; definitions registered before it stay registered.
    /// Returns the number of definitions loaded.
    pub fn load_contexts(&self, directory: &Path) -> Result<usize, ApiError> {
        let files = context_files(directory)?;
        let mut loaded = 0;
        for path in files {
            let definition = parse_context_file(&path)?;
            debug!(
                context_id = %definition.id,
                path = %path.display(),
                "Loaded context definition"
            );
            self.register_context(definition);
            loaded += 1;
        }
        info!(
            directory = %directory.display(),
            loaded,
            "Loaded context definitions"
        );
        Ok(loaded)
    }

    /// Insert a definition, replacing any existing one with the same id.
    pub fn register_context(&self, definition: ContextDefinition) {
        let id = definition.id.clone();
        let previous = self.contexts.write().insert(id.clone(), definition);
        if previous.is_some() {
            warn!(context_id = %id, "Overwriting existing context definition");
        }
    }

    /// Definitions whose capabilities include every requested tag (case-insensitive).
    ///
    /// An empty request matches every definition. Order is unspecified.
    pub fn find_contexts_by_capabilities<I, S>(&self, required: I) -> Vec<ContextDefinition>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let required: Vec<S> = required.into_iter().collect();
        self.contexts
            .read()
            .values()
            .filter(|def| def.capabilities.contains_all(required.iter()))
            .cloned()
            .collect()
    }

    pub fn find_contexts_by_type(&self, context_type: ContextType) -> Vec<ContextDefinition> {
        self.contexts
            .read()
            .values()
            .filter(|def| def.context_type == context_type)
            .cloned()
            .collect()
    }

    pub fn get_context(&self, id: &ContextId) -> Option<ContextDefinition> {
        self.contexts.read().get(id).cloned()
    }

    /// All definitions sorted by id.
    pub fn list_contexts(&self) -> Vec<ContextDefinition> {
        let mut all: Vec<ContextDefinition> = self.contexts.read().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn len(&self) -> usize {
        self.contexts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.read().is_empty()
    }

    /// False for unregistered ids; otherwise the policy's decision for the agent's current state.
    pub async fn check_permission(&self, agent: &dyn Agent, context_id: &ContextId) -> bool {
        match self.get_context(context_id) {
            Some(context) => self.authorize(agent, &context).await,
            None => false,
        }
    }

    /// Route a request from `agent` to the context `context_id`.
    ///
    /// Unregistered ids fail with `ContextNotFound` regardless of policy;
    /// denied agents fail with `PermissionDenied`. The transport call is
    /// bounded by the router's timeout.
    pub async fn route_request(
        &self,
        agent: &dyn Agent,
        context_id: &ContextId,
        request: Value,
    ) -> Result<RouteResponse, ApiError> {
        let context = self
            .get_context(context_id)
            .ok_or_else(|| ApiError::ContextNotFound(context_id.clone()))?;

        if !self.authorize(agent, &context).await {
            warn!(
                agent_id = %agent.id(),
                context_id = %context_id,
                "Routing denied"
            );
            return Err(ApiError::PermissionDenied {
                agent_id: agent.id().clone(),
                context_id: context_id.clone(),
            });
        }

        let response = tokio::time::timeout(self.timeout, self.transport.send(&context, &request))
            .await
            .map_err(|_| ApiError::Timeout {
                context_id: context_id.clone(),
                timeout: self.timeout,
            })??;

        info!(
            agent_id = %agent.id(),
            context_id = %context_id,
            "Routed request"
        );

        Ok(RouteResponse {
            timestamp: Utc::now(),
            success: true,
            context_id: context.id,
            context: context.name,
            request,
            response,
        })
    }

    async fn authorize(&self, agent: &dyn Agent, context: &ContextDefinition) -> bool {
        let state = agent.state().await;
        self.policy.authorize(&state, context).await
    }
}

impl Default for ContextRouter {
    fn default() -> Self {
        Self::new()
    }
}
