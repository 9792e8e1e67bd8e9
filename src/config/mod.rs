//! Configuration
//!
//! Layered configuration for the relay: built-in defaults, an optional TOML
//! file, then `RELAY_*` environment variables (`__` separates nested keys,
//! e.g. `RELAY_ROUTING__TIMEOUT_MS=2000`).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::context::{GrantPolicy, HttpTransport, SimulatedTransport, TransportClient};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::types::{AgentId, ContextId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const DEFAULT_CONTEXTS_DIR: &str = "contexts";
pub(crate) const DEFAULT_ROUTE_TIMEOUT_MS: u64 = 5_000;

/// Top-level relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub contexts: ContextsConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_contexts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CONTEXTS_DIR)
}

/// Where context definition files are loaded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextsConfig {
    #[serde(default = "default_contexts_dir")]
    pub directory: PathBuf,
}

impl Default for ContextsConfig {
    fn default() -> Self {
        Self {
            directory: default_contexts_dir(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    DEFAULT_ROUTE_TIMEOUT_MS
}

/// Routing timeout and access grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Upper bound for one routed request, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Agent id -> context ids the agent may reach even when the context requires auth
    #[serde(default)]
    pub grants: HashMap<String, Vec<String>>,

    /// How routed requests reach a context
    #[serde(default)]
    pub transport: TransportKind,
}

/// Transport used by the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Echo requests in-process
    #[default]
    Simulated,
    /// POST requests as JSON to each context's endpoint
    Http,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            grants: HashMap::new(),
            transport: TransportKind::default(),
        }
    }
}

impl RoutingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build the grant policy, validating every context id.
    pub fn grant_policy(&self) -> Result<GrantPolicy, ApiError> {
        let mut policy = GrantPolicy::new();
        for (agent_id, contexts) in &self.grants {
            for context_id in contexts {
                policy.grant(AgentId::new(agent_id.as_str()), ContextId::parse(context_id)?);
            }
        }
        Ok(policy)
    }

    pub fn transport_client(&self) -> Arc<dyn TransportClient> {
        match self.transport {
            TransportKind::Simulated => Arc::new(SimulatedTransport),
            TransportKind::Http => Arc::new(HttpTransport::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.contexts.directory, PathBuf::from("contexts"));
        assert_eq!(config.routing.timeout(), Duration::from_secs(5));
        assert!(config.routing.grants.is_empty());
        assert_eq!(config.routing.transport, TransportKind::Simulated);
    }

    #[test]
    fn test_grant_policy_from_config() {
        let config: RoutingConfig = toml::from_str(
            r#"
timeout_ms = 250
transport = "http"
[grants]
swap-agent = ["jupiter-dex-v4", "pyth-oracle"]
"#,
        )
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(250));
        assert_eq!(config.transport, TransportKind::Http);

        let policy = config.grant_policy().unwrap();
        let agent = AgentId::from("swap-agent");
        assert!(policy.is_granted(&agent, &ContextId::parse("pyth-oracle").unwrap()));
        assert!(!policy.is_granted(&agent, &ContextId::parse("magic-eden").unwrap()));
    }

    #[test]
    fn test_grant_policy_rejects_bad_context_id() {
        let mut config = RoutingConfig::default();
        config
            .grants
            .insert("swap-agent".to_string(), vec!["not valid".to_string()]);
        assert!(matches!(
            config.grant_policy(),
            Err(ApiError::InvalidContextId { .. })
        ));
    }
}
