//! CLI Tooling
//!
//! Command-line interface over the context router and agent registry.

use crate::agent::{Agent, AgentRegistry};
use crate::config::RelayConfig;
use crate::context::{ContextDefinition, ContextRouter, ContextType};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::types::ContextId;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Relay CLI - capability-based context routing for on-chain agents
#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Discover contexts by capability and route agent requests to them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides $XDG_CONFIG_HOME/relay/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of context definition files (overrides contexts.directory)
    #[arg(long, global = true)]
    pub contexts: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold logging flags into the loaded config; flags win.
    pub fn apply_logging_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect registered contexts
    Contexts {
        #[command(subcommand)]
        command: ContextCommands,
    },
    /// Inspect available agents
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Send a natural-language instruction to an agent
    Instruct {
        /// Agent id
        #[arg(long)]
        agent: String,
        /// Instruction text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Route a request from an agent to a context
    Route {
        /// Agent id
        #[arg(long)]
        agent: String,
        /// Context id
        #[arg(long)]
        context: String,
        /// JSON request payload
        #[arg(long, default_value = "{}")]
        request: String,
    },
}

#[derive(Subcommand)]
pub enum ContextCommands {
    /// List every registered context
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Find contexts offering all of the given capabilities
    Find {
        /// Required capability (repeatable)
        #[arg(long = "capability")]
        capabilities: Vec<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List contexts of one type
    ByType {
        /// dex, nft_marketplace, oracle, governance, social, identity, storage
        context_type: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum AgentCommands {
    /// List registered agents
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Router and agents wired from configuration.
pub struct CliContext {
    router: ContextRouter,
    agents: AgentRegistry,
}

impl CliContext {
    /// Build the router from config and load contexts.
    ///
    /// An explicit `contexts_dir` must be loadable; the configured directory is
    /// skipped with a warning when it does not exist.
    pub fn new(config: RelayConfig, contexts_dir: Option<PathBuf>) -> Result<Self, ApiError> {
        let router = ContextRouter::new()
            .with_policy(Arc::new(config.routing.grant_policy()?))
            .with_transport(config.routing.transport_client())
            .with_timeout(config.routing.timeout());

        let explicit = contexts_dir.is_some();
        let directory = contexts_dir.unwrap_or(config.contexts.directory);
        if explicit || directory.exists() {
            router.load_contexts(&directory)?;
        } else {
            warn!(
                directory = %directory.display(),
                "Contexts directory not found, starting with an empty registry"
            );
        }

        Ok(Self::from_parts(router, AgentRegistry::with_default_agents()))
    }

    pub fn from_parts(router: ContextRouter, agents: AgentRegistry) -> Self {
        Self { router, agents }
    }

    pub fn router(&self) -> &ContextRouter {
        &self.router
    }

    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        debug!(command = command_name(command), "Executing command");
        match command {
            Commands::Contexts { command } => self.handle_context_command(command),
            Commands::Agents { command } => match command {
                AgentCommands::List { format } => self.handle_agent_list(format),
            },
            Commands::Instruct { agent, text } => self.handle_instruct(agent, &text.join(" ")).await,
            Commands::Route {
                agent,
                context,
                request,
            } => self.handle_route(agent, context, request).await,
        }
    }

    fn handle_context_command(&self, command: &ContextCommands) -> Result<String, ApiError> {
        match command {
            ContextCommands::List { format } => {
                format_contexts(self.router.list_contexts(), format)
            }
            ContextCommands::Find {
                capabilities,
                format,
            } => format_contexts(
                self.router.find_contexts_by_capabilities(capabilities),
                format,
            ),
            ContextCommands::ByType {
                context_type,
                format,
            } => {
                let context_type: ContextType = context_type.parse()?;
                format_contexts(self.router.find_contexts_by_type(context_type), format)
            }
        }
    }

    fn handle_agent_list(&self, format: &str) -> Result<String, ApiError> {
        let agents = self.agents.list_all();
        match format {
            "json" => {
                let list: Vec<Value> = agents
                    .iter()
                    .map(|agent| {
                        json!({
                            "id": agent.id(),
                            "name": agent.name(),
                            "description": agent.description(),
                            "capabilities": agent.capabilities(),
                        })
                    })
                    .collect();
                to_pretty_json(&json!({ "agents": list, "total": agents.len() }))
            }
            _ => Ok(format_agent_table(&agents)),
        }
    }

    async fn handle_instruct(&self, agent_id: &str, text: &str) -> Result<String, ApiError> {
        let agent = self.agents.get_or_error(agent_id)?;
        let response = agent.process_instruction(text).await;
        to_pretty_json(&response)
    }

    async fn handle_route(
        &self,
        agent_id: &str,
        context_id: &str,
        request: &str,
    ) -> Result<String, ApiError> {
        let agent = self.agents.get_or_error(agent_id)?;
        let context_id = ContextId::parse(context_id)?;
        let request: Value = serde_json::from_str(request)
            .map_err(|e| ApiError::InvalidRequest(format!("Request is not valid JSON: {}", e)))?;
        let routed = self
            .router
            .route_request(agent.as_ref(), &context_id, request)
            .await?;
        to_pretty_json(&routed)
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Contexts { command } => match command {
            ContextCommands::List { .. } => "contexts list",
            ContextCommands::Find { .. } => "contexts find",
            ContextCommands::ByType { .. } => "contexts by-type",
        },
        Commands::Agents { .. } => "agents list",
        Commands::Instruct { .. } => "instruct",
        Commands::Route { .. } => "route",
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize output: {}", e)))
}

fn format_contexts(mut contexts: Vec<ContextDefinition>, format: &str) -> Result<String, ApiError> {
    contexts.sort_by(|a, b| a.id.cmp(&b.id));
    match format {
        "json" => to_pretty_json(&contexts),
        _ => Ok(format_context_table(&contexts)),
    }
}

fn format_context_table(contexts: &[ContextDefinition]) -> String {
    if contexts.is_empty() {
        return "No contexts found.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Type", "Capabilities", "Auth"]);
    for context in contexts {
        let capabilities: Vec<&str> = context.capabilities.iter().collect();
        table.add_row(vec![
            context.id.to_string(),
            context.name.clone(),
            context.context_type.to_string(),
            capabilities.join(", "),
            if context.auth_required { "required" } else { "-" }.to_string(),
        ]);
    }
    format!("{}\n\nTotal: {} context(s)", table, contexts.len())
}

fn format_agent_table(agents: &[Arc<dyn Agent>]) -> String {
    if agents.is_empty() {
        return "No agents registered.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Capabilities"]);
    for agent in agents {
        table.add_row(vec![
            agent.id().to_string(),
            agent.name().to_string(),
            agent.capabilities().join(", "),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn contexts_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("jupiter.yaml"),
            "id: jupiter-dex-v4\nname: Jupiter\ntype: dex\ncapabilities: [token_swaps, route_optimization]\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("realms.json"),
            r#"{"id": "realms-governance", "name": "Realms", "type": "governance", "capabilities": ["voting"], "authRequired": true}"#,
        )
        .unwrap();
        dir
    }

    fn cli_context(dir: &TempDir) -> CliContext {
        CliContext::new(RelayConfig::default(), Some(dir.path().to_path_buf())).unwrap()
    }

    fn run(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("relay").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn test_contexts_list_json() {
        let dir = contexts_dir();
        let ctx = cli_context(&dir);
        let cli = run(&["contexts", "list", "--format", "json"]);
        let output = ctx.execute(&cli.command).await.unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&output).unwrap();
        let ids: Vec<&str> = parsed.iter().map(|c| c["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["jupiter-dex-v4", "realms-governance"]);
    }

    #[tokio::test]
    async fn test_contexts_find_text_table() {
        let dir = contexts_dir();
        let ctx = cli_context(&dir);
        let cli = run(&["contexts", "find", "--capability", "TOKEN_SWAPS"]);
        let output = ctx.execute(&cli.command).await.unwrap();
        assert!(output.contains("jupiter-dex-v4"));
        assert!(!output.contains("realms-governance"));
        assert!(output.contains("Total: 1 context(s)"));
    }

    #[tokio::test]
    async fn test_contexts_by_type_rejects_unknown_type() {
        let dir = contexts_dir();
        let ctx = cli_context(&dir);
        let cli = run(&["contexts", "by-type", "casino"]);
        let err = ctx.execute(&cli.command).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidContextType(raw) if raw == "casino"));
    }

    #[tokio::test]
    async fn test_instruct_prints_envelope() {
        let dir = contexts_dir();
        let ctx = cli_context(&dir);
        let cli = run(&["instruct", "--agent", "swap-agent", "swap", "1", "SOL", "for", "USDC"]);
        let output = ctx.execute(&cli.command).await.unwrap();
        let envelope: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(envelope["success"], true);
        assert!(envelope["transactionId"].is_string());
    }

    #[tokio::test]
    async fn test_route_denied_without_grant() {
        let dir = contexts_dir();
        let ctx = cli_context(&dir);
        let cli = run(&[
            "route",
            "--agent",
            "swap-agent",
            "--context",
            "realms-governance",
        ]);
        let err = ctx.execute(&cli.command).await.unwrap_err();
        assert!(matches!(err, ApiError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_route_with_grant_from_config() {
        let dir = contexts_dir();
        let mut config = RelayConfig::default();
        config.routing.grants.insert(
            "swap-agent".to_string(),
            vec!["realms-governance".to_string()],
        );
        let ctx = CliContext::new(config, Some(dir.path().to_path_buf())).unwrap();
        let cli = run(&[
            "route",
            "--agent",
            "swap-agent",
            "--context",
            "realms-governance",
            "--request",
            r#"{"proposal": 7}"#,
        ]);
        let output = ctx.execute(&cli.command).await.unwrap();
        let routed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(routed["success"], true);
        assert_eq!(routed["request"]["proposal"], 7);
    }

    #[tokio::test]
    async fn test_route_rejects_malformed_request() {
        let dir = contexts_dir();
        let ctx = cli_context(&dir);
        let cli = run(&[
            "route",
            "--agent",
            "swap-agent",
            "--context",
            "jupiter-dex-v4",
            "--request",
            "{not json",
        ]);
        let err = ctx.execute(&cli.command).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_missing_explicit_contexts_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(CliContext::new(RelayConfig::default(), Some(missing)).is_err());
    }

    #[test]
    fn test_logging_overrides() {
        let cli = run(&["--log-level", "debug", "--log-format", "json", "agents", "list"]);
        let mut logging = LoggingConfig::default();
        cli.apply_logging_overrides(&mut logging);
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, "json");
        assert_eq!(logging.output, "stderr");
    }
}
