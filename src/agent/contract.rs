//! Agent contract.
//!
//! Every agent exposes identity and capability metadata, turns instructions
//! into a uniform `AgentResponse`, executes (simulated) transactions and
//! reports a state snapshot. The router only ever sees agents through this trait.

use super::response::AgentResponse;
use crate::error::ApiError;
use crate::types::{AgentId, TransactionId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of a simulated on-chain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Swap,
    AddLiquidity,
    RemoveLiquidity,
    NftPurchase,
    NftSale,
    NftListing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl Transaction {
    pub fn new(kind: TransactionKind) -> Self {
        Self {
            kind,
            params: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// Point-in-time snapshot of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: AgentId,
    pub name: String,
    pub capabilities: Vec<String>,
    pub instructions_processed: u64,
    pub transactions_executed: u64,
    pub last_transaction: Option<TransactionId>,
    /// Agent-specific details (balances, positions, holdings).
    pub details: Value,
}

impl AgentState {
    pub fn new(agent_id: AgentId, name: impl Into<String>, capabilities: Vec<String>) -> Self {
        Self {
            agent_id,
            name: name.into(),
            capabilities,
            instructions_processed: 0,
            transactions_executed: 0,
            last_transaction: None,
            details: Value::Null,
        }
    }
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> &AgentId;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn capabilities(&self) -> Vec<String>;

    /// Parse and handle an instruction. Never fails: errors become failure envelopes.
    async fn process_instruction(&self, text: &str) -> AgentResponse;

    async fn execute_transaction(&self, transaction: Transaction) -> Result<TransactionId, ApiError>;

    async fn state(&self) -> AgentState;
}
