//! Plain-data state shared by the concrete agents.

use super::contract::{AgentState, Transaction};
use super::parser::InstructionParser;
use crate::error::ApiError;
use crate::types::{AgentId, TransactionId};
use parking_lot::Mutex;
use serde_json::Value;

#[derive(Debug, Default)]
struct Counters {
    instructions: u64,
    sequence: u64,
    last_transaction: Option<TransactionId>,
}

/// Identity, parser and transaction ledger embedded in each agent.
#[derive(Debug)]
pub struct AgentCore {
    id: AgentId,
    name: String,
    description: String,
    capabilities: Vec<String>,
    parser: InstructionParser,
    counters: Mutex<Counters>,
}

impl AgentCore {
    pub fn new(
        id: AgentId,
        name: impl Into<String>,
        description: impl Into<String>,
        capabilities: &[&str],
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            parser: InstructionParser::new(),
            counters: Mutex::new(Counters::default()),
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn capabilities(&self) -> Vec<String> {
        self.capabilities.clone()
    }

    pub fn parser(&self) -> &InstructionParser {
        &self.parser
    }

    pub fn record_instruction(&self) {
        self.counters.lock().instructions += 1;
    }

    /// Simulated execution: derives a deterministic id from the agent id,
    /// a per-agent sequence number and the transaction payload.
    pub fn execute(&self, transaction: &Transaction) -> Result<TransactionId, ApiError> {
        let payload = serde_json::to_vec(transaction)
            .map_err(|e| ApiError::Internal(format!("Failed to encode transaction: {}", e)))?;

        let mut counters = self.counters.lock();
        counters.sequence += 1;

        let mut hasher = blake3::Hasher::new();
        hasher.update(self.id.as_str().as_bytes());
        hasher.update(&counters.sequence.to_le_bytes());
        hasher.update(&payload);
        let id = TransactionId::from_hash(hasher.finalize().as_bytes());

        counters.last_transaction = Some(id.clone());
        tracing::info!(
            agent_id = %self.id,
            transaction_id = %id,
            kind = ?transaction.kind,
            "Executed simulated transaction"
        );
        Ok(id)
    }

    pub fn snapshot(&self, details: Value) -> AgentState {
        let counters = self.counters.lock();
        AgentState {
            agent_id: self.id.clone(),
            name: self.name.clone(),
            capabilities: self.capabilities.clone(),
            instructions_processed: counters.instructions,
            transactions_executed: counters.sequence,
            last_transaction: counters.last_transaction.clone(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::contract::TransactionKind;

    fn core(id: &str) -> AgentCore {
        AgentCore::new(AgentId::from(id), "Test", "test agent", &["token_swaps"])
    }

    #[test]
    fn test_transaction_ids_are_unique_per_sequence() {
        let core = core("a");
        let txn = Transaction::new(TransactionKind::Swap).with("amount", 1.0);
        let first = core.execute(&txn).unwrap();
        let second = core.execute(&txn).unwrap();
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 64);

        let state = core.snapshot(Value::Null);
        assert_eq!(state.transactions_executed, 2);
        assert_eq!(state.last_transaction, Some(second));
    }

    #[test]
    fn test_transaction_ids_are_deterministic() {
        let txn = Transaction::new(TransactionKind::NftPurchase).with("collection", "degods");
        let a = core("same").execute(&txn).unwrap();
        let b = core("same").execute(&txn).unwrap();
        assert_eq!(a, b);
        let c = core("other").execute(&txn).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_snapshot_counts_instructions() {
        let core = core("a");
        core.record_instruction();
        core.record_instruction();
        let state = core.snapshot(serde_json::json!({"k": 1}));
        assert_eq!(state.instructions_processed, 2);
        assert_eq!(state.capabilities, vec!["token_swaps".to_string()]);
        assert_eq!(state.details["k"], 1);
    }
}
