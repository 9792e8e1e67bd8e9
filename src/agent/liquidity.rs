//! Liquidity provision agent.

use super::base::AgentCore;
use super::contract::{Agent, AgentState, Transaction, TransactionKind};
use super::dispatch::dispatch;
use super::parser::{actions, ParsedInstruction};
use super::pricing::token_price_usd;
use super::response::AgentResponse;
use crate::error::ApiError;
use crate::types::{AgentId, TransactionId};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

const CAPABILITIES: &[&str] = &["liquidity_provision", "pool_management", "balance_queries"];

/// Simulated LP position, valued in USD at deposit time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub pool: String,
    pub lp_tokens: f64,
}

/// Adds and removes simulated liquidity, tracking LP positions per pool.
pub struct LiquidityAgent {
    core: AgentCore,
    positions: Mutex<BTreeMap<String, f64>>,
}

/// Pools are keyed by their two tokens in sorted order, so `SOL/USDC` and `USDC/SOL` match.
fn pool_key(token_a: &str, token_b: &str) -> String {
    let (a, b) = (token_a.to_uppercase(), token_b.to_uppercase());
    if a <= b {
        format!("{}-{}", a, b)
    } else {
        format!("{}-{}", b, a)
    }
}

fn normalize_pool(pool: &str) -> String {
    match pool.split_once(|c| c == '-' || c == '/') {
        Some((a, b)) => pool_key(a.trim(), b.trim()),
        None => pool.to_uppercase(),
    }
}

impl LiquidityAgent {
    pub fn new(id: AgentId) -> Self {
        Self {
            core: AgentCore::new(
                id,
                "Liquidity Agent",
                "Provides and withdraws liquidity in token pools",
                CAPABILITIES,
            ),
            positions: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn positions(&self) -> Vec<Position> {
        self.positions
            .lock()
            .iter()
            .map(|(pool, lp_tokens)| Position {
                pool: pool.clone(),
                lp_tokens: *lp_tokens,
            })
            .collect()
    }

    fn handle_add(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        let token_a = parsed.require_str("token_a")?;
        let token_b = parsed.require_str("token_b")?;
        let price_a = token_price_usd(token_a)?;
        let price_b = token_price_usd(token_b)?;
        // Single-sided deposits are balanced with an equal value of the other token.
        let (value_a, value_b) = match (parsed.param_f64("amount_a"), parsed.param_f64("amount_b")) {
            (Some(amount_a), Some(amount_b)) => (amount_a * price_a, amount_b * price_b),
            (Some(amount_a), None) => (amount_a * price_a, amount_a * price_a),
            (None, Some(amount_b)) => (amount_b * price_b, amount_b * price_b),
            (None, None) => {
                return Err(ApiError::InvalidInstruction(
                    "Missing deposit amount".to_string(),
                ))
            }
        };
        let lp_tokens = value_a + value_b;
        let pool = pool_key(token_a, token_b);

        let mut positions = self.positions.lock();
        let transaction = Transaction::new(TransactionKind::AddLiquidity)
            .with("pool", pool.clone())
            .with("value_a_usd", value_a)
            .with("value_b_usd", value_b)
            .with("value_usd", lp_tokens);
        let transaction_id = self.core.execute(&transaction)?;
        let total = positions.entry(pool.clone()).or_insert(0.0);
        *total += lp_tokens;

        Ok(AgentResponse::success(format!(
            "Added ${:.2} of liquidity to {}",
            lp_tokens, pool
        ))
        .with_data(json!({ "pool": pool, "lpTokens": lp_tokens, "positionLpTokens": *total }))
        .with_transaction(transaction_id))
    }

    fn handle_remove(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        let percent = parsed.param_f64("percent").unwrap_or(100.0);
        if percent.is_nan() || percent <= 0.0 || percent > 100.0 {
            return Err(ApiError::InvalidInstruction(format!(
                "Withdrawal percent must be in (0, 100], got {}",
                percent
            )));
        }

        let mut positions = self.positions.lock();
        let pool = match parsed.param_str("pool") {
            Some(pool) => normalize_pool(pool),
            None if positions.len() == 1 => positions.keys().next().cloned().unwrap_or_default(),
            None => {
                return Err(ApiError::InvalidInstruction(
                    "Specify which pool to withdraw from".to_string(),
                ))
            }
        };
        let held = positions.get(&pool).copied().ok_or_else(|| {
            ApiError::InvalidInstruction(format!("No liquidity position in pool {}", pool))
        })?;

        let withdrawn = held * percent / 100.0;
        let transaction = Transaction::new(TransactionKind::RemoveLiquidity)
            .with("pool", pool.clone())
            .with("lp_tokens", withdrawn);
        let transaction_id = self.core.execute(&transaction)?;

        let remaining = held - withdrawn;
        if remaining <= f64::EPSILON {
            positions.remove(&pool);
        } else {
            positions.insert(pool.clone(), remaining);
        }

        Ok(AgentResponse::success(format!(
            "Withdrew {}% of liquidity from {}",
            percent, pool
        ))
        .with_data(json!({ "pool": pool, "withdrawnLpTokens": withdrawn, "remainingLpTokens": remaining.max(0.0) }))
        .with_transaction(transaction_id))
    }

    fn handle_balance(&self) -> Result<AgentResponse, ApiError> {
        let positions = self.positions();
        Ok(
            AgentResponse::success(format!("{} liquidity positions", positions.len()))
                .with_data(json!({ "positions": positions })),
        )
    }
}

#[async_trait]
impl Agent for LiquidityAgent {
    fn id(&self) -> &AgentId {
        self.core.id()
    }

    fn name(&self) -> &str {
        self.core.name()
    }

    fn description(&self) -> &str {
        self.core.description()
    }

    fn capabilities(&self) -> Vec<String> {
        self.core.capabilities()
    }

    async fn process_instruction(&self, text: &str) -> AgentResponse {
        self.core.record_instruction();
        dispatch(self.core.id(), self.core.parser(), text, |parsed| async move {
            match parsed.action.as_str() {
                actions::ADD_LIQUIDITY => self.handle_add(&parsed),
                actions::REMOVE_LIQUIDITY => self.handle_remove(&parsed),
                actions::GET_BALANCE => self.handle_balance(),
                other => Err(ApiError::UnsupportedAction(other.to_string())),
            }
        })
        .await
    }

    async fn execute_transaction(&self, transaction: Transaction) -> Result<TransactionId, ApiError> {
        self.core.execute(&transaction)
    }

    async fn state(&self) -> AgentState {
        self.core.snapshot(json!({ "positions": self.positions() }))
    }
}
