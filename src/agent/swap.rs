//! Token swap agent.

use super::base::AgentCore;
use super::contract::{Agent, AgentState, Transaction, TransactionKind};
use super::dispatch::dispatch;
use super::parser::{actions, ParsedInstruction};
use super::pricing::{quote_swap, token_price_usd, DEFAULT_SLIPPAGE};
use super::response::AgentResponse;
use crate::error::ApiError;
use crate::types::{AgentId, TransactionId};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::BTreeMap;

const CAPABILITIES: &[&str] = &["token_swaps", "price_quotes", "balance_queries"];

/// Quotes and executes simulated token swaps against a local wallet.
pub struct SwapAgent {
    core: AgentCore,
    balances: Mutex<BTreeMap<String, f64>>,
}

impl SwapAgent {
    /// Agent with a starting wallet of 10 SOL and 1000 USDC.
    pub fn new(id: AgentId) -> Self {
        Self::with_balances(id, [("SOL", 10.0), ("USDC", 1000.0)])
    }

    pub fn with_balances<I, S>(id: AgentId, balances: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        Self {
            core: AgentCore::new(
                id,
                "Swap Agent",
                "Swaps tokens and answers price and balance questions",
                CAPABILITIES,
            ),
            balances: Mutex::new(
                balances
                    .into_iter()
                    .map(|(token, amount)| (token.as_ref().to_uppercase(), amount))
                    .collect(),
            ),
        }
    }

    pub fn balance(&self, token: &str) -> f64 {
        self.balances
            .lock()
            .get(&token.to_uppercase())
            .copied()
            .unwrap_or(0.0)
    }

    fn handle_swap(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        let input = parsed.require_str("input_token")?;
        let output = parsed.require_str("output_token")?;
        let amount = parsed.require_f64("amount")?;
        let slippage = parsed.param_f64("slippage").unwrap_or(DEFAULT_SLIPPAGE);
        let quote = quote_swap(input, output, amount, slippage)?;

        let mut balances = self.balances.lock();
        let available = balances.get(&quote.input_token).copied().unwrap_or(0.0);
        if available < quote.input_amount {
            return Err(ApiError::InsufficientBalance {
                token: quote.input_token.clone(),
                required: quote.input_amount,
                available,
            });
        }

        let transaction = Transaction::new(TransactionKind::Swap)
            .with("input_token", quote.input_token.clone())
            .with("output_token", quote.output_token.clone())
            .with("input_amount", quote.input_amount)
            .with("minimum_output", quote.minimum_output);
        let transaction_id = self.core.execute(&transaction)?;

        *balances.entry(quote.input_token.clone()).or_insert(0.0) -= quote.input_amount;
        *balances.entry(quote.output_token.clone()).or_insert(0.0) += quote.output_amount;

        Ok(AgentResponse::success(format!(
            "Swapped {} {} for {:.6} {}",
            quote.input_amount, quote.input_token, quote.output_amount, quote.output_token
        ))
        .with_data(json!({
            "inputToken": quote.input_token,
            "outputToken": quote.output_token,
            "inputAmount": quote.input_amount,
            "outputAmount": quote.output_amount,
            "minimumOutput": quote.minimum_output,
            "fee": quote.fee,
            "slippage": slippage,
        }))
        .with_transaction(transaction_id))
    }

    fn handle_price(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        let token = parsed.require_str("token")?;
        let price = token_price_usd(token)?;
        Ok(
            AgentResponse::success(format!("{} is trading at ${}", token, price))
                .with_data(json!({ "token": token, "priceUsd": price })),
        )
    }

    fn handle_balance(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        match parsed.param_str("token") {
            Some(token) => {
                let amount = self.balance(token);
                Ok(AgentResponse::success(format!("Balance: {} {}", amount, token))
                    .with_data(json!({ "token": token, "amount": amount })))
            }
            None => {
                let balances = self.balances.lock().clone();
                Ok(AgentResponse::success(format!("{} token balances", balances.len()))
                    .with_data(json!({ "balances": balances })))
            }
        }
    }
}

#[async_trait]
impl Agent for SwapAgent {
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
                actions::SWAP => self.handle_swap(&parsed),
                actions::GET_PRICE => self.handle_price(&parsed),
                actions::GET_BALANCE => self.handle_balance(&parsed),
                other => Err(ApiError::UnsupportedAction(other.to_string())),
            }
        })
        .await
    }

    async fn execute_transaction(&self, transaction: Transaction) -> Result<TransactionId, ApiError> {
        self.core.execute(&transaction)
    }

    async fn state(&self) -> AgentState {
        let balances = self.balances.lock().clone();
        self.core.snapshot(json!({ "balances": balances }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> SwapAgent {
        SwapAgent::new(AgentId::from("swap-agent"))
    }

    #[tokio::test]
    async fn test_swap_updates_balances() {
        let agent = agent();
        let resp = agent.process_instruction("swap 2 SOL for USDC").await;
        assert!(resp.success, "{:?}", resp.error);
        assert!(resp.transaction_id.is_some());
        assert_eq!(agent.balance("SOL"), 8.0);
        assert!((agent.balance("USDC") - (1000.0 + 299.1)).abs() < 1e-6);

        let state = agent.state().await;
        assert_eq!(state.instructions_processed, 1);
        assert_eq!(state.transactions_executed, 1);
        assert_eq!(state.last_transaction, resp.transaction_id);
    }

    #[tokio::test]
    async fn test_swap_insufficient_balance_is_500() {
        let agent = agent();
        let resp = agent.process_instruction("swap 50 SOL for USDC").await;
        assert!(!resp.success);
        assert_eq!(resp.error_code(), Some(500));
        assert_eq!(agent.balance("SOL"), 10.0);
    }

    #[tokio::test]
    async fn test_swap_unknown_token_is_500() {
        let resp = agent().process_instruction("swap 1 SOL for DOGE").await;
        assert_eq!(resp.error_code(), Some(500));
        assert!(resp.message.contains("DOGE"));
    }

    #[tokio::test]
    async fn test_price_and_balance() {
        let agent = agent();
        let price = agent.process_instruction("price of SOL").await;
        assert!(price.success);
        assert_eq!(price.data.unwrap()["priceUsd"], 150.0);

        let balance = agent.process_instruction("how much USDC do I have").await;
        assert!(balance.success);
        assert_eq!(balance.data.unwrap()["amount"], 1000.0);
    }

    #[tokio::test]
    async fn test_nft_instruction_is_unsupported() {
        let resp = agent().process_instruction("buy nft degods").await;
        assert!(!resp.success);
        assert_eq!(resp.error_code(), Some(400));
    }
}
