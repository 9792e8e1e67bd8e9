//! NFT trading agent.

use super::base::AgentCore;
use super::contract::{Agent, AgentState, Transaction, TransactionKind};
use super::dispatch::dispatch;
use super::parser::{actions, ParsedInstruction};
use super::pricing::floor_price_sol;
use super::response::AgentResponse;
use crate::error::ApiError;
use crate::types::{AgentId, TransactionId};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

const CAPABILITIES: &[&str] = &["nft_trading", "nft_listing", "floor_price_queries"];

#[derive(Debug, Default)]
struct Inventory {
    holdings: BTreeSet<String>,
    listings: BTreeMap<String, f64>,
}

/// Buys, sells and lists NFTs from a handful of known collections.
pub struct NftAgent {
    core: AgentCore,
    inventory: Mutex<Inventory>,
}

fn normalize_collection(collection: &str) -> String {
    collection.to_lowercase().replace('-', "_")
}

impl NftAgent {
    pub fn new(id: AgentId) -> Self {
        Self {
            core: AgentCore::new(
                id,
                "NFT Agent",
                "Trades NFTs and reports collection floor prices",
                CAPABILITIES,
            ),
            inventory: Mutex::new(Inventory::default()),
        }
    }

    pub fn holds(&self, collection: &str) -> bool {
        self.inventory
            .lock()
            .holdings
            .contains(&normalize_collection(collection))
    }

    /// Price named in the instruction, or the collection floor.
    fn trade_price(parsed: &ParsedInstruction, collection: &str) -> Result<f64, ApiError> {
        match parsed.param_f64("price") {
            Some(price) if price > 0.0 => Ok(price),
            Some(price) => Err(ApiError::InvalidInstruction(format!(
                "NFT price must be positive, got {}",
                price
            ))),
            None => floor_price_sol(collection),
        }
    }

    fn handle_buy(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        let collection = normalize_collection(parsed.require_str("collection")?);
        let floor = floor_price_sol(&collection)?;
        let price = Self::trade_price(parsed, &collection)?;

        let mut inventory = self.inventory.lock();
        let transaction = Transaction::new(TransactionKind::NftPurchase)
            .with("collection", collection.clone())
            .with("price_sol", price);
        let transaction_id = self.core.execute(&transaction)?;
        inventory.holdings.insert(collection.clone());

        Ok(
            AgentResponse::success(format!("Bought {} NFT for {} SOL", collection, price))
                .with_data(json!({ "collection": collection, "priceSol": price, "floorSol": floor }))
                .with_transaction(transaction_id),
        )
    }

    fn handle_sell(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        let collection = normalize_collection(parsed.require_str("collection")?);
        let price = Self::trade_price(parsed, &collection)?;

        let mut inventory = self.inventory.lock();
        if !inventory.holdings.contains(&collection) {
            return Err(ApiError::InvalidInstruction(format!(
                "No {} NFT held",
                collection
            )));
        }
        let transaction = Transaction::new(TransactionKind::NftSale)
            .with("collection", collection.clone())
            .with("price_sol", price);
        let transaction_id = self.core.execute(&transaction)?;
        inventory.holdings.remove(&collection);
        inventory.listings.remove(&collection);

        Ok(
            AgentResponse::success(format!("Sold {} NFT for {} SOL", collection, price))
                .with_data(json!({ "collection": collection, "priceSol": price }))
                .with_transaction(transaction_id),
        )
    }

    fn handle_list(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        let collection = normalize_collection(parsed.require_str("collection")?);
        let price = Self::trade_price(parsed, &collection)?;

        let mut inventory = self.inventory.lock();
        if !inventory.holdings.contains(&collection) {
            return Err(ApiError::InvalidInstruction(format!(
                "No {} NFT held",
                collection
            )));
        }
        let transaction = Transaction::new(TransactionKind::NftListing)
            .with("collection", collection.clone())
            .with("price_sol", price);
        let transaction_id = self.core.execute(&transaction)?;
        inventory.listings.insert(collection.clone(), price);

        Ok(
            AgentResponse::success(format!("Listed {} NFT at {} SOL", collection, price))
                .with_data(json!({ "collection": collection, "priceSol": price }))
                .with_transaction(transaction_id),
        )
    }

    fn handle_floor(&self, parsed: &ParsedInstruction) -> Result<AgentResponse, ApiError> {
        let collection = normalize_collection(parsed.require_str("token")?);
        let floor = floor_price_sol(&collection)?;
        Ok(
            AgentResponse::success(format!("{} floor is {} SOL", collection, floor))
                .with_data(json!({ "collection": collection, "floorSol": floor })),
        )
    }
}

#[async_trait]
impl Agent for NftAgent {
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
                actions::BUY_NFT => self.handle_buy(&parsed),
                actions::SELL_NFT => self.handle_sell(&parsed),
                actions::LIST_NFT => self.handle_list(&parsed),
                actions::GET_PRICE => self.handle_floor(&parsed),
                other => Err(ApiError::UnsupportedAction(other.to_string())),
            }
        })
        .await
    }

    async fn execute_transaction(&self, transaction: Transaction) -> Result<TransactionId, ApiError> {
        self.core.execute(&transaction)
    }

    async fn state(&self) -> AgentState {
        let details = {
            let inventory = self.inventory.lock();
            json!({ "holdings": inventory.holdings, "listings": inventory.listings })
        };
        self.core.snapshot(details)
    }
}
