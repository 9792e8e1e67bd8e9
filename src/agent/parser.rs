//! Instruction parser: free text to a structured action.
//!
//! Pure keyword and pattern matching. The same input always yields the same
//! output, so agents can be tested without a model in the loop.

use crate::error::ApiError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action tags produced by the parser.
pub mod actions {
    pub const SWAP: &str = "swap";
    pub const ADD_LIQUIDITY: &str = "add_liquidity";
    pub const REMOVE_LIQUIDITY: &str = "remove_liquidity";
    pub const BUY_NFT: &str = "buy_nft";
    pub const SELL_NFT: &str = "sell_nft";
    pub const LIST_NFT: &str = "list_nft";
    pub const GET_PRICE: &str = "get_price";
    pub const GET_BALANCE: &str = "get_balance";
    pub const UNKNOWN: &str = "unknown";
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static instruction pattern must compile")
}

static SWAP: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(?:swap|exchange|trade|convert)\s+(?:([0-9]+(?:\.[0-9]+)?)\s*)?([a-z][a-z0-9]*)\s+(?:for|to|into)\s+([a-z][a-z0-9]*)")
});
static SWAP_KEYWORD: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\b(?:swap|exchange|convert)\b"));
static ADD_LIQUIDITY: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\b(?:add|provide|deposit)\b.*\bliquidity\b"));
static REMOVE_LIQUIDITY: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\b(?:remove|withdraw)\b.*\bliquidity\b"));
static AMOUNT_TOKEN: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\b([0-9]+(?:\.[0-9]+)?)\s*([a-z][a-z0-9]*)\b"));
static PERCENT: Lazy<Regex> = Lazy::new(|| regex(r"([0-9]+(?:\.[0-9]+)?)\s*%"));
static PAIR: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\b([a-z][a-z0-9]*)\s*[/-]\s*([a-z][a-z0-9]*)\b"));
static NFT_KEYWORD: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bnfts?\b"));
static NFT_VERB: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\b(buy|purchase|sell|list)\b"));
static NFT_AFTER: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\bnfts?\s+(?:from\s+|in\s+)?(?:the\s+)?([a-z0-9_-]+)"));
static NFT_BEFORE: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(?:buy|purchase|sell|list)\s+(?:an?\s+|my\s+|the\s+)?([a-z0-9_-]+)\s+nfts?\b")
});
static FOR_PRICE: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\b(?:for|at)\s+([0-9]+(?:\.[0-9]+)?)\s*([a-z]+)?"));
static PRICE_OF: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\bprice\s+of\s+(?:the\s+)?([a-z0-9_-]+)"));
static WORTH: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\bwhat(?:'s|\s+is)\s+([a-z0-9_-]+)\s+worth\b"));
static TOKEN_PRICE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\b([a-z0-9_-]+)\s+price\b"));
static PRICE_KEYWORD: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\b(?:price|worth)\b"));
static BALANCE_KEYWORD: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bbalance\b"));
static HOW_MUCH: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\bhow\s+much\s+([a-z][a-z0-9]*)\s+do\s+i\s+have\b"));
static BALANCE_OF: Lazy<Regex> = Lazy::new(|| regex(r"(?i)\bbalance\s+of\s+([a-z][a-z0-9]*)"));
static TICKER_BALANCE: Lazy<Regex> = Lazy::new(|| regex(r"\b([A-Z][A-Z0-9]{1,9})\s+balance\b"));

const NON_COLLECTION_WORDS: &[&str] = &["for", "at", "on", "with"];
const NON_TOKEN_WORDS: &[&str] = &["floor", "the", "current", "token", "nft", "my", "a"];

/// Structured form of an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedInstruction {
    pub action: String,
    pub params: Map<String, Value>,
    /// Match quality in [0, 1].
    pub confidence: f64,
}

impl ParsedInstruction {
    fn new(action: &str, confidence: f64) -> Self {
        Self {
            action: action.to_string(),
            params: Map::new(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn param_f64(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(Value::as_f64)
    }

    /// Required string parameter, or an `InvalidInstruction` naming it.
    pub fn require_str(&self, key: &str) -> Result<&str, ApiError> {
        self.param_str(key).ok_or_else(|| {
            ApiError::InvalidInstruction(format!(
                "Missing '{}' for action '{}'",
                key, self.action
            ))
        })
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, ApiError> {
        self.param_f64(key).ok_or_else(|| {
            ApiError::InvalidInstruction(format!(
                "Missing '{}' for action '{}'",
                key, self.action
            ))
        })
    }
}

/// Pattern-matching instruction parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstructionParser;

impl InstructionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an instruction. Fails only for empty input; unmatched text
    /// yields the `unknown` action with zero confidence.
    pub fn parse(&self, text: &str) -> Result<ParsedInstruction, ApiError> {
        parse_instruction(text)
    }
}

pub fn parse_instruction(text: &str) -> Result<ParsedInstruction, ApiError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::InvalidInstruction(
            "Instruction is empty".to_string(),
        ));
    }

    if ADD_LIQUIDITY.is_match(text) {
        return parse_add_liquidity(text);
    }
    if REMOVE_LIQUIDITY.is_match(text) {
        return parse_remove_liquidity(text);
    }
    if NFT_KEYWORD.is_match(text) {
        if let Some(parsed) = parse_nft_trade(text)? {
            return Ok(parsed);
        }
    }
    if let Some(caps) = SWAP.captures(text) {
        return parse_swap(&caps);
    }
    if SWAP_KEYWORD.is_match(text) {
        return Ok(ParsedInstruction::new(actions::SWAP, 0.3));
    }
    if let Some(parsed) = parse_price(text) {
        return Ok(parsed);
    }
    if let Some(parsed) = parse_balance(text) {
        return Ok(parsed);
    }

    Ok(ParsedInstruction::new(actions::UNKNOWN, 0.0).with("text", text))
}

fn amount(raw: &str) -> Result<f64, ApiError> {
    raw.parse::<f64>()
        .map_err(|e| ApiError::InvalidInstruction(format!("Invalid amount '{}': {}", raw, e)))
}

fn token(raw: &str) -> String {
    raw.to_uppercase()
}

fn parse_swap(caps: &Captures<'_>) -> Result<ParsedInstruction, ApiError> {
    let mut parsed = ParsedInstruction::new(actions::SWAP, 0.6)
        .with("input_token", token(&caps[2]))
        .with("output_token", token(&caps[3]));
    if let Some(m) = caps.get(1) {
        parsed = parsed.with("amount", amount(m.as_str())?);
        parsed.confidence = 0.9;
    }
    Ok(parsed)
}

fn parse_add_liquidity(text: &str) -> Result<ParsedInstruction, ApiError> {
    let legs: Vec<(f64, String)> = AMOUNT_TOKEN
        .captures_iter(text)
        .map(|caps| -> Result<(f64, String), ApiError> {
            Ok((amount(&caps[1])?, token(&caps[2])))
        })
        .collect::<Result<_, ApiError>>()?;

    let mut parsed = ParsedInstruction::new(actions::ADD_LIQUIDITY, 0.6);
    if legs.len() >= 2 {
        parsed = parsed
            .with("amount_a", legs[0].0)
            .with("token_a", legs[0].1.clone())
            .with("amount_b", legs[1].0)
            .with("token_b", legs[1].1.clone());
        parsed.confidence = 0.85;
    } else if let Some(caps) = PAIR.captures(text) {
        let token_b = token(&caps[2]);
        parsed = parsed
            .with("token_a", token(&caps[1]))
            .with("token_b", token_b.clone());
        if let Some((value, leg_token)) = legs.first() {
            let key = if *leg_token == token_b { "amount_b" } else { "amount_a" };
            parsed = parsed.with(key, *value);
        }
        parsed.confidence = 0.7;
    }
    Ok(parsed)
}

fn parse_remove_liquidity(text: &str) -> Result<ParsedInstruction, ApiError> {
    let mut parsed = ParsedInstruction::new(actions::REMOVE_LIQUIDITY, 0.6);
    if let Some(caps) = PERCENT.captures(text) {
        parsed = parsed.with("percent", amount(&caps[1])?);
        parsed.confidence = 0.8;
    }
    if let Some(caps) = PAIR.captures(text) {
        let mut pair = [token(&caps[1]), token(&caps[2])];
        pair.sort();
        parsed = parsed.with("pool", pair.join("-"));
    }
    Ok(parsed)
}

fn nft_collection(text: &str) -> Option<String> {
    let after = NFT_AFTER
        .captures(text)
        .map(|caps| caps[1].to_lowercase())
        .filter(|word| !NON_COLLECTION_WORDS.contains(&word.as_str()));
    after.or_else(|| {
        NFT_BEFORE
            .captures(text)
            .map(|caps| caps[1].to_lowercase())
            .filter(|word| word != "nft" && word != "nfts")
    })
}

fn parse_nft_trade(text: &str) -> Result<Option<ParsedInstruction>, ApiError> {
    let Some(verb) = NFT_VERB.captures(text) else {
        return Ok(None);
    };
    let action = match verb[1].to_lowercase().as_str() {
        "buy" | "purchase" => actions::BUY_NFT,
        "sell" => actions::SELL_NFT,
        _ => actions::LIST_NFT,
    };

    let mut parsed = ParsedInstruction::new(action, 0.5);
    if let Some(collection) = nft_collection(text) {
        parsed = parsed.with("collection", collection);
        parsed.confidence = 0.85;
    }
    if let Some(caps) = FOR_PRICE.captures(text) {
        let currency = caps
            .get(2)
            .map(|m| token(m.as_str()))
            .unwrap_or_else(|| "SOL".to_string());
        parsed = parsed
            .with("price", amount(&caps[1])?)
            .with("currency", currency);
    }
    Ok(Some(parsed))
}

fn parse_price(text: &str) -> Option<ParsedInstruction> {
    let subject = PRICE_OF
        .captures(text)
        .or_else(|| WORTH.captures(text))
        .or_else(|| TOKEN_PRICE.captures(text))
        .map(|caps| caps[1].to_string())
        .filter(|word| !NON_TOKEN_WORDS.contains(&word.to_lowercase().as_str()));

    match subject {
        Some(subject) => {
            Some(ParsedInstruction::new(actions::GET_PRICE, 0.8).with("token", token(&subject)))
        }
        None if PRICE_KEYWORD.is_match(text) => {
            Some(ParsedInstruction::new(actions::GET_PRICE, 0.4))
        }
        None => None,
    }
}

fn parse_balance(text: &str) -> Option<ParsedInstruction> {
    if let Some(caps) = HOW_MUCH.captures(text) {
        return Some(
            ParsedInstruction::new(actions::GET_BALANCE, 0.8).with("token", token(&caps[1])),
        );
    }
    if !BALANCE_KEYWORD.is_match(text) {
        return None;
    }
    let subject = BALANCE_OF
        .captures(text)
        .or_else(|| TICKER_BALANCE.captures(text))
        .map(|caps| token(&caps[1]));
    let mut parsed = ParsedInstruction::new(actions::GET_BALANCE, 0.75);
    if let Some(subject) = subject {
        parsed = parsed.with("token", subject);
    }
    Some(parsed)
}
