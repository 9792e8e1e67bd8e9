//! Static price tables standing in for oracle and marketplace lookups.

use crate::error::ApiError;

/// Swap fee applied to simulated quotes (0.3%).
pub const SWAP_FEE_RATE: f64 = 0.003;

/// Slippage tolerance used when the instruction does not give one (0.5%).
pub const DEFAULT_SLIPPAGE: f64 = 0.005;

const TOKEN_PRICES_USD: &[(&str, f64)] = &[
    ("SOL", 150.0),
    ("USDC", 1.0),
    ("USDT", 1.0),
    ("BONK", 0.00002),
    ("JUP", 0.9),
    ("RAY", 2.0),
    ("ETH", 3000.0),
];

const FLOOR_PRICES_SOL: &[(&str, f64)] = &[
    ("mad_lads", 120.0),
    ("degods", 45.0),
    ("okay_bears", 12.0),
    ("claynosaurz", 20.0),
    ("tensorians", 8.0),
];

/// USD price of a token symbol (case-insensitive).
pub fn token_price_usd(symbol: &str) -> Result<f64, ApiError> {
    let symbol = symbol.to_uppercase();
    TOKEN_PRICES_USD
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, price)| *price)
        .ok_or(ApiError::UnknownAsset(symbol))
}

/// Floor price in SOL of an NFT collection (case-insensitive, `-` and `_` equivalent).
pub fn floor_price_sol(collection: &str) -> Result<f64, ApiError> {
    let key = collection.to_lowercase().replace('-', "_");
    FLOOR_PRICES_SOL
        .iter()
        .find(|(c, _)| *c == key)
        .map(|(_, price)| *price)
        .ok_or(ApiError::UnknownAsset(collection.to_string()))
}

/// Simulated swap quote.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapQuote {
    pub input_token: String,
    pub output_token: String,
    pub input_amount: f64,
    pub output_amount: f64,
    pub minimum_output: f64,
    pub fee: f64,
}

pub fn quote_swap(
    input_token: &str,
    output_token: &str,
    input_amount: f64,
    slippage: f64,
) -> Result<SwapQuote, ApiError> {
    if input_amount.is_nan() || input_amount <= 0.0 {
        return Err(ApiError::InvalidInstruction(format!(
            "Swap amount must be positive, got {}",
            input_amount
        )));
    }
    let input_price = token_price_usd(input_token)?;
    let output_price = token_price_usd(output_token)?;

    let gross = input_amount * input_price / output_price;
    let fee = gross * SWAP_FEE_RATE;
    let output_amount = gross - fee;

    Ok(SwapQuote {
        input_token: input_token.to_uppercase(),
        output_token: output_token.to_uppercase(),
        input_amount,
        output_amount,
        minimum_output: output_amount * (1.0 - slippage),
        fee,
    })
}
