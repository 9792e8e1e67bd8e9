//! Core identifier types.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_CONTEXT_ID_LEN: usize = 128;

/// Validated context identifier.
///
/// Non-empty, at most 128 characters, ASCII alphanumerics plus `-`, `_` and `.`.
/// Case is preserved and significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContextId(String);

impl ContextId {
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let invalid = |reason: &str| ApiError::InvalidContextId {
            id: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("id cannot be empty"));
        }
        if raw.len() > MAX_CONTEXT_ID_LEN {
            return Err(invalid("id is longer than 128 characters"));
        }
        if let Some(c) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(invalid(&format!("character {:?} is not allowed", c)));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContextId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContextId {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContextId> for String {
    fn from(id: ContextId) -> Self {
        id.0
    }
}

/// Opaque agent identifier. The router never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Hex-encoded identifier of a simulated transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn from_hash(hash: &[u8; 32]) -> Self {
        Self(hex::encode(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_id_accepts_typical_ids() {
        for raw in ["jupiter-dex-v4", "pyth_oracle", "realms.gov", "Tensor2"] {
            let id = ContextId::parse(raw).unwrap();
            assert_eq!(id.as_str(), raw);
        }
    }

    #[test]
    fn test_context_id_rejects_bad_ids() {
        assert!(ContextId::parse("").is_err());
        assert!(ContextId::parse("jupiter dex").is_err());
        assert!(ContextId::parse("dex/v4").is_err());
        assert!(ContextId::parse(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_context_id_deserialize_validates() {
        let ok: Result<ContextId, _> = serde_json::from_str("\"magic-eden\"");
        assert!(ok.is_ok());
        let bad: Result<ContextId, _> = serde_json::from_str("\"magic eden\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_transaction_id_is_hex() {
        let id = TransactionId::from_hash(&[0xabu8; 32]);
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().starts_with("abab"));
    }
}
