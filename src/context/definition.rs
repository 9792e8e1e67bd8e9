//! Context definition data model.

use super::capability::CapabilitySet;
use crate::error::ApiError;
use crate::types::ContextId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Classification of an external service context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContextType {
    Dex,
    NftMarketplace,
    Oracle,
    Governance,
    Social,
    Identity,
    Storage,
}

impl ContextType {
    pub const ALL: [ContextType; 7] = [
        ContextType::Dex,
        ContextType::NftMarketplace,
        ContextType::Oracle,
        ContextType::Governance,
        ContextType::Social,
        ContextType::Identity,
        ContextType::Storage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Dex => "dex",
            ContextType::NftMarketplace => "nft_marketplace",
            ContextType::Oracle => "oracle",
            ContextType::Governance => "governance",
            ContextType::Social => "social",
            ContextType::Identity => "identity",
            ContextType::Storage => "storage",
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextType {
    type Err = ApiError;

    /// Accepts `dex`, `DEX`, `nft_marketplace`, `NFT_MARKETPLACE`, `nft-marketplace`, ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ContextType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| ApiError::InvalidContextType(s.to_string()))
    }
}

impl TryFrom<String> for ContextType {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContextType> for String {
    fn from(t: ContextType) -> Self {
        t.as_str().to_string()
    }
}

/// Declaration of an external service an agent can be routed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDefinition {
    pub id: ContextId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub context_type: ContextType,
    #[serde(default)]
    pub capabilities: CapabilitySet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, alias = "public_key", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, alias = "auth_required")]
    pub auth_required: bool,
    /// Free-form field name to type map describing request payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Map<String, Value>>,
}

impl ContextDefinition {
    /// Minimal definition; remaining fields can be set directly on the struct.
    pub fn new(id: ContextId, name: impl Into<String>, context_type: ContextType) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            context_type,
            capabilities: CapabilitySet::new(),
            endpoint: None,
            public_key: None,
            auth_required: false,
            schema: None,
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.capabilities = capabilities.into_iter().collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_auth_required(mut self, auth_required: bool) -> Self {
        self.auth_required = auth_required;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_type_parse_variants() {
        assert_eq!("dex".parse::<ContextType>().unwrap(), ContextType::Dex);
        assert_eq!("DEX".parse::<ContextType>().unwrap(), ContextType::Dex);
        assert_eq!(
            "NFT_MARKETPLACE".parse::<ContextType>().unwrap(),
            ContextType::NftMarketplace
        );
        assert_eq!(
            "nft-marketplace".parse::<ContextType>().unwrap(),
            ContextType::NftMarketplace
        );
        assert!(matches!(
            "exchange".parse::<ContextType>(),
            Err(ApiError::InvalidContextType(raw)) if raw == "exchange"
        ));
    }

    #[test]
    fn test_definition_from_yaml_with_defaults() {
        let yaml = r#"
id: jupiter-dex-v4
name: Jupiter Aggregator
type: dex
capabilities: [token_swaps, route_optimization]
unknownField: ignored
"#;
        let def: ContextDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id.as_str(), "jupiter-dex-v4");
        assert_eq!(def.context_type, ContextType::Dex);
        assert!(def.capabilities.contains("Token_Swaps"));
        assert_eq!(def.endpoint, None);
        assert_eq!(def.public_key, None);
        assert!(!def.auth_required);
        assert!(def.schema.is_none());
        assert_eq!(def.description, "");
    }

    #[test]
    fn test_definition_accepts_camel_and_snake_keys() {
        let camel = r#"{"id":"pyth","name":"Pyth","type":"ORACLE","authRequired":true,"publicKey":"FsJ3"}"#;
        let snake = r#"{"id":"pyth","name":"Pyth","type":"oracle","auth_required":true,"public_key":"FsJ3"}"#;
        let a: ContextDefinition = serde_json::from_str(camel).unwrap();
        let b: ContextDefinition = serde_json::from_str(snake).unwrap();
        assert_eq!(a, b);
        assert!(a.auth_required);
        assert_eq!(a.public_key.as_deref(), Some("FsJ3"));
    }

    #[test]
    fn test_definition_equality_ignores_capability_case() {
        let declared = r#"{"id":"jupiter","name":"Jupiter","type":"dex","capabilities":["Token_Swaps"]}"#;
        let built = ContextDefinition::new(
            ContextId::parse("jupiter").unwrap(),
            "Jupiter",
            ContextType::Dex,
        )
        .with_capabilities(["token_swaps"]);
        let parsed: ContextDefinition = serde_json::from_str(declared).unwrap();
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_definition_rejects_invalid_id() {
        let json = r#"{"id":"bad id","name":"x","type":"dex"}"#;
        assert!(serde_json::from_str::<ContextDefinition>(json).is_err());
    }

    #[test]
    fn test_schema_is_free_form() {
        let yaml = r#"
id: realms
name: Realms
type: governance
schema:
  proposal_id: string
  vote:
    type: enum
    values: [yes, no]
"#;
        let def: ContextDefinition = serde_yaml::from_str(yaml).unwrap();
        let schema = def.schema.unwrap();
        assert_eq!(schema.get("proposal_id"), Some(&Value::String("string".into())));
        assert!(schema.get("vote").unwrap().is_object());
    }
}
