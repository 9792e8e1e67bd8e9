//! Uniform response envelope produced by every agent.

use crate::error::{ApiError, CODE_INTERNAL_ERROR, CODE_UNSUPPORTED_ACTION};
use crate::types::TransactionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

/// Agent response envelope.
///
/// `success == false` always carries an `error`; constructors enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl AgentResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            transaction_id: None,
            error: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_transaction(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: message.clone(),
            data: None,
            transaction_id: None,
            error: Some(ErrorBody { code, message }),
        }
    }

    /// 400: the parsed action is not one this agent handles.
    pub fn unsupported(action: &str) -> Self {
        Self::failure(
            CODE_UNSUPPORTED_ACTION,
            format!("Unsupported action: {}", action),
        )
    }

    /// 500: a failure raised while parsing or handling.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::failure(CODE_INTERNAL_ERROR, message)
    }

    pub fn error_code(&self) -> Option<u16> {
        self.error.as_ref().map(|e| e.code)
    }
}

impl From<ApiError> for AgentResponse {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::UnsupportedAction(action) => Self::unsupported(&action),
            other => Self::failure(other.code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_always_has_error() {
        let resp = AgentResponse::unsupported("teleport");
        assert!(!resp.success);
        assert_eq!(resp.error_code(), Some(400));

        let resp = AgentResponse::internal_error("boom");
        assert!(!resp.success);
        assert_eq!(resp.error_code(), Some(500));
        assert_eq!(resp.error.unwrap().message, "boom");
    }

    #[test]
    fn test_from_api_error() {
        let resp: AgentResponse = ApiError::UnsupportedAction("fly".to_string()).into();
        assert_eq!(resp.error_code(), Some(400));
        let resp: AgentResponse = ApiError::UnknownAsset("XYZ".to_string()).into();
        assert_eq!(resp.error_code(), Some(500));
    }

    #[test]
    fn test_envelope_wire_shape() {
        let resp = AgentResponse::success("ok")
            .with_data(json!({"amount": 1}))
            .with_transaction(TransactionId::from_hash(&[1u8; 32]));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("transactionId").is_some());
        assert!(value.get("error").is_none());

        let failed = serde_json::to_value(AgentResponse::unsupported("x")).unwrap();
        assert_eq!(failed["error"]["code"], 400);
        assert!(failed.get("data").is_none());
    }
}
