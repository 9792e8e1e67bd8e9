//! Transport seam: delivers a routed request to a context.

use super::definition::ContextDefinition;
use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Sends a request payload to a context and returns its reply payload.
#[async_trait]
pub trait TransportClient: Send + Sync {
    async fn send(&self, context: &ContextDefinition, request: &Value) -> Result<Value, ApiError>;
}

/// In-process stand-in for a real network call. Echoes the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedTransport;

#[async_trait]
impl TransportClient for SimulatedTransport {
    async fn send(&self, context: &ContextDefinition, request: &Value) -> Result<Value, ApiError> {
        Ok(json!({
            "simulated": true,
            "context": context.name,
            "endpoint": context.endpoint,
            "request": request,
        }))
    }
}

/// POSTs the request as JSON to the context's endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransportClient for HttpTransport {
    async fn send(&self, context: &ContextDefinition, request: &Value) -> Result<Value, ApiError> {
        let transport_error = |message: String| ApiError::Transport {
            context_id: context.id.clone(),
            message,
        };

        let endpoint = context
            .endpoint
            .as_deref()
            .ok_or_else(|| transport_error("Context has no endpoint".to_string()))?;

        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport_error(format!("Endpoint returned {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| transport_error(format!("Invalid JSON response: {}", e)))
    }
}
