//! Error taxonomy shared by the router, agents and tooling.

use crate::types::{AgentId, ContextId};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Envelope code for an action the agent does not recognize.
pub const CODE_UNSUPPORTED_ACTION: u16 = 400;

/// Envelope code for any failure raised while parsing or handling.
pub const CODE_INTERNAL_ERROR: u16 = 500;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Directory could not be listed or a context file could not be read or parsed.
    #[error("Failed to load context from {}: {reason}", path.display())]
    LoadFailure { path: PathBuf, reason: String },

    #[error("Permission denied: agent {agent_id} may not access context {context_id}")]
    PermissionDenied {
        agent_id: AgentId,
        context_id: ContextId,
    },

    #[error("Context not found: {0}")]
    ContextNotFound(ContextId),

    #[error("Invalid context id '{id}': {reason}")]
    InvalidContextId { id: String, reason: String },

    #[error("Invalid context type '{0}' (must be one of dex, nft_marketplace, oracle, governance, social, identity, storage)")]
    InvalidContextType(String),

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Insufficient {token} balance: need {required}, have {available}")]
    InsufficientBalance {
        token: String,
        required: f64,
        available: f64,
    },

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Transport error for context {context_id}: {message}")]
    Transport {
        context_id: ContextId,
        message: String,
    },

    #[error("Request to context {context_id} timed out after {timeout:?}")]
    Timeout {
        context_id: ContextId,
        timeout: Duration,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ApiError {
    /// Stable envelope code for this error.
    ///
    /// Only an unrecognized action is user-correctable (400); every other
    /// failure surfaced through an agent envelope is a processing failure (500).
    pub fn code(&self) -> u16 {
        match self {
            ApiError::UnsupportedAction(_) => CODE_UNSUPPORTED_ACTION,
            _ => CODE_INTERNAL_ERROR,
        }
    }

    pub(crate) fn load_failure(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ApiError::LoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
