//! Instruction dispatch shared by all agents.
//!
//! Parse, hand the parsed instruction to the agent's handler table, and turn
//! every outcome into an envelope: unknown actions become 400, returned
//! errors and panics become 500. A misbehaving handler never reaches the caller.

use super::parser::{InstructionParser, ParsedInstruction};
use super::response::AgentResponse;
use crate::error::ApiError;
use crate::types::AgentId;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, warn};

pub async fn dispatch<F, Fut>(
    agent_id: &AgentId,
    parser: &InstructionParser,
    text: &str,
    handler: F,
) -> AgentResponse
where
    F: FnOnce(ParsedInstruction) -> Fut,
    Fut: Future<Output = Result<AgentResponse, ApiError>>,
{
    let outcome = AssertUnwindSafe(async move {
        let parsed = parser.parse(text)?;
        debug!(
            agent_id = %agent_id,
            action = %parsed.action,
            confidence = parsed.confidence,
            "Parsed instruction"
        );
        handler(parsed).await
    })
    .catch_unwind()
    .await;

    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(ApiError::UnsupportedAction(action))) => {
            warn!(agent_id = %agent_id, action = %action, "Unsupported action");
            AgentResponse::unsupported(&action)
        }
        Ok(Err(err)) => {
            error!(agent_id = %agent_id, error = %err, "Instruction failed");
            AgentResponse::internal_error(err.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(agent_id = %agent_id, panic = %message, "Instruction handler panicked");
            AgentResponse::internal_error(message)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Handler panicked".to_string()
    }
}
