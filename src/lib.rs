//! Agent Relay: capability-based context routing for on-chain agents
//!
//! Agents turn free-text instructions into simulated on-chain actions and
//! answer with a uniform response envelope. The context router keeps a
//! registry of declared external services, finds them by capability or type,
//! and forwards agent requests to them behind an authorization policy.

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod tooling;
pub mod types;
