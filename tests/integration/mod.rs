//! Integration tests for agent routing and instruction dispatch

mod agent_dispatch;
mod config_layering;
mod context_routing;
