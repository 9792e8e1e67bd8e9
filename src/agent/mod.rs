//! Agents
//!
//! Polymorphic units that turn free-text instructions into (simulated)
//! on-chain actions. Each agent parses the instruction, dispatches the parsed
//! action through a single handler table and answers with the uniform
//! `AgentResponse` envelope: 400 for actions it does not handle, 500 for any
//! failure while parsing or handling.

pub mod contract;
pub mod base;
pub mod dispatch;
pub mod liquidity;
pub mod nft;
pub mod parser;
pub mod pricing;
mod registry;
pub mod response;
pub mod swap;

pub use contract::{Agent, AgentState, Transaction, TransactionKind};
pub use liquidity::LiquidityAgent;
pub use nft::NftAgent;
pub use parser::{parse_instruction, InstructionParser, ParsedInstruction};
pub use registry::AgentRegistry;
pub use response::{AgentResponse, ErrorBody};
pub use swap::SwapAgent;
