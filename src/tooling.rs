//! Tooling & Integration Layer
//!
//! The `relay` command line front end.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
