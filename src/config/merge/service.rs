//! MergeService: orchestrates sources and deserializes to RelayConfig.

use crate::config::sources::{environment, global_file};
use crate::config::RelayConfig;
use config::ConfigError;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global or explicit file -> environment (highest).
    ///
    /// An explicit file replaces the global one and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<RelayConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = match explicit {
            Some(path) => global_file::add_explicit(builder, path)?,
            None => global_file::add_to_builder(builder)?,
        };
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
