//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::RelayConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the global config file (if any) and environment.
    pub fn load() -> Result<RelayConfig, ConfigError> {
        MergeService::load(None)
    }

    /// Load configuration from a specific file, with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<RelayConfig, ConfigError> {
        MergeService::load(Some(path))
    }

    /// Create default configuration.
    pub fn default() -> RelayConfig {
        RelayConfig::default()
    }
}
