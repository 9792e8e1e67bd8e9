//! Built-in defaults seeded before any source is layered.

use crate::config::{DEFAULT_CONTEXTS_DIR, DEFAULT_ROUTE_TIMEOUT_MS};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("contexts.directory", DEFAULT_CONTEXTS_DIR)?
        .set_default("routing.timeout_ms", DEFAULT_ROUTE_TIMEOUT_MS)?
        .set_default("routing.transport", "simulated")?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")?
        .set_default("logging.color", true)
}
