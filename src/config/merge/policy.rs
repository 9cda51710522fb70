//! Base layer every configuration build starts from.

use crate::config::PoppelConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the serialized defaults, so every key exists before overlays apply.
pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&PoppelConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
