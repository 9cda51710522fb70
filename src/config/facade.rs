//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::PoppelConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file and environment.
    pub fn load() -> Result<PoppelConfig, ConfigError> {
        MergeService::load()
    }

    /// Load configuration from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<PoppelConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> PoppelConfig {
        PoppelConfig::default()
    }
}
