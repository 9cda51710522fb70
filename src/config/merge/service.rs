//! MergeService: orchestrates sources, applies merge policy, deserializes to PoppelConfig.

use crate::config::sources::{environment, global_file};
use crate::config::PoppelConfig;
use config::{ConfigError, File};
use std::path::Path;

use super::policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Precedence: defaults (lowest) -> global file -> environment (highest).
    pub fn load() -> Result<PoppelConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<PoppelConfig, ConfigError> {
        let builder = policy::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::ModePreset;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("poppel.toml");
        std::fs::write(
            &path,
            "[codec]\nstrict_alignment = true\n\n[store]\ndefault_mode = \"read_only\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = MergeService::load_from_file(&path).unwrap();
        assert!(config.codec.strict_alignment);
        assert_eq!(config.store.default_mode, ModePreset::ReadOnly);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(MergeService::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
    }
}
