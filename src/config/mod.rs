//! Configuration
//!
//! Layered configuration for the library and the `poppel` binary. Sources,
//! lowest precedence first: built-in defaults, the global config file
//! (`$XDG_CONFIG_HOME/poppel/config.toml`), an explicitly named file, then
//! `POPPEL_*` environment variables with `__` separating nested keys
//! (`POPPEL_CODEC__STRICT_ALIGNMENT=true`).

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::facade::ModePreset;
use crate::logging::LoggingConfig;
use crate::npy::HeaderAlignment;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoppelConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Array codec settings applied to reads made through a `File`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Reject headers whose preamble plus text is not 64-byte aligned.
    #[serde(default)]
    pub strict_alignment: bool,
}

impl CodecConfig {
    pub fn alignment(&self) -> HeaderAlignment {
        if self.strict_alignment {
            HeaderAlignment::Strict
        } else {
            HeaderAlignment::Advisory
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Mode the CLI opens stores with for mutating commands.
    #[serde(default)]
    pub default_mode: ModePreset,
}
