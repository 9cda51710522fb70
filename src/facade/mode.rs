//! Open mode flags for [`File::open`](super::File::open).

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Bit set of open flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpenMode(u8);

impl OpenMode {
    pub const READ: OpenMode = OpenMode(0b0_0001);
    pub const WRITE: OpenMode = OpenMode(0b0_0010);
    /// Create the root if it does not exist.
    pub const CREATE: OpenMode = OpenMode(0b0_0100);
    /// Fail if the root already exists.
    pub const EXCL: OpenMode = OpenMode(0b0_1000);
    /// Replace an existing root with an empty one.
    pub const TRUNCATE: OpenMode = OpenMode(0b1_0000);

    pub const READ_ONLY: OpenMode = Self::READ;
    pub const READ_WRITE: OpenMode = Self::READ.union(Self::WRITE);
    pub const CREATE_WRITE: OpenMode = Self::READ_WRITE.union(Self::CREATE);
    pub const OVERWRITE: OpenMode = Self::CREATE_WRITE.union(Self::TRUNCATE);

    pub const fn union(self, other: OpenMode) -> OpenMode {
        OpenMode(self.0 | other.0)
    }

    pub const fn contains(self, other: OpenMode) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_writable(self) -> bool {
        self.contains(Self::WRITE)
    }

    /// Reject combinations that cannot be honored.
    pub fn validate(self) -> Result<()> {
        if !self.contains(Self::READ) && !self.contains(Self::WRITE) {
            return Err(StoreError::InvalidMode("neither READ nor WRITE requested"));
        }
        if (self.contains(Self::CREATE) || self.contains(Self::TRUNCATE)) && !self.is_writable() {
            return Err(StoreError::InvalidMode("CREATE and TRUNCATE require WRITE"));
        }
        Ok(())
    }
}

impl BitOr for OpenMode {
    type Output = OpenMode;

    fn bitor(self, rhs: OpenMode) -> OpenMode {
        self.union(rhs)
    }
}

impl fmt::Debug for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::READ, "READ"),
            (Self::WRITE, "WRITE"),
            (Self::CREATE, "CREATE"),
            (Self::EXCL, "EXCL"),
            (Self::TRUNCATE, "TRUNCATE"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "OpenMode({})", set.join(" | "))
    }
}

/// Named open modes usable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModePreset {
    ReadOnly,
    #[default]
    ReadWrite,
    CreateWrite,
    Overwrite,
}

impl ModePreset {
    pub fn mode(self) -> OpenMode {
        match self {
            ModePreset::ReadOnly => OpenMode::READ_ONLY,
            ModePreset::ReadWrite => OpenMode::READ_WRITE,
            ModePreset::CreateWrite => OpenMode::CREATE_WRITE,
            ModePreset::Overwrite => OpenMode::OVERWRITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations() {
        assert!(OpenMode::OVERWRITE.contains(OpenMode::READ_WRITE));
        assert!(OpenMode::CREATE_WRITE.contains(OpenMode::CREATE));
        assert!(!OpenMode::READ_WRITE.contains(OpenMode::CREATE));
        assert_eq!(OpenMode::READ | OpenMode::WRITE, OpenMode::READ_WRITE);
        assert_eq!(format!("{:?}", OpenMode::READ_WRITE), "OpenMode(READ | WRITE)");
    }

    #[test]
    fn test_validate() {
        assert!(OpenMode::READ_ONLY.validate().is_ok());
        assert!(OpenMode::OVERWRITE.validate().is_ok());
        assert!((OpenMode::WRITE | OpenMode::CREATE | OpenMode::EXCL).validate().is_ok());
        assert!(matches!(
            (OpenMode::READ | OpenMode::CREATE).validate(),
            Err(StoreError::InvalidMode(_))
        ));
        assert!(matches!(
            (OpenMode::READ | OpenMode::TRUNCATE).validate(),
            Err(StoreError::InvalidMode(_))
        ));
        assert!(OpenMode::CREATE.union(OpenMode::EXCL).validate().is_err());
    }

    #[test]
    fn test_presets() {
        let preset: ModePreset = serde_json::from_str("\"create_write\"").unwrap();
        assert_eq!(preset.mode(), OpenMode::CREATE_WRITE);
        assert_eq!(ModePreset::default().mode(), OpenMode::READ_WRITE);
    }
}
