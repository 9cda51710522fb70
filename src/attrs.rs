//! Node attributes
//!
//! Every node may carry one JSON document. The store only hands out the
//! location of that document; its structure is entirely up to the caller.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Location of a node's attribute document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub json_file: PathBuf,
}

impl Attribute {
    pub fn new(json_file: PathBuf) -> Self {
        Self { json_file }
    }

    pub fn path(&self) -> &Path {
        &self.json_file
    }
}

/// Read the whole attribute document.
pub fn load_attr(attr: &Attribute) -> Result<Value> {
    load_attr_as(attr)
}

/// Read the attribute document into a typed value.
pub fn load_attr_as<T: DeserializeOwned>(attr: &Attribute) -> Result<T> {
    let bytes = fs::read(&attr.json_file).map_err(|e| StoreError::io(&attr.json_file, e))?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Attribute {
        path: attr.json_file.clone(),
        source,
    })
}

/// Replace the attribute document with `value`.
pub fn save_attr<T: Serialize + ?Sized>(value: &T, attr: &Attribute) -> Result<()> {
    let json = serde_json::to_vec(value).map_err(|source| StoreError::Attribute {
        path: attr.json_file.clone(),
        source,
    })?;
    fs::write(&attr.json_file, json).map_err(|e| StoreError::io(&attr.json_file, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Calibration {
        gain: f64,
        channels: Vec<String>,
    }

    #[test]
    fn test_value_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let attr = Attribute::new(temp_dir.path().join("attributes.json"));
        let value = json!({"units": "m/s", "scale": [1, 2, 3], "nested": {"ok": true}});
        save_attr(&value, &attr).unwrap();
        assert_eq!(load_attr(&attr).unwrap(), value);
    }

    #[test]
    fn test_typed_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let attr = Attribute::new(temp_dir.path().join("attributes.json"));
        let calibration = Calibration {
            gain: 0.5,
            channels: vec!["x".into(), "y".into()],
        };
        save_attr(&calibration, &attr).unwrap();
        assert_eq!(load_attr_as::<Calibration>(&attr).unwrap(), calibration);
    }

    #[test]
    fn test_invalid_json_reported_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let attr = Attribute::new(temp_dir.path().join("attributes.json"));
        fs::write(attr.path(), "{not json").unwrap();
        match load_attr(&attr) {
            Err(StoreError::Attribute { path, .. }) => assert_eq!(path, attr.json_file),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let attr = Attribute::new(temp_dir.path().join("absent.json"));
        assert!(matches!(load_attr(&attr), Err(StoreError::Io { .. })));
    }
}
