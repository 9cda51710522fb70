//! Reading and writing node metadata records on disk.

use crate::error::{Result, StoreError};
use crate::tree::NodeMetadata;
use crate::types::META_FILE_NAME;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Metadata of the node stored in `dir`, or `None` if `dir` is not a node.
///
/// A directory counts as a node only when it holds a metadata record.
pub(crate) fn probe_node(dir: &Path) -> Result<Option<NodeMetadata>> {
    let meta_path = dir.join(META_FILE_NAME);
    let bytes = match fs::read(&meta_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) if !dir.is_dir() => {
            tracing::trace!(path = %dir.display(), error = %e, "not a node directory");
            return Ok(None);
        }
        Err(e) => return Err(StoreError::io(meta_path, e)),
    };
    let meta = serde_json::from_slice(&bytes).map_err(|source| StoreError::Metadata {
        path: meta_path.clone(),
        source,
    })?;
    tracing::trace!(path = %meta_path.display(), ?meta, "read node metadata");
    Ok(Some(meta))
}

/// Metadata of the node stored in `dir`; absence is an error.
pub(crate) fn read_node_meta(dir: &Path) -> Result<NodeMetadata> {
    probe_node(dir)?.ok_or_else(|| StoreError::NotFound(dir.to_path_buf()))
}

/// Write the metadata record of a freshly created node.
///
/// Records are written once; an existing record is never overwritten.
pub(crate) fn write_node_meta(dir: &Path, meta: &NodeMetadata) -> Result<()> {
    let meta_path = dir.join(META_FILE_NAME);
    let json = serde_json::to_vec(meta).map_err(|source| StoreError::Metadata {
        path: meta_path.clone(),
        source,
    })?;
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&meta_path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StoreError::AlreadyExists(dir.to_path_buf()),
            _ => StoreError::io(&meta_path, e),
        })?;
    file.write_all(&json)
        .map_err(|e| StoreError::io(&meta_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeKind;
    use tempfile::TempDir;

    #[test]
    fn test_probe_missing_and_plain_directories() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(probe_node(&temp_dir.path().join("missing")).unwrap(), None);
        assert_eq!(probe_node(temp_dir.path()).unwrap(), None);

        let plain_file = temp_dir.path().join("file.txt");
        fs::write(&plain_file, "hello").unwrap();
        assert_eq!(probe_node(&plain_file).unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let meta = NodeMetadata::new(NodeKind::Dataset);
        write_node_meta(temp_dir.path(), &meta).unwrap();
        assert_eq!(read_node_meta(temp_dir.path()).unwrap(), meta);
    }

    #[test]
    fn test_record_is_written_once() {
        let temp_dir = TempDir::new().unwrap();
        write_node_meta(temp_dir.path(), &NodeMetadata::new(NodeKind::Group)).unwrap();
        let err = write_node_meta(temp_dir.path(), &NodeMetadata::new(NodeKind::Dataset)).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(read_node_meta(temp_dir.path()).unwrap().kind, NodeKind::Group);
    }

    #[test]
    fn test_corrupt_record_is_metadata_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(META_FILE_NAME), r#"{"version":1,"type":"blob"}"#).unwrap();
        assert!(matches!(
            read_node_meta(temp_dir.path()),
            Err(StoreError::Metadata { .. })
        ));
    }
}
