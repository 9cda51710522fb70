//! Node kinds, metadata records and node handles

use crate::types::META_VERSION;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of a node, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Root of a store.
    File,
    /// Container of child nodes.
    Group,
    /// Leaf holding one `.npy` array.
    Dataset,
    /// Reserved leaf for opaque payloads.
    Raw,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Group => "group",
            NodeKind::Dataset => "dataset",
            NodeKind::Raw => "raw",
        }
    }

    /// Whether nodes of this kind may hold children.
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::File | NodeKind::Group)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata record persisted in every node directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub version: u32,
    #[serde(rename = "type", alias = "kind")]
    pub kind: NodeKind,
}

impl NodeMetadata {
    pub fn new(kind: NodeKind) -> Self {
        NodeMetadata {
            version: META_VERSION,
            kind,
        }
    }
}

/// Handle to a node: its metadata plus where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub meta: NodeMetadata,
    pub root: PathBuf,
    /// Relative to `root`; empty for the root node itself.
    pub relpath: PathBuf,
}

impl Node {
    pub fn new(meta: NodeMetadata, root: PathBuf, relpath: PathBuf) -> Self {
        Node { meta, root, relpath }
    }

    pub fn kind(&self) -> NodeKind {
        self.meta.kind
    }

    /// Directory of this node on disk.
    pub fn path(&self) -> PathBuf {
        if self.relpath.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(&self.relpath)
        }
    }

    /// Relative path of a child `name` below this node.
    pub fn child_relpath(&self, name: &Path) -> PathBuf {
        if self.relpath.as_os_str().is_empty() {
            name.to_path_buf()
        } else {
            self.relpath.join(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_kinds() {
        assert!(NodeKind::File.is_container());
        assert!(NodeKind::Group.is_container());
        assert!(!NodeKind::Dataset.is_container());
        assert!(!NodeKind::Raw.is_container());
    }

    #[test]
    fn test_metadata_json_shape() {
        let json = serde_json::to_string(&NodeMetadata::new(NodeKind::Group)).unwrap();
        assert_eq!(json, r#"{"version":1,"type":"group"}"#);

        let meta: NodeMetadata = serde_json::from_str(r#"{"version":1,"kind":"dataset"}"#).unwrap();
        assert_eq!(meta.kind, NodeKind::Dataset);

        assert!(serde_json::from_str::<NodeMetadata>(r#"{"version":1,"type":"folder"}"#).is_err());
    }

    #[test]
    fn test_node_path_resolution() {
        let root = PathBuf::from("/data/store.poppel");
        let file = Node::new(NodeMetadata::new(NodeKind::File), root.clone(), PathBuf::new());
        assert_eq!(file.path(), root);

        let group = Node::new(
            NodeMetadata::new(NodeKind::Group),
            root.clone(),
            file.child_relpath(Path::new("g1")),
        );
        assert_eq!(group.path(), root.join("g1"));
        assert_eq!(group.child_relpath(Path::new("d1")), PathBuf::from("g1").join("d1"));
    }
}
