//! Node Store
//!
//! Maps logical node paths onto directories below a store root. Every node
//! directory carries a metadata record naming its kind; the store enforces
//! that kinds are never reinterpreted, that only containers hold children,
//! and that partially existing paths resolve the same way every time.
//!
//! Nothing is cached: each call re-reads metadata from disk. Multi-segment
//! operations are not transactional; an interrupted `require` can leave some
//! intermediate groups behind.

pub mod persistence;
pub mod state;

pub use state::{OpenState, StoreState};

use crate::attrs::Attribute;
use crate::error::{Result, StoreError};
use crate::path::NodePath;
use crate::tree::{Node, NodeKind, NodeMetadata};
use crate::types::ATTR_FILE_NAME;
use persistence::{probe_node, read_node_meta, write_node_meta};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use walkdir::WalkDir;

/// Primitive operations on one store, guarded by its open state.
#[derive(Debug, Clone)]
pub struct NodeStore {
    state: StoreState,
}

impl NodeStore {
    pub fn new(state: OpenState) -> Self {
        Self::with_state(StoreState::new(state))
    }

    pub fn with_state(state: StoreState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn close(&self) {
        self.state.close();
    }

    // ------------------------------------------------------------------
    // Roots
    // ------------------------------------------------------------------

    /// Create a new root at `path`, which must not exist yet.
    pub fn create_root(&self, path: &Path) -> Result<Node> {
        self.state.assert_writable()?;
        if fs::symlink_metadata(path).is_ok() {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }
        fs::create_dir(path).map_err(|e| StoreError::io(path, e))?;
        let meta = NodeMetadata::new(NodeKind::File);
        write_node_meta(path, &meta)?;
        debug!(root = %path.display(), "created store root");
        Ok(Node::new(meta, path.to_path_buf(), PathBuf::new()))
    }

    /// Open the existing root at `path`.
    pub fn open_root(&self, path: &Path) -> Result<Node> {
        self.state.assert_open()?;
        let meta = read_node_meta(path)?;
        expect_kind(path, meta, NodeKind::File)?;
        Ok(Node::new(meta, path.to_path_buf(), PathBuf::new()))
    }

    /// Remove the root at `path` and everything below it.
    pub fn delete_root(&self, path: &Path) -> Result<()> {
        self.state.assert_writable()?;
        let meta = read_node_meta(path)?;
        expect_kind(path, meta, NodeKind::File)?;
        remove_subtree(path)
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Whether `name` below `parent` exists with exactly `kind`.
    pub fn has(&self, parent: &Node, name: &str, kind: NodeKind) -> Result<bool> {
        self.state.assert_open()?;
        assert_container(parent)?;
        let relpath = NodePath::parse(name)?;
        let dir = parent.path().join(relpath.to_path_buf());
        Ok(matches!(probe_node(&dir)?, Some(meta) if meta.kind == kind))
    }

    /// Resolve `name` below `parent`, which must exist as `kind`.
    pub fn get(&self, parent: &Node, name: &str, kind: NodeKind) -> Result<Node> {
        self.state.assert_open()?;
        assert_container(parent)?;
        let relpath = NodePath::parse(name)?;
        self.get_at(parent, &relpath.to_path_buf(), kind)
    }

    /// Create only the final segment of `name`; its ancestors must already be groups.
    pub fn create(&self, parent: &Node, name: &str, kind: NodeKind) -> Result<Node> {
        self.state.assert_writable()?;
        assert_container(parent)?;
        let relpath = NodePath::parse(name)?;

        let mut current = parent.clone();
        if let Some(ancestors) = relpath.parent() {
            for segment in ancestors.segments() {
                current = self.get_at(&current, Path::new(segment), NodeKind::Group)?;
            }
        }
        self.create_child(&current, relpath.name(), kind)
    }

    /// Resolve `name`, creating every missing segment.
    ///
    /// Existing segments must be groups, except the last which must be `kind`.
    pub fn require(&self, parent: &Node, name: &str, kind: NodeKind) -> Result<Node> {
        self.state.assert_open()?;
        assert_container(parent)?;
        let relpath = NodePath::parse(name)?;
        self.require_at(parent, &relpath, kind)
    }

    /// Require the ancestors of `name` as groups, then create its final segment.
    pub fn create_with_intermediates(
        &self,
        parent: &Node,
        name: &str,
        kind: NodeKind,
    ) -> Result<Node> {
        self.state.assert_writable()?;
        assert_container(parent)?;
        let relpath = NodePath::parse(name)?;
        let container = match relpath.parent() {
            Some(ancestors) => self.require_at(parent, &ancestors, NodeKind::Group)?,
            None => parent.clone(),
        };
        self.create_child(&container, relpath.name(), kind)
    }

    /// Remove `name` below `parent` with its whole subtree, whatever its kind.
    pub fn delete(&self, parent: &Node, name: &str) -> Result<()> {
        self.state.assert_writable()?;
        assert_container(parent)?;
        let relpath = NodePath::parse(name)?;
        let dir = parent.path().join(relpath.to_path_buf());
        if probe_node(&dir)?.is_none() {
            return Err(StoreError::NotFound(dir));
        }
        remove_subtree(&dir)
    }

    /// Direct child nodes of `parent`, sorted by name.
    ///
    /// Entries that are not node directories are skipped.
    pub fn children(&self, parent: &Node) -> Result<Vec<(String, NodeMetadata)>> {
        self.state.assert_open()?;
        assert_container(parent)?;
        let dir = parent.path();
        let entries = fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let child_dir = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!("Skipping non UTF-8 entry: {:?}", child_dir);
                continue;
            };
            if let Some(meta) = probe_node(&child_dir)? {
                children.push((name, meta));
            }
        }
        children.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(children)
    }

    /// Attribute handle of `node`, creating an empty document on first use.
    pub fn attribute(&self, node: &Node) -> Result<Attribute> {
        self.state.assert_open()?;
        let json_file = node.path().join(ATTR_FILE_NAME);
        if !json_file.exists() {
            self.state.assert_writable()?;
            fs::write(&json_file, "{}").map_err(|e| StoreError::io(&json_file, e))?;
        }
        Ok(Attribute::new(json_file))
    }

    /// Metadata of the node stored in `dir`.
    pub fn read_meta(&self, dir: &Path) -> Result<NodeMetadata> {
        self.state.assert_open()?;
        read_node_meta(dir)
    }

    // ------------------------------------------------------------------
    // Internals; callers have already checked state and path validity.
    // ------------------------------------------------------------------

    fn get_at(&self, parent: &Node, rel: &Path, kind: NodeKind) -> Result<Node> {
        let dir = parent.path().join(rel);
        let meta = probe_node(&dir)?.ok_or_else(|| StoreError::NotFound(dir.clone()))?;
        expect_kind(&dir, meta, kind)?;
        Ok(Node::new(meta, parent.root.clone(), parent.child_relpath(rel)))
    }

    fn require_at(&self, parent: &Node, relpath: &NodePath, kind: NodeKind) -> Result<Node> {
        let last = relpath.len() - 1;
        let mut current = parent.clone();
        for (i, segment) in relpath.segments().iter().enumerate() {
            let wanted = if i == last { kind } else { NodeKind::Group };
            let dir = current.path().join(segment);
            current = match probe_node(&dir)? {
                Some(meta) => {
                    expect_kind(&dir, meta, wanted)?;
                    Node::new(meta, current.root.clone(), current.child_relpath(Path::new(segment)))
                }
                None => {
                    self.state.assert_writable()?;
                    self.create_child(&current, segment, wanted)?
                }
            };
        }
        Ok(current)
    }

    /// Create one directory level below `parent`.
    fn create_child(&self, parent: &Node, name: &str, kind: NodeKind) -> Result<Node> {
        assert_container(parent)?;
        let rel = Path::new(name);
        let dir = parent.path().join(rel);
        if fs::symlink_metadata(&dir).is_ok() {
            return Err(StoreError::AlreadyExists(dir));
        }
        fs::create_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let meta = NodeMetadata::new(kind);
        if let Err(e) = write_node_meta(&dir, &meta) {
            let _ = fs::remove_dir(&dir);
            return Err(e);
        }
        let node = Node::new(meta, parent.root.clone(), parent.child_relpath(rel));
        debug!(path = %node.relpath.display(), %kind, "created node");
        Ok(node)
    }
}

fn expect_kind(dir: &Path, meta: NodeMetadata, expected: NodeKind) -> Result<()> {
    if meta.kind != expected {
        return Err(StoreError::KindMismatch {
            path: dir.to_path_buf(),
            expected,
            found: meta.kind,
        });
    }
    Ok(())
}

fn assert_container(node: &Node) -> Result<()> {
    if !node.kind().is_container() {
        return Err(StoreError::NotAContainer(node.kind(), node.path()));
    }
    Ok(())
}

fn remove_subtree(dir: &Path) -> Result<()> {
    let removed_nodes = tracing::enabled!(Level::DEBUG).then(|| {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_dir())
            .count()
    });
    fs::remove_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
    if let Some(removed_nodes) = removed_nodes {
        debug!(path = %dir.display(), removed_nodes, "deleted node subtree");
    }
    Ok(())
}
