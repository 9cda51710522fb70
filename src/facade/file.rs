//! Store roots.

use super::{Group, OpenMode};
use crate::config::CodecConfig;
use crate::error::{Result, StoreError};
use crate::store::{NodeStore, OpenState};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An open store root. Dereferences to the root [`Group`].
///
/// Dropping a `File` closes it; handles obtained from it stop working.
#[derive(Debug)]
pub struct File {
    path: PathBuf,
    mode: OpenMode,
    root: Group,
}

impl File {
    /// Open the store at `path` with default codec settings.
    ///
    /// An existing root is opened unless `EXCL` is set; with `TRUNCATE` it
    /// is replaced by an empty one. A missing root is created only with
    /// `CREATE`.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> Result<File> {
        Self::open_with_config(path, mode, &CodecConfig::default())
    }

    pub fn open_with_config(
        path: impl AsRef<Path>,
        mode: OpenMode,
        codec: &CodecConfig,
    ) -> Result<File> {
        mode.validate()?;
        let path = path.as_ref();
        let state = if mode.is_writable() {
            OpenState::ReadWrite
        } else {
            OpenState::ReadOnly
        };
        let store = NodeStore::new(state);

        let node = if path.is_dir() {
            if mode.contains(OpenMode::EXCL) {
                return Err(StoreError::AlreadyExists(path.to_path_buf()));
            }
            if mode.contains(OpenMode::TRUNCATE) {
                store.delete_root(path)?;
                debug!(root = %path.display(), "truncated store");
                store.create_root(path)?
            } else {
                store.open_root(path)?
            }
        } else if mode.contains(OpenMode::CREATE) {
            store.create_root(path)?
        } else {
            return Err(StoreError::NotFound(path.to_path_buf()));
        };

        debug!(root = %path.display(), ?mode, "opened store");
        Ok(File {
            path: path.to_path_buf(),
            mode,
            root: Group::new(store, node, codec.alignment()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.root.store().state().is_open()
    }

    /// Close the store. Further calls through any derived handle fail.
    pub fn close(&self) {
        if self.is_open() {
            debug!(root = %self.path.display(), "closed store");
        }
        self.root.store().close();
    }

    pub fn root(&self) -> &Group {
        &self.root
    }
}

impl Deref for File {
    type Target = Group;

    fn deref(&self) -> &Group {
        &self.root
    }
}

impl Drop for File {
    fn drop(&mut self) {
        self.close();
    }
}
