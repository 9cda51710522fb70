//! Open state shared by a store and every handle derived from it
//!
//! Closing a store flips the shared state, so handles obtained earlier start
//! failing with [`StoreError::Closed`] instead of touching the filesystem.

use crate::error::{Result, StoreError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Access mode of an open store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenState {
    ReadOnly,
    ReadWrite,
    Closed,
}

/// Cloneable handle to one store's open state.
#[derive(Debug, Clone)]
pub struct StoreState {
    inner: Arc<RwLock<OpenState>>,
}

impl StoreState {
    pub fn new(state: OpenState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn get(&self) -> OpenState {
        *self.inner.read()
    }

    pub fn set(&self, state: OpenState) {
        *self.inner.write() = state;
    }

    pub fn close(&self) {
        self.set(OpenState::Closed);
    }

    pub fn is_open(&self) -> bool {
        self.get() != OpenState::Closed
    }

    /// Required before any read.
    pub fn assert_open(&self) -> Result<()> {
        match self.get() {
            OpenState::Closed => Err(StoreError::Closed),
            _ => Ok(()),
        }
    }

    /// Required before any mutation.
    pub fn assert_writable(&self) -> Result<()> {
        match self.get() {
            OpenState::Closed => Err(StoreError::Closed),
            OpenState::ReadOnly => Err(StoreError::ReadOnly),
            OpenState::ReadWrite => Ok(()),
        }
    }
}
