//! Poppel: hierarchical array containers on the filesystem
//!
//! A store is a plain directory tree. Groups are directories, datasets are
//! directories holding one `.npy` array, and every node carries a small JSON
//! metadata record plus an optional JSON attribute document.

pub mod attrs;
pub mod config;
pub mod error;
pub mod facade;
pub mod logging;
pub mod npy;
pub mod path;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;

pub use error::{FormatError, Result, StoreError};
pub use facade::{Attributes, Dataset, DatasetInfo, File, Group, ModePreset, OpenMode};
pub use npy::{Element, Header, Order};
pub use tree::NodeKind;
