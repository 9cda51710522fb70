//! User-facing handles over the node store.
//!
//! A [`File`] owns the open state of one store root and dereferences to its
//! root [`Group`]. Groups hand out child groups and [`Dataset`]s; every handle
//! shares the file's state, so closing the file invalidates all of them.

pub mod dataset;
pub mod file;
pub mod group;
pub mod mode;

pub use dataset::{Dataset, DatasetInfo};
pub use file::File;
pub use group::Group;
pub use mode::{ModePreset, OpenMode};

use crate::attrs::{self, Attribute};
use crate::error::Result;
use crate::store::NodeStore;
use crate::tree::Node;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Attribute access shared by groups and datasets.
pub trait Attributes {
    #[doc(hidden)]
    fn attr_target(&self) -> (&NodeStore, &Node);

    /// Attribute document location, created empty on first use.
    fn attribute(&self) -> Result<Attribute> {
        let (store, node) = self.attr_target();
        store.attribute(node)
    }

    fn load_attr(&self) -> Result<Value> {
        attrs::load_attr(&self.attribute()?)
    }

    fn load_attr_as<T: DeserializeOwned>(&self) -> Result<T> {
        attrs::load_attr_as(&self.attribute()?)
    }

    fn save_attr<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let (store, _) = self.attr_target();
        store.state().assert_writable()?;
        attrs::save_attr(value, &self.attribute()?)
    }
}
