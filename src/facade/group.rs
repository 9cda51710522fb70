//! Group handles.

use super::{Attributes, Dataset};
use crate::error::Result;
use crate::npy::{Element, HeaderAlignment, Order};
use crate::store::NodeStore;
use crate::tree::{Node, NodeKind};
use std::path::PathBuf;

/// A container node: the store root or any group below it.
#[derive(Debug, Clone)]
pub struct Group {
    store: NodeStore,
    node: Node,
    alignment: HeaderAlignment,
}

impl Group {
    pub(crate) fn new(store: NodeStore, node: Node, alignment: HeaderAlignment) -> Self {
        Group {
            store,
            node,
            alignment,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub(crate) fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Directory of this group on disk.
    pub fn path(&self) -> PathBuf {
        self.node.path()
    }

    fn group(&self, node: Node) -> Group {
        Group::new(self.store.clone(), node, self.alignment)
    }

    fn dataset(&self, node: Node) -> Dataset {
        Dataset::new(self.store.clone(), node, self.alignment)
    }

    pub fn has_group(&self, name: &str) -> Result<bool> {
        self.store.has(&self.node, name, NodeKind::Group)
    }

    pub fn get_group(&self, name: &str) -> Result<Group> {
        let node = self.store.get(&self.node, name, NodeKind::Group)?;
        Ok(self.group(node))
    }

    /// Create a group, creating missing intermediate groups on the way.
    pub fn create_group(&self, name: &str) -> Result<Group> {
        let node = self
            .store
            .create_with_intermediates(&self.node, name, NodeKind::Group)?;
        Ok(self.group(node))
    }

    pub fn require_group(&self, name: &str) -> Result<Group> {
        let node = self.store.require(&self.node, name, NodeKind::Group)?;
        Ok(self.group(node))
    }

    /// Delete a group and everything below it.
    pub fn delete_group(&self, name: &str) -> Result<()> {
        self.store.get(&self.node, name, NodeKind::Group)?;
        self.store.delete(&self.node, name)
    }

    pub fn has_dataset(&self, name: &str) -> Result<bool> {
        self.store.has(&self.node, name, NodeKind::Dataset)
    }

    pub fn get_dataset(&self, name: &str) -> Result<Dataset> {
        let node = self.store.get(&self.node, name, NodeKind::Dataset)?;
        Ok(self.dataset(node))
    }

    /// Create a dataset holding `data` with the given order and shape.
    ///
    /// Missing intermediate groups are created. If writing the payload
    /// fails the new dataset node is removed again.
    pub fn create_dataset<T: Element>(
        &self,
        name: &str,
        order: Order,
        shape: &[usize],
        data: &[T],
    ) -> Result<Dataset> {
        self.create_dataset_with(name, |dataset| dataset.save_slice(order, shape, data))
    }

    /// Create a dataset holding `text`.
    pub fn create_text_dataset(&self, name: &str, text: &str) -> Result<Dataset> {
        self.create_dataset_with(name, |dataset| dataset.save_str(text))
    }

    fn create_dataset_with<F>(&self, name: &str, write: F) -> Result<Dataset>
    where
        F: FnOnce(&Dataset) -> Result<()>,
    {
        let node = self
            .store
            .create_with_intermediates(&self.node, name, NodeKind::Dataset)?;
        self.fill_new_dataset(name, self.dataset(node), write)
    }

    fn fill_new_dataset<F>(&self, name: &str, dataset: Dataset, write: F) -> Result<Dataset>
    where
        F: FnOnce(&Dataset) -> Result<()>,
    {
        if let Err(e) = write(&dataset) {
            if let Err(cleanup) = self.store.delete(&self.node, name) {
                tracing::warn!(error = %cleanup, "failed to remove incomplete dataset");
            }
            return Err(e);
        }
        Ok(dataset)
    }

    /// Existing dataset `name`, or a new one holding `default`.
    ///
    /// An existing dataset is returned untouched even when its contents
    /// differ from `default`; a dataset node without payload receives it.
    /// A node created here is removed again if writing `default` fails.
    pub fn require_dataset<T: Element>(
        &self,
        name: &str,
        order: Order,
        shape: &[usize],
        default: &[T],
    ) -> Result<Dataset> {
        if self.store.has(&self.node, name, NodeKind::Dataset)? {
            let dataset = self.get_dataset(name)?;
            if !dataset.has_data() {
                dataset.save_slice(order, shape, default)?;
            }
            return Ok(dataset);
        }
        let node = self.store.require(&self.node, name, NodeKind::Dataset)?;
        self.fill_new_dataset(name, self.dataset(node), |dataset| {
            dataset.save_slice(order, shape, default)
        })
    }

    pub fn delete_dataset(&self, name: &str) -> Result<()> {
        self.store.get(&self.node, name, NodeKind::Dataset)?;
        self.store.delete(&self.node, name)
    }

    /// Names and kinds of the direct children, sorted by name.
    pub fn children(&self) -> Result<Vec<(String, NodeKind)>> {
        Ok(self
            .store
            .children(&self.node)?
            .into_iter()
            .map(|(name, meta)| (name, meta.kind))
            .collect())
    }

    /// Delete any child node, whatever its kind.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.store.delete(&self.node, name)
    }
}

impl Attributes for Group {
    fn attr_target(&self) -> (&NodeStore, &Node) {
        (&self.store, &self.node)
    }
}
