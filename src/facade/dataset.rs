//! Dataset handles: one `.npy` array per dataset node.

use super::Attributes;
use crate::error::{FormatError, Result, StoreError};
use crate::npy::{self, Element, Header, HeaderAlignment, NpyArray, Order};
use crate::store::NodeStore;
use crate::tree::Node;
use crate::types::{Shape, DATA_FILE_NAME};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Summary of a stored array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetInfo {
    pub descr: String,
    pub shape: Shape,
    /// Bytes per element.
    pub wordsize: usize,
    pub fortran_order: bool,
}

impl DatasetInfo {
    /// `None` when the shape's product overflows.
    pub fn element_count(&self) -> Option<usize> {
        self.shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }

    /// Payload size in bytes.
    pub fn num_bytes(&self) -> Option<usize> {
        self.element_count()?.checked_mul(self.wordsize)
    }
}

impl From<&Header> for DatasetInfo {
    fn from(header: &Header) -> Self {
        DatasetInfo {
            descr: header.dtype.descr(),
            shape: header.shape.clone(),
            wordsize: header.dtype.item_size,
            fortran_order: header.order.is_fortran(),
        }
    }
}

/// A leaf node holding a single array.
#[derive(Debug, Clone)]
pub struct Dataset {
    store: NodeStore,
    node: Node,
    alignment: HeaderAlignment,
}

impl Dataset {
    pub(crate) fn new(store: NodeStore, node: Node, alignment: HeaderAlignment) -> Self {
        Dataset {
            store,
            node,
            alignment,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Location of the `.npy` payload.
    pub fn data_path(&self) -> PathBuf {
        self.node.path().join(DATA_FILE_NAME)
    }

    pub(crate) fn has_data(&self) -> bool {
        self.data_path().is_file()
    }

    pub fn info(&self) -> Result<DatasetInfo> {
        Ok(DatasetInfo::from(&self.header()?))
    }

    pub fn header(&self) -> Result<Header> {
        self.read(|reader, alignment| npy::load_header_with(reader, alignment))
    }

    pub fn load_array(&self) -> Result<NpyArray> {
        self.read(|reader, alignment| npy::load_with(reader, alignment))
    }

    pub fn load_scalar<T: Element>(&self) -> Result<T> {
        self.read(|reader, alignment| npy::load_with(reader, alignment)?.into_scalar())
    }

    pub fn load_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.read(|reader, alignment| npy::load_with(reader, alignment)?.into_vec())
    }

    pub fn load_string(&self) -> Result<String> {
        self.read(|reader, alignment| npy::load_with(reader, alignment)?.into_string())
    }

    /// Load into `out`; the stored dtype, order and shape must match exactly.
    pub fn load_into<T: Element>(&self, order: Order, shape: &[usize], out: &mut [T]) -> Result<()> {
        let expected = Header::for_element::<T>(order, shape.to_vec());
        self.read(|reader, alignment| {
            npy::load_checked_with(reader, alignment, &expected, bytemuck::cast_slice_mut(out))
        })
    }

    pub fn save_scalar<T: Element>(&self, value: T) -> Result<()> {
        self.write(|writer| npy::save_scalar(writer, value))
    }

    pub fn save_slice<T: Element>(&self, order: Order, shape: &[usize], data: &[T]) -> Result<()> {
        self.write(|writer| npy::save_slice(writer, order, shape, data))
    }

    pub fn save_str(&self, text: &str) -> Result<()> {
        self.write(|writer| npy::save_str(writer, text))
    }

    /// Write raw payload bytes described by `header`.
    pub fn save_array(&self, header: &Header, data: &[u8]) -> Result<()> {
        self.write(|writer| npy::save(writer, header, data))
    }

    fn read<T, F>(&self, decode: F) -> Result<T>
    where
        F: FnOnce(&mut BufReader<fs::File>, HeaderAlignment) -> std::result::Result<T, FormatError>,
    {
        self.store.state().assert_open()?;
        let path = self.data_path();
        let file = fs::File::open(&path).map_err(|e| StoreError::io(&path, e))?;
        let mut reader = BufReader::new(file);
        decode(&mut reader, self.alignment).map_err(|e| with_path(&path, e))
    }

    /// Encode into a sibling file and rename it over the payload, so a
    /// failed write leaves the previous array in place.
    fn write<F>(&self, encode: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<fs::File>) -> std::result::Result<(), FormatError>,
    {
        self.store.state().assert_writable()?;
        let path = self.data_path();
        let staging = path.with_extension(STAGING_EXTENSION);
        if let Err(e) = write_staged(&staging, encode) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        fs::rename(&staging, &path).map_err(|e| StoreError::io(&path, e))?;
        tracing::trace!(path = %path.display(), "wrote dataset payload");
        Ok(())
    }
}

impl Attributes for Dataset {
    fn attr_target(&self) -> (&NodeStore, &Node) {
        (&self.store, &self.node)
    }
}

const STAGING_EXTENSION: &str = "npy.tmp";

fn write_staged<F>(staging: &Path, encode: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> std::result::Result<(), FormatError>,
{
    let file = fs::File::create(staging).map_err(|e| StoreError::io(staging, e))?;
    let mut writer = BufWriter::new(file);
    encode(&mut writer).map_err(|e| with_path(staging, e))?;
    writer.flush().map_err(|e| StoreError::io(staging, e))
}

fn with_path(path: &Path, e: FormatError) -> StoreError {
    match e {
        FormatError::Io(source) => StoreError::io(path, source),
        other => StoreError::Format(other),
    }
}
