//! Core types and on-disk names shared across the store.

/// Array dimensions, outermost first.
pub type Shape = Vec<usize>;

/// Node metadata record file inside every node directory.
pub const META_FILE_NAME: &str = "poppel.json";

/// Attribute blob file, created lazily.
pub const ATTR_FILE_NAME: &str = "attributes.json";

/// Array payload file of a dataset node.
pub const DATA_FILE_NAME: &str = "data.npy";

/// Names a node may not take, since they hold a node's own records.
pub const RESERVED_NAMES: [&str; 3] = [META_FILE_NAME, ATTR_FILE_NAME, DATA_FILE_NAME];

/// Current version of the node metadata record.
pub const META_VERSION: u32 = 1;
