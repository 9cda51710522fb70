//! Node values of the hierarchical store.
//!
//! Nodes are plain values computed from a path; they never own or cache
//! children. The filesystem is the authoritative structure.

pub mod node;

pub use node::{Node, NodeKind, NodeMetadata};
