//! Error types for the array codec and the node store.

use crate::tree::NodeKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A convenience `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while encoding or decoding `.npy` streams.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The stream does not start with the `\x93NUMPY` magic bytes.
    #[error("Invalid magic bytes: expected \\x93NUMPY, got {0:?}")]
    InvalidMagic([u8; 6]),

    /// Format version other than 1.0, 2.0 or 3.0.
    #[error("Unsupported npy format version: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    /// Header text could not be parsed.
    #[error("Invalid npy header: {0}")]
    InvalidHeader(String),

    /// Header length plus preamble is not a multiple of 64 and strict checking was requested.
    #[error("Misaligned npy header: preamble + header length {0} is not a multiple of 64")]
    MisalignedHeader(usize),

    /// Header too long to be described by the length field of the chosen version.
    #[error("Header of {0} bytes does not fit the length field")]
    HeaderTooLong(usize),

    /// Decoded header differs from the one the caller expected.
    #[error("Header mismatch: expected {expected}, found {found}")]
    HeaderMismatch { expected: String, found: String },

    /// Caller-supplied buffer does not hold exactly the payload size.
    #[error("Buffer length mismatch: header requires {expected} bytes, buffer has {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// Underlying stream failure, including truncated payloads.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by the node store, attribute store and facade.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid node path {0:?}: {1}")]
    InvalidPath(String, &'static str),

    #[error("Node not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Node already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Node {} is a {found}, expected {expected}", .path.display())]
    KindMismatch {
        path: PathBuf,
        expected: NodeKind,
        found: NodeKind,
    },

    #[error("Node {} is a {0}, which cannot hold children", .1.display())]
    NotAContainer(NodeKind, PathBuf),

    #[error("Unable to operate on a closed store")]
    Closed,

    #[error("Cannot change data on a store opened read-only")]
    ReadOnly,

    #[error("Array format error: {0}")]
    Format(#[from] FormatError),

    #[error("Invalid node metadata in {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid attribute JSON in {}: {source}", .path.display())]
    Attribute {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid open mode: {0}")]
    InvalidMode(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to render {0}: {1}")]
    Render(&'static str, #[source] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
