//! Logical node paths.
//!
//! A node path names a node relative to some parent node. It is validated and
//! normalized purely syntactically before it is ever joined onto a store root:
//! `.` segments and repeated separators collapse, `..` may only cancel a
//! preceding segment of the same path, and the result must name at least one
//! segment. Both `/` and `\` separate segments. The record file names of a
//! node directory are never valid segments.

use crate::error::{Result, StoreError};
use crate::types::RESERVED_NAMES;
use std::fmt;
use std::path::PathBuf;

/// A normalized, validated relative node path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// Normalize and validate `raw`.
    pub fn parse(raw: &str) -> Result<Self> {
        normalize(raw)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment, the name of the addressed node itself.
    pub fn name(&self) -> &str {
        // Construction guarantees at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Everything before the final segment, or `None` for a single segment path.
    pub fn parent(&self) -> Option<NodePath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(NodePath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Filesystem form, joined with the platform separator.
    pub fn to_path_buf(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn has_drive_prefix(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Normalize a user supplied relative path.
pub fn normalize(raw: &str) -> Result<NodePath> {
    let invalid = |reason| StoreError::InvalidPath(raw.to_string(), reason);

    if raw.is_empty() {
        return Err(invalid("path is empty"));
    }
    if raw.starts_with(is_separator) || has_drive_prefix(raw) {
        return Err(invalid("path must be relative"));
    }
    if raw.ends_with(is_separator) {
        return Err(invalid("path has no final component"));
    }

    let mut segments: Vec<String> = Vec::new();
    for segment in raw.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(invalid("path escapes its parent"));
                }
            }
            name => segments.push(name.to_string()),
        }
    }

    if segments.is_empty() {
        return Err(invalid("path does not name a node"));
    }
    if segments.iter().any(|s| RESERVED_NAMES.contains(&s.as_str())) {
        return Err(invalid("name is reserved for node records"));
    }
    Ok(NodePath { segments })
}

pub fn is_valid(raw: &str) -> bool {
    normalize(raw).is_ok()
}

pub fn validate(raw: &str) -> Result<()> {
    normalize(raw).map(|_| ())
}
