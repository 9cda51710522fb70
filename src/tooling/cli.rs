//! CLI Tooling
//!
//! Command-line interface for inspecting and editing poppel stores.

use crate::config::{ConfigLoader, PoppelConfig};
use crate::error::{Result, StoreError};
use crate::facade::{Attributes, Dataset, File, Group, OpenMode};
use crate::tree::NodeKind;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::info;

/// Poppel CLI - hierarchical array containers on the filesystem
#[derive(Parser)]
#[command(name = "poppel")]
#[command(about = "Inspect and edit poppel array stores")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new store root
    Init {
        store: PathBuf,
        /// Replace an existing store
        #[arg(long)]
        force: bool,
    },
    /// Print every node below the root
    Tree {
        store: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Describe a dataset's array
    Info {
        store: PathBuf,
        dataset: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the attribute document of a node (the root by default)
    Attrs {
        store: PathBuf,
        node: Option<String>,
    },
    /// Create a group and any missing parents
    Mkgroup { store: PathBuf, path: String },
    /// Delete a node and everything below it
    Rm { store: PathBuf, path: String },
}

/// CLI context holding the loaded configuration
pub struct CliContext {
    config: PoppelConfig,
}

impl CliContext {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        }
        .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: PoppelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PoppelConfig {
        &self.config
    }

    fn open(&self, store: &Path, mode: OpenMode) -> Result<File> {
        File::open_with_config(store, mode, &self.config.codec)
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Init { store, force } => {
                let mode = if *force {
                    OpenMode::OVERWRITE
                } else {
                    OpenMode::CREATE_WRITE | OpenMode::EXCL
                };
                let file = self.open(store, mode)?;
                info!(store = %store.display(), force, "initialized store");
                Ok(format!("Initialized store at {}", file.path().display()))
            }
            Commands::Tree { store, format } => {
                let file = self.open(store, OpenMode::READ_ONLY)?;
                let mut rows = Vec::new();
                collect_tree(&file, "", &mut rows)?;
                format_tree(&rows, format)
            }
            Commands::Info {
                store,
                dataset,
                format,
            } => {
                let file = self.open(store, OpenMode::READ_ONLY)?;
                let dataset = file.get_dataset(dataset)?;
                format_info(&dataset, format)
            }
            Commands::Attrs { store, node } => {
                let file = self.open(store, OpenMode::READ_ONLY)?;
                let value = match node.as_deref() {
                    None => read_attrs(file.root())?,
                    Some(name) if file.has_group(name)? => read_attrs(&file.get_group(name)?)?,
                    Some(name) => read_attrs(&file.get_dataset(name)?)?,
                };
                serde_json::to_string_pretty(&value)
                    .map_err(|e| StoreError::Render("attributes", e))
            }
            Commands::Mkgroup { store, path } => {
                let file = self.open(store, self.config.store.default_mode.mode())?;
                let group = file.require_group(path)?;
                Ok(format!("Group {} ready", group.node().relpath.display()))
            }
            Commands::Rm { store, path } => {
                let file = self.open(store, self.config.store.default_mode.mode())?;
                file.delete(path)?;
                info!(store = %store.display(), node = %path, "removed node");
                Ok(format!("Removed {}", path))
            }
        }
    }
}

/// One line of `poppel tree`.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRow {
    pub path: String,
    pub kind: NodeKind,
    pub detail: String,
}

fn collect_tree(group: &Group, prefix: &str, rows: &mut Vec<TreeRow>) -> Result<()> {
    for (name, kind) in group.children()? {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}/{}", prefix, name)
        };
        let detail = match kind {
            NodeKind::Dataset => match group.get_dataset(&name)?.info() {
                Ok(info) => format!("{} {:?}", info.descr, info.shape),
                Err(e) => format!("unreadable: {}", e),
            },
            _ => String::new(),
        };
        rows.push(TreeRow {
            path: path.clone(),
            kind,
            detail,
        });
        if kind == NodeKind::Group {
            collect_tree(&group.get_group(&name)?, &path, rows)?;
        }
    }
    Ok(())
}

fn format_tree(rows: &[TreeRow], format: &str) -> Result<String> {
    if format == "json" {
        let arr: Vec<Value> = rows
            .iter()
            .map(|r| json!({"path": r.path, "kind": r.kind, "detail": r.detail}))
            .collect();
        return serde_json::to_string_pretty(&arr)
            .map_err(|e| StoreError::Render("tree", e));
    }
    if rows.is_empty() {
        return Ok("(empty store)".to_string());
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Path", "Kind", "Array"]);
    for r in rows {
        table.add_row(vec![r.path.as_str(), r.kind.as_str(), r.detail.as_str()]);
    }
    Ok(table.to_string())
}

fn format_info(dataset: &Dataset, format: &str) -> Result<String> {
    let info = dataset.info()?;
    let bytes = info.num_bytes();
    if format == "json" {
        let value = json!({
            "descr": info.descr,
            "shape": info.shape,
            "wordsize": info.wordsize,
            "fortran_order": info.fortran_order,
            "bytes": bytes,
        });
        return serde_json::to_string_pretty(&value)
            .map_err(|e| StoreError::Render("dataset info", e));
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["dtype".to_string(), info.descr.clone()]);
    table.add_row(vec![
        "order".to_string(),
        if info.fortran_order { "fortran" } else { "c" }.to_string(),
    ]);
    table.add_row(vec!["shape".to_string(), format!("{:?}", info.shape)]);
    table.add_row(vec!["wordsize".to_string(), info.wordsize.to_string()]);
    table.add_row(vec![
        "bytes".to_string(),
        bytes.map_or_else(|| "overflow".to_string(), |b| b.to_string()),
    ]);
    Ok(table.to_string())
}

fn read_attrs<A: Attributes>(node: &A) -> Result<Value> {
    match node.load_attr() {
        // A read-only store cannot create the missing document.
        Err(StoreError::ReadOnly) => Ok(json!({})),
        other => other,
    }
}
