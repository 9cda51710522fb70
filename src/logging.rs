//! Logging System
//!
//! Structured logging through `tracing`. The library only emits events; the
//! `poppel` binary (or an embedding application) installs a subscriber here,
//! choosing level, format, and destination from config and the environment.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directives, e.g. `debug` or `poppel::store=trace`.
pub const LOG_ENV: &str = "POPPEL_LOG";
/// `json` or `text`.
pub const LOG_FORMAT_ENV: &str = "POPPEL_LOG_FORMAT";
/// `stdout`, `stderr`, `file`, `file+stderr` or `both`.
pub const LOG_OUTPUT_ENV: &str = "POPPEL_LOG_OUTPUT";
pub const LOG_FILE_ENV: &str = "POPPEL_LOG_FILE";
/// Comma separated `module=level` pairs.
pub const LOG_MODULES_ENV: &str = "POPPEL_LOG_MODULES";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file, file+stderr, both
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path when output includes file; None means the state directory
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format, terminal destinations only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Resolve the log file path: `POPPEL_LOG_FILE`, then config, then the platform default.
pub fn resolve_log_file_path(config_file: Option<PathBuf>) -> Result<PathBuf> {
    if let Ok(env_path) = std::env::var(LOG_FILE_ENV) {
        if !env_path.is_empty() {
            return Ok(PathBuf::from(env_path));
        }
    }
    if let Some(p) = config_file {
        if !p.as_os_str().is_empty() {
            return Ok(p);
        }
    }
    default_log_file_path()
}

fn default_log_file_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("", "", "poppel").ok_or_else(|| {
        StoreError::Config("Could not determine platform directories for log file".to_string())
    })?;
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir());
    Ok(dir.join("poppel.log"))
}

/// Initialize the global subscriber.
///
/// Environment variables take precedence over `config`, which takes
/// precedence over the defaults.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<()> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    if !config.enabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
            .map_err(|e| StoreError::Config(format!("Failed to install subscriber: {}", e)))?;
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let json = determine_format(config)? == LogFormat::Json;
    let output = determine_output(config)?;
    let ansi = config.color && !output.file && !json;

    let writer = if output.file {
        let file = open_log_file(resolve_log_file_path(config.file.clone())?)?;
        if output.stderr {
            BoxMakeWriter::new(file.and(std::io::stderr))
        } else {
            BoxMakeWriter::new(file)
        }
    } else if output.stdout && output.stderr {
        BoxMakeWriter::new(std::io::stdout.and(std::io::stderr))
    } else if output.stderr {
        BoxMakeWriter::new(std::io::stderr)
    } else {
        BoxMakeWriter::new(std::io::stdout)
    };

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(writer);

    let registry = Registry::default().with(filter);
    let installed = if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer.with_ansi(ansi)).try_init()
    };
    installed.map_err(|e| StoreError::Config(format!("Failed to install subscriber: {}", e)))
}

fn open_log_file(path: PathBuf) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| StoreError::io(&path, e))
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, module_level) in &config.modules {
        filter = filter.add_directive(parse_directive(module, module_level)?);
    }
    if let Ok(modules_str) = std::env::var(LOG_MODULES_ENV) {
        for module_spec in modules_str.split(',') {
            if let Some((module, level)) = module_spec.split_once('=') {
                filter = filter.add_directive(parse_directive(module.trim(), level.trim())?);
            }
        }
    }
    Ok(filter)
}

fn parse_directive(module: &str, level: &str) -> Result<tracing_subscriber::filter::Directive> {
    format!("{}={}", module, level)
        .parse()
        .map_err(|e| StoreError::Config(format!("Invalid log directive {}={}: {}", module, level, e)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Json,
    Text,
}

fn parse_format(format: &str) -> Option<LogFormat> {
    match format {
        "json" => Some(LogFormat::Json),
        "text" => Some(LogFormat::Text),
        _ => None,
    }
}

fn determine_format(config: &LoggingConfig) -> Result<LogFormat> {
    if let Some(format) = std::env::var(LOG_FORMAT_ENV).ok().as_deref().and_then(parse_format) {
        return Ok(format);
    }
    parse_format(&config.format).ok_or_else(|| {
        StoreError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            config.format
        ))
    })
}

/// Output destinations
#[derive(Debug, PartialEq, Eq)]
struct OutputDestinations {
    stdout: bool,
    stderr: bool,
    file: bool,
}

fn determine_output(config: &LoggingConfig) -> Result<OutputDestinations> {
    match std::env::var(LOG_OUTPUT_ENV) {
        Ok(output) => parse_output_destinations(&output),
        Err(_) => parse_output_destinations(&config.output),
    }
}

fn parse_output_destinations(output: &str) -> Result<OutputDestinations> {
    let (stdout, stderr, file) = match output {
        "stdout" => (true, false, false),
        "stderr" => (false, true, false),
        "file" => (false, false, true),
        "file+stderr" => (false, true, true),
        "both" => (true, true, false),
        _ => {
            return Err(StoreError::Config(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stderr', or 'both')",
                output
            )))
        }
    };
    Ok(OutputDestinations { stdout, stderr, file })
}
