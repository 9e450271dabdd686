//! TOML configuration plumbing shared by the `mpo` crates.
//!
//! Any `Deserialize` type gets [`ConfigLoader`] for free, so a tool only
//! declares its sections and calls `load`:
//!
//! ```rust,no_run
//! use mpo_common::config::{ConfigError, ConfigLoader, SharedConfig};
//! use serde::Deserialize;
//! use std::path::Path;
//!
//! #[derive(Debug, Deserialize)]
//! struct RigConfig {
//!     #[serde(default)]
//!     shared: SharedConfig,
//!     sample_rate_hz: f64,
//! }
//!
//! fn main() -> Result<(), ConfigError> {
//!     let rig = RigConfig::load(Path::new("rig.toml"))?;
//!     println!("{} @ {} Hz", rig.shared.service_name, rig.sample_rate_hz);
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("Config file {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("Cannot read config file {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    /// Not valid TOML, or the wrong shape for the target type.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Parsed, but a value is out of bounds.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log verbosity, written in lowercase in TOML (`log_level = "debug"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// `[shared]` section: settings every `mpo` tool reads.
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "mpo-bench-rig"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedConfig {
    #[serde(default)]
    pub log_level: LogLevel,

    /// Name shown in the startup log line.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    "mpo".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Reject an empty `service_name`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared: service_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load a configuration type from TOML.
///
/// Loading only parses; semantic checks stay with each type's `validate`.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Read and parse `path`.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML text.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Tests ──────────────────────────────────────────────────────────
