//! Prelude module for common re-exports.
//!
//! ```rust
//! use mpo_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::editor::{
    EditorConfig, ExportConfig, HistoryConfig, PaletteConfig, ProfileDefaults, ViewConfig,
};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_DOCUMENT_ID, DEFAULT_REFERENCE_VALUE};
