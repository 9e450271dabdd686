//! Error types for editing, persistence and export.
//!
//! None of these are fatal: every failing call leaves the document in the
//! state it had before the call.

use std::path::PathBuf;

use thiserror::Error;

use crate::document::ProfileId;

/// A rejected or unresolvable edit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    /// Node time lies before zero.
    #[error("Node time {time} is negative")]
    NegativeTime {
        /// Offending time [ms]
        time: f64,
    },

    /// Node coordinate is NaN or infinite.
    #[error("Node coordinate ({time}, {value}) is not finite")]
    NonFinite {
        /// Time [ms]
        time: f64,
        /// Value
        value: f64,
    },

    /// Node value lies outside the profile's bounds.
    #[error("Value {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Offending value
        value: f64,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// Index does not address a node.
    #[error("Node index {index} out of bounds (length {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Node count
        len: usize,
    },

    /// Index no longer matches the expected node and no value match exists.
    #[error("Node at index {index} no longer matches ({time}, {value})")]
    StaleNode {
        /// Index the caller addressed
        index: usize,
        /// Expected time [ms]
        time: f64,
        /// Expected value
        value: f64,
    },

    /// Profile handle does not resolve in the document.
    #[error("Unknown motor profile {0}")]
    UnknownProfile(ProfileId),

    /// A batch command was built with no members.
    #[error("Batch move contains no nodes")]
    EmptyBatch,

    /// Undo requested with an empty history.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Redo requested with an empty redo tail.
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Invalid sampled-export parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// Sample rate must be strictly positive.
    #[error("Sample rate {0} Hz must be > 0")]
    InvalidSampleRate(f64),

    /// End time must be zero or positive.
    #[error("End time {0} ms must be >= 0")]
    InvalidEndTime(f64),

    /// Rate and end time ask for more samples than one export may hold.
    #[error("Export would need {requested} samples per motor (limit {limit})")]
    TooManySamples { requested: f64, limit: usize },
}

/// Failure while reading or writing a document file.
#[derive(Error, Debug)]
pub enum PersistError {
    /// File could not be read or written.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Source IO error
        source: std::io::Error,
    },

    /// Extension does not map to a known format.
    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// JSON encode/decode error.
    #[error("JSON error: {source}")]
    Json {
        /// Source JSON error
        #[from]
        source: serde_json::Error,
    },

    /// TOML decode error.
    #[error("TOML parse error: {source}")]
    TomlDecode {
        /// Source TOML error
        #[from]
        source: toml::de::Error,
    },

    /// TOML encode error.
    #[error("TOML encode error: {source}")]
    TomlEncode {
        /// Source TOML error
        #[from]
        source: toml::ser::Error,
    },

    /// File parsed but its content breaks a model invariant.
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// Sampled export parameters rejected.
    #[error("Export error: {source}")]
    Export {
        /// Source export error
        #[from]
        source: ExportError,
    },
}

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;
