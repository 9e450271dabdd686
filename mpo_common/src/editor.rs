//! Editor configuration sections.
//!
//! Loaded from `mpo.toml` through [`ConfigLoader`](crate::config::ConfigLoader).
//! Every section is optional and falls back to the constants in
//! [`consts`](crate::consts), so an empty file is a valid configuration.
//!
//! ```toml
//! [shared]
//! log_level = "debug"
//!
//! [profile_defaults]
//! y_min = -250.0
//! y_max = 250.0
//! max_slope = 2.5
//!
//! [view]
//! reference_value = 100.0
//! grid_x = 50.0
//! snap = true
//!
//! [history]
//! max_depth = 500
//!
//! [export]
//! sample_rate_hz = 200.0
//! document_id = "arm_sequence"
//!
//! [palette]
//! seed = 7
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{
    DEFAULT_DOCUMENT_ID, DEFAULT_GRID_X_MS, DEFAULT_HISTORY_DEPTH, DEFAULT_MAX_SLOPE,
    DEFAULT_REFERENCE_VALUE, DEFAULT_SAMPLE_RATE_HZ, DEFAULT_Y_MAX, DEFAULT_Y_MIN,
};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Logging and instance identity.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Constraints applied to newly created motors.
    #[serde(default)]
    pub profile_defaults: ProfileDefaults,
    /// Display scaling and grid.
    #[serde(default)]
    pub view: ViewConfig,
    /// Undo history limits.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Sampled export parameters.
    #[serde(default)]
    pub export: ExportConfig,
    /// Motor color sequence.
    #[serde(default)]
    pub palette: PaletteConfig,
}

impl EditorConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::ValidationError` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.profile_defaults.validate()?;
        self.view.validate()?;
        self.export.validate()?;
        self.palette.validate()?;
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::ValidationError(msg)
}

// ─── Profile Defaults ───────────────────────────────────────────────

/// Constraints given to a motor when it is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    /// Lower value bound.
    #[serde(default = "default_y_min")]
    pub y_min: f64,
    /// Upper value bound.
    #[serde(default = "default_y_max")]
    pub y_max: f64,
    /// Maximum slope [value/ms].
    #[serde(default = "default_max_slope")]
    pub max_slope: f64,
}

fn default_y_min() -> f64 {
    DEFAULT_Y_MIN
}
fn default_y_max() -> f64 {
    DEFAULT_Y_MAX
}
fn default_max_slope() -> f64 {
    DEFAULT_MAX_SLOPE
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            y_min: DEFAULT_Y_MIN,
            y_max: DEFAULT_Y_MAX,
            max_slope: DEFAULT_MAX_SLOPE,
        }
    }
}

impl ProfileDefaults {
    /// Validate bounds ordering and slope sign.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.y_min.is_finite() || !self.y_max.is_finite() || self.y_min > self.y_max {
            return Err(invalid(format!(
                "profile_defaults: y_min {} must not exceed y_max {}",
                self.y_min, self.y_max
            )));
        }
        if !self.max_slope.is_finite() || self.max_slope < 0.0 {
            return Err(invalid(format!(
                "profile_defaults: max_slope {} must be >= 0",
                self.max_slope
            )));
        }
        Ok(())
    }
}

// ─── View ───────────────────────────────────────────────────────────

/// Display scaling and grid snapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Real value mapped to the edge of the view.
    #[serde(default = "default_reference_value")]
    pub reference_value: f64,
    /// Horizontal grid step [ms].
    #[serde(default = "default_grid_x")]
    pub grid_x: f64,
    /// Vertical grid step in display units; `reference_value / 10` when unset.
    #[serde(default)]
    pub grid_y: Option<f64>,
    /// Snap edited nodes to the grid.
    #[serde(default)]
    pub snap: bool,
}

fn default_reference_value() -> f64 {
    DEFAULT_REFERENCE_VALUE
}
fn default_grid_x() -> f64 {
    DEFAULT_GRID_X_MS
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            reference_value: DEFAULT_REFERENCE_VALUE,
            grid_x: DEFAULT_GRID_X_MS,
            grid_y: None,
            snap: false,
        }
    }
}

impl ViewConfig {
    /// Effective vertical grid step.
    pub fn grid_y(&self) -> f64 {
        self.grid_y.unwrap_or(self.reference_value / 10.0)
    }

    /// Validate scaling parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.reference_value > 0.0) || !self.reference_value.is_finite() {
            return Err(invalid(format!(
                "view: reference_value {} must be > 0",
                self.reference_value
            )));
        }
        if !(self.grid_x > 0.0) {
            return Err(invalid(format!("view: grid_x {} must be > 0", self.grid_x)));
        }
        if let Some(step) = self.grid_y {
            if !(step > 0.0) {
                return Err(invalid(format!("view: grid_y {step} must be > 0")));
            }
        }
        Ok(())
    }
}

// ─── History ────────────────────────────────────────────────────────

/// Undo history limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept (0 = unlimited).
    #[serde(default = "default_history_depth")]
    pub max_depth: usize,
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

impl HistoryConfig {
    /// Unlimited history.
    pub const fn unlimited() -> Self {
        Self { max_depth: 0 }
    }
}

// ─── Export ─────────────────────────────────────────────────────────

/// Sampled export parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Sample rate [Hz].
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: f64,
    /// End time [ms]; derived from the document when unset.
    #[serde(default)]
    pub end_time_ms: Option<f64>,
    /// Id written into saved and exported documents.
    #[serde(default = "default_document_id")]
    pub document_id: String,
}

fn default_sample_rate() -> f64 {
    DEFAULT_SAMPLE_RATE_HZ
}
fn default_document_id() -> String {
    DEFAULT_DOCUMENT_ID.to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            end_time_ms: None,
            document_id: default_document_id(),
        }
    }
}

impl ExportConfig {
    /// Validate export parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate_hz > 0.0) || !self.sample_rate_hz.is_finite() {
            return Err(invalid(format!(
                "export: sample_rate_hz {} must be > 0",
                self.sample_rate_hz
            )));
        }
        if let Some(end) = self.end_time_ms {
            if !(end >= 0.0) {
                return Err(invalid(format!("export: end_time_ms {end} must be >= 0")));
            }
        }
        if self.document_id.is_empty() {
            return Err(invalid("export: document_id cannot be empty".to_string()));
        }
        Ok(())
    }
}

// ─── Palette ────────────────────────────────────────────────────────

/// Deterministic motor color sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Starting offset into the hue sequence.
    #[serde(default)]
    pub seed: u64,
    /// HSV saturation in `[0, 1]`.
    #[serde(default = "default_saturation")]
    pub saturation: f64,
    /// HSV value in `[0, 1]`.
    #[serde(default = "default_saturation")]
    pub value: f64,
}

fn default_saturation() -> f64 {
    200.0 / 255.0
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            saturation: default_saturation(),
            value: default_saturation(),
        }
    }
}

impl PaletteConfig {
    /// Validate HSV components.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, v) in [("saturation", self.saturation), ("value", self.value)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(format!("palette: {name} {v} must lie in [0, 1]")));
            }
        }
        Ok(())
    }
}
