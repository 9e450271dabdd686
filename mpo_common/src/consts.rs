//! Workspace-wide constants.
//!
//! Single source of truth for default constraints, view scaling and export
//! parameters. Imported by all crates.

/// Default lower value bound for a new motor profile.
pub const DEFAULT_Y_MIN: f64 = -100.0;

/// Default upper value bound for a new motor profile.
pub const DEFAULT_Y_MAX: f64 = 100.0;

/// Default maximum slope [value/ms] for a new motor profile.
pub const DEFAULT_MAX_SLOPE: f64 = 1000.0;

/// Real value mapped to the top/bottom of the view by default.
pub const DEFAULT_REFERENCE_VALUE: f64 = 100.0;

/// Divisor used for the visual scale when a profile has no usable range.
pub const FALLBACK_SCALE_DIVISOR: f64 = 100.0;

/// Default horizontal grid step [ms].
pub const DEFAULT_GRID_X_MS: f64 = 50.0;

/// Default sample rate for sampled export [Hz].
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 100.0;

/// Upper bound on samples per motor in one export.
pub const MAX_EXPORT_SAMPLES: usize = 10_000_000;

/// Minimum default end time offered for sampled export [ms].
pub const DEFAULT_MIN_EXPORT_END_MS: f64 = 2000.0;

/// Document id written when the caller supplies none.
pub const DEFAULT_DOCUMENT_ID: &str = "default_id";

/// Default undo history depth.
pub const DEFAULT_HISTORY_DEPTH: usize = 200;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "mpo.toml";

/// Tolerance for treating a time delta or a scale as zero.
pub const DEGENERATE_EPSILON: f64 = 1e-9;

/// Tolerance for slope comparisons in the repair sweep.
pub const SLOPE_EPSILON: f64 = 1e-9;

/// Tolerance for matching a node by its coordinates and for treating a
/// coordinate edit as a no-op.
pub const VALUE_EPSILON: f64 = 1e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert!(DEFAULT_Y_MIN <= DEFAULT_Y_MAX);
        assert!(DEFAULT_MAX_SLOPE >= 0.0);
        assert!(DEFAULT_REFERENCE_VALUE > 0.0);
        assert!(FALLBACK_SCALE_DIVISOR > 0.0);
        assert!(DEFAULT_SAMPLE_RATE_HZ > 0.0);
        assert!(MAX_EXPORT_SAMPLES > 1);
        assert!(!DEFAULT_DOCUMENT_ID.is_empty());
    }

    #[test]
    fn tolerances_are_small() {
        assert!(DEGENERATE_EPSILON < VALUE_EPSILON);
        assert!(SLOPE_EPSILON > 0.0);
    }
}
