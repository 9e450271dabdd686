//! Fixed-rate sampling of every motor for playback hardware.

use std::path::Path;

use mpo_common::consts::{
    DEFAULT_DOCUMENT_ID, DEFAULT_MIN_EXPORT_END_MS, DEFAULT_SAMPLE_RATE_HZ, MAX_EXPORT_SAMPLES,
};
use mpo_common::editor::ExportConfig;
use tracing::info;

use crate::document::MotionDocument;
use crate::error::{ExportError, PersistResult};
use crate::persist::{self, SampledDocument, SampledMotor};

/// Times closer than this to `end` count as landing on it.
const END_EPSILON_MS: f64 = 1e-9;

/// What to sample and for how long.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub id: String,
    pub sample_rate_hz: f64,
    /// Last sample time [ms].
    pub end_time_ms: f64,
}

impl ExportRequest {
    /// Request from configuration. Without a configured end time the
    /// document's [`MotionDocument::max_end_time`] is used.
    pub fn from_config(config: &ExportConfig, doc: &MotionDocument) -> Self {
        Self {
            id: config.document_id.clone(),
            sample_rate_hz: config.sample_rate_hz,
            end_time_ms: config.end_time_ms.unwrap_or_else(|| doc.max_end_time()),
        }
    }
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            id: DEFAULT_DOCUMENT_ID.to_string(),
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            end_time_ms: DEFAULT_MIN_EXPORT_END_MS,
        }
    }
}

/// Sample times `0, Δt, 2Δt, …` below `end`, then `end` itself.
///
/// `Δt = 1000 / rate` ms. Times are computed as `k·Δt` so error does not
/// accumulate. The last sample is always exactly `end`, whether or not it
/// lies on the grid; `end = 0` yields the single sample `0`.
///
/// More than [`MAX_EXPORT_SAMPLES`] samples is rejected before anything is
/// allocated.
pub fn sample_times(sample_rate_hz: f64, end_time_ms: f64) -> Result<Vec<f64>, ExportError> {
    if !(sample_rate_hz > 0.0) || !sample_rate_hz.is_finite() {
        return Err(ExportError::InvalidSampleRate(sample_rate_hz));
    }
    if !(end_time_ms >= 0.0) || !end_time_ms.is_finite() {
        return Err(ExportError::InvalidEndTime(end_time_ms));
    }
    let dt = 1000.0 / sample_rate_hz;
    let requested = (end_time_ms / dt).ceil() + 1.0;
    if !(requested <= MAX_EXPORT_SAMPLES as f64) {
        return Err(ExportError::TooManySamples {
            requested,
            limit: MAX_EXPORT_SAMPLES,
        });
    }
    let mut times = Vec::with_capacity(requested as usize);
    let last = end_time_ms - END_EPSILON_MS;
    if last > 0.0 {
        times.push(0.0);
        // `dt` may be infinite for vanishing rates; `k·dt` then jumps past `last`.
        for k in 1u64.. {
            let t = k as f64 * dt;
            if t >= last {
                break;
            }
            times.push(t);
        }
    }
    times.push(end_time_ms);
    Ok(times)
}

/// Sample every profile of `doc` on the grid of `request`.
pub fn sample_document(
    doc: &MotionDocument,
    request: &ExportRequest,
) -> Result<SampledDocument, ExportError> {
    let times = sample_times(request.sample_rate_hz, request.end_time_ms)?;
    let motors = doc
        .profiles()
        .map(|(_, p)| SampledMotor {
            name: p.name().to_string(),
            samples: times.iter().map(|&t| [t, p.sample_at(t)]).collect(),
        })
        .collect();
    Ok(SampledDocument {
        id: request.id.clone(),
        sample_rate_hz: request.sample_rate_hz,
        end_time_ms: request.end_time_ms,
        motors,
    })
}

/// Sample `doc` and write the result to `path` (format by extension).
pub fn write_samples(doc: &MotionDocument, request: &ExportRequest, path: &Path) -> PersistResult<()> {
    let sampled = sample_document(doc, request)?;
    persist::write_encoded(path, &sampled)?;
    info!(
        "Exported {} motors at {} Hz to {}",
        sampled.motors.len(),
        request.sample_rate_hz,
        path.display()
    );
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MotionNode;
    use crate::palette::Color;

    #[test]
    fn grid_with_exact_end() {
        assert_eq!(sample_times(100.0, 50.0).unwrap(), [0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn off_grid_end_is_appended() {
        assert_eq!(sample_times(100.0, 25.0).unwrap(), [0.0, 10.0, 20.0, 25.0]);
    }

    #[test]
    fn zero_end_is_single_sample() {
        assert_eq!(sample_times(100.0, 0.0).unwrap(), [0.0]);
    }

    #[test]
    fn invalid_parameters() {
        assert_eq!(sample_times(0.0, 10.0), Err(ExportError::InvalidSampleRate(0.0)));
        assert_eq!(sample_times(-5.0, 10.0), Err(ExportError::InvalidSampleRate(-5.0)));
        assert_eq!(sample_times(100.0, -1.0), Err(ExportError::InvalidEndTime(-1.0)));
        assert!(sample_times(f64::NAN, 10.0).is_err());
    }

    #[test]
    fn extreme_rate_is_rejected_not_allocated() {
        assert!(matches!(
            sample_times(1e300, 1.0),
            Err(ExportError::TooManySamples { limit: MAX_EXPORT_SAMPLES, .. })
        ));
        assert!(matches!(
            sample_times(1e9, 1e9),
            Err(ExportError::TooManySamples { .. })
        ));
        // Vanishing rate: one step covers everything.
        assert_eq!(sample_times(f64::MIN_POSITIVE, 30.0).unwrap(), [0.0, 30.0]);
    }

    #[test]
    fn samples_every_motor() {
        let mut doc = MotionDocument::new();
        let a = doc.add_motor("a", Color::RED);
        doc.add_motor("empty", Color::GRAY);
        let p = doc.profile_mut(a).unwrap();
        p.add_node(MotionNode::new(0.0, 0.0)).unwrap();
        p.add_node(MotionNode::new(2000.0, 50.0)).unwrap();

        let request = ExportRequest {
            id: "x".into(),
            sample_rate_hz: 1.0,
            end_time_ms: 2500.0,
        };
        let out = sample_document(&doc, &request).unwrap();
        assert_eq!(out.motors.len(), 2);
        assert_eq!(
            out.motors[0].samples,
            [[0.0, 0.0], [1000.0, 25.0], [2000.0, 50.0], [2500.0, 50.0]]
        );
        assert!(out.motors[1].samples.iter().all(|s| s[1] == 0.0));
    }

    #[test]
    fn request_defaults_end_to_document() {
        let doc = MotionDocument::new();
        let request = ExportRequest::from_config(&ExportConfig::default(), &doc);
        assert_eq!(request.end_time_ms, 2000.0);
        assert_eq!(request.id, "default_id");
    }
}
