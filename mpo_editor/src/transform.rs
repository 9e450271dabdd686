//! Real ⇄ display coordinate mapping and grid snapping.
//!
//! Every profile is drawn so that its larger bound lands on the shared
//! reference line, whatever its real range. Time is never scaled.

use bitflags::bitflags;
use mpo_common::consts::{DEGENERATE_EPSILON, FALLBACK_SCALE_DIVISOR};
use mpo_common::editor::ViewConfig;

use crate::node::MotionNode;
use crate::profile::MotorProfile;

/// Display scale for `profile`: `reference / max(|y_min|, |y_max|)`.
///
/// Falls back to `reference / 100` when there is no profile or its range is
/// degenerate.
pub fn visual_scale(profile: Option<&MotorProfile>, reference: f64) -> f64 {
    match profile {
        Some(p) if p.max_abs_value() > DEGENERATE_EPSILON => reference / p.max_abs_value(),
        _ => reference / FALLBACK_SCALE_DIVISOR,
    }
}

/// Replace a scale of (nearly) zero by 1 so it can be divided by.
#[inline]
pub fn guard_scale(scale: f64) -> f64 {
    if scale.abs() < DEGENERATE_EPSILON || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}

/// Real value to display value.
#[inline]
pub fn to_display(real: f64, scale: f64) -> f64 {
    real * guard_scale(scale)
}

/// Display value to real value.
#[inline]
pub fn to_real(display: f64, scale: f64) -> f64 {
    display / guard_scale(scale)
}

bitflags! {
    /// Axes the grid snaps on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SnapAxes: u8 {
        /// Time axis.
        const X = 0x01;
        /// Value axis.
        const Y = 0x02;
    }
}

/// A point in display space: `x` is time [ms], `y` is the scaled value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Snap grid in display units. A step `<= 0` disables that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub step_x: f64,
    pub step_y: f64,
    pub axes: SnapAxes,
}

impl Grid {
    /// Grid snapping on both axes.
    pub const fn new(step_x: f64, step_y: f64) -> Self {
        Self {
            step_x,
            step_y,
            axes: SnapAxes::all(),
        }
    }

    /// Grid from the view section. Snapping is off unless `view.snap`.
    pub fn from_view(view: &ViewConfig) -> Self {
        Self {
            step_x: view.grid_x,
            step_y: view.grid_y(),
            axes: if view.snap {
                SnapAxes::all()
            } else {
                SnapAxes::empty()
            },
        }
    }

    /// Snap `point` on the enabled axes.
    pub fn snap(&self, point: DisplayPoint) -> DisplayPoint {
        let mut out = point;
        if self.axes.contains(SnapAxes::X) {
            out.x = snap(out.x, self.step_x);
        }
        if self.axes.contains(SnapAxes::Y) {
            out.y = snap(out.y, self.step_y);
        }
        out
    }
}

/// Round `v` to the nearest multiple of `step`. Non-positive steps leave `v`.
#[inline]
pub fn snap(v: f64, step: f64) -> f64 {
    if step > 0.0 {
        (v / step).round() * step
    } else {
        v
    }
}

/// Constrain a dragged display point for `profile`.
///
/// Snaps first (when a grid is given), then clamps `x >= 0` and `y` into the
/// profile's display band `[y_min·scale, y_max·scale]`.
pub fn constrain_display_point(
    point: DisplayPoint,
    profile: &MotorProfile,
    reference: f64,
    grid: Option<&Grid>,
) -> DisplayPoint {
    let scale = guard_scale(visual_scale(Some(profile), reference));
    let mut out = grid.map_or(point, |g| g.snap(point));
    out.x = out.x.max(0.0);
    let lo = profile.y_min() * scale;
    let hi = profile.y_max() * scale;
    out.y = out.y.max(lo.min(hi)).min(hi.max(lo));
    out
}

/// Display point to real node coordinates.
pub fn display_to_node(point: DisplayPoint, profile: &MotorProfile, reference: f64) -> MotionNode {
    let scale = visual_scale(Some(profile), reference);
    MotionNode::new(point.x, to_real(point.y, scale))
}

/// Real node to display point.
pub fn node_to_display(node: &MotionNode, profile: &MotorProfile, reference: f64) -> DisplayPoint {
    let scale = visual_scale(Some(profile), reference);
    DisplayPoint::new(node.time, to_display(node.value, scale))
}

// ─── Tests ──────────────────────────────────────────────────────────
