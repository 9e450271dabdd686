//! Motion nodes and their stable identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One vertex of a piecewise-linear curve: `time` [ms] and `value`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionNode {
    /// Time [ms], never negative once accepted into a profile.
    pub time: f64,
    /// Actuator value in profile units.
    pub value: f64,
}

impl MotionNode {
    /// Create a node.
    #[inline]
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }

    /// Both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.value.is_finite()
    }

    /// Coordinate-wise comparison within `eps`.
    #[inline]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        (self.time - other.time).abs() <= eps && (self.value - other.value).abs() <= eps
    }
}

impl From<(f64, f64)> for MotionNode {
    fn from((time, value): (f64, f64)) -> Self {
        Self { time, value }
    }
}

impl From<MotionNode> for [f64; 2] {
    fn from(node: MotionNode) -> Self {
        [node.time, node.value]
    }
}

/// Stable identity of a node inside one profile.
///
/// Unlike an index, a `NodeId` survives the re-sort that follows every add
/// or move. Ids are never reused within a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_tolerates_small_drift() {
        let a = MotionNode::new(1000.0, 25.0);
        assert!(a.approx_eq(&MotionNode::new(1000.0 + 1e-9, 25.0 - 1e-9), 1e-6));
        assert!(!a.approx_eq(&MotionNode::new(1000.1, 25.0), 1e-6));
    }

    #[test]
    fn non_finite_detected() {
        assert!(MotionNode::new(0.0, 0.0).is_finite());
        assert!(!MotionNode::new(f64::NAN, 0.0).is_finite());
        assert!(!MotionNode::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn pair_conversions() {
        let node: MotionNode = (5.0, -2.0).into();
        let pair: [f64; 2] = node.into();
        assert_eq!(pair, [5.0, -2.0]);
    }
}
