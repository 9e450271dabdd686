//! One motor's motion curve and its constraints.
//!
//! Nodes are kept sorted ascending by time with a stable sort, so nodes that
//! share a time keep their insertion order (a vertical step).
//!
//! Range and ordering are enforced whenever a node is inserted through
//! [`MotorProfile::add_node`] / [`MotorProfile::update_node`] or through a
//! command. Slope is never checked on insert; it is only repaired by the
//! explicit [`MotorProfile::check_all_nodes`] sweep.

use mpo_common::consts::{
    DEFAULT_MAX_SLOPE, DEFAULT_Y_MAX, DEFAULT_Y_MIN, DEGENERATE_EPSILON, SLOPE_EPSILON,
    VALUE_EPSILON,
};
use mpo_common::editor::ProfileDefaults;
use tracing::{debug, warn};

use crate::error::{EditError, EditResult};
use crate::events::{Observers, ProfileEvent, SubscriptionId};
use crate::node::{MotionNode, NodeId};
use crate::palette::Color;

/// A node together with its stable id.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Slot {
    id: NodeId,
    node: MotionNode,
}

/// One motor's curve: ordered nodes plus value and slope constraints.
#[derive(Debug)]
pub struct MotorProfile {
    name: String,
    color: Color,
    slots: Vec<Slot>,
    next_node_id: u64,
    y_min: f64,
    y_max: f64,
    /// Maximum |slope| [value/ms]. Zero allows no slope at all.
    max_slope: f64,
    observers: Observers<ProfileEvent>,
}

impl MotorProfile {
    /// Create an empty profile with the workspace default constraints.
    pub fn new(name: impl Into<String>, color: Color) -> Self {
        Self::with_defaults(
            name,
            color,
            &ProfileDefaults {
                y_min: DEFAULT_Y_MIN,
                y_max: DEFAULT_Y_MAX,
                max_slope: DEFAULT_MAX_SLOPE,
            },
        )
    }

    /// Create an empty profile with configured constraints.
    pub fn with_defaults(name: impl Into<String>, color: Color, defaults: &ProfileDefaults) -> Self {
        Self {
            name: name.into(),
            color,
            slots: Vec::new(),
            next_node_id: 0,
            y_min: defaults.y_min,
            y_max: defaults.y_max,
            max_slope: defaults.max_slope.max(0.0),
            observers: Observers::default(),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    /// Motor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Lower value bound.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Upper value bound.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Maximum |slope| [value/ms].
    pub fn max_slope(&self) -> f64 {
        self.max_slope
    }

    /// `max(|y_min|, |y_max|)`.
    pub fn max_abs_value(&self) -> f64 {
        self.y_min.abs().max(self.y_max.abs())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// No nodes.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Snapshot of the node sequence in time order.
    pub fn nodes(&self) -> Vec<MotionNode> {
        self.iter().collect()
    }

    /// Iterate nodes in time order.
    pub fn iter(&self) -> impl Iterator<Item = MotionNode> + '_ {
        self.slots.iter().map(|s| s.node)
    }

    /// Node at `index`, if any.
    pub fn node_at(&self, index: usize) -> Option<MotionNode> {
        self.slots.get(index).map(|s| s.node)
    }

    /// Stable id of the node currently at `index`.
    pub fn id_at(&self, index: usize) -> Option<NodeId> {
        self.slots.get(index).map(|s| s.id)
    }

    /// Current index of the node with `id`.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.slots.iter().position(|s| s.id == id)
    }

    /// Node with `id`.
    pub fn node(&self, id: NodeId) -> Option<MotionNode> {
        self.slots.iter().find(|s| s.id == id).map(|s| s.node)
    }

    /// Time of the last node, 0 when empty.
    pub fn end_time(&self) -> f64 {
        self.slots.last().map_or(0.0, |s| s.node.time)
    }

    // ─── Constraints ────────────────────────────────────────────────

    /// Set the lower bound. Existing nodes are not touched.
    pub fn set_y_min(&mut self, value: f64) {
        if self.y_min != value {
            self.y_min = value;
            self.observers.emit(&ProfileEvent::ConstraintsChanged);
        }
    }

    /// Set the upper bound. Existing nodes are not touched.
    pub fn set_y_max(&mut self, value: f64) {
        if self.y_max != value {
            self.y_max = value;
            self.observers.emit(&ProfileEvent::ConstraintsChanged);
        }
    }

    /// Set the maximum slope, clamped to `>= 0`.
    pub fn set_max_slope(&mut self, value: f64) {
        let value = value.max(0.0);
        if self.max_slope != value {
            self.max_slope = value;
            self.observers.emit(&ProfileEvent::ConstraintsChanged);
        }
    }

    /// Check a candidate against time and range constraints.
    ///
    /// Slope is deliberately not part of this check.
    pub fn validate(&self, candidate: &MotionNode) -> EditResult<()> {
        if !candidate.is_finite() {
            return Err(EditError::NonFinite {
                time: candidate.time,
                value: candidate.value,
            });
        }
        if candidate.time < 0.0 {
            return Err(EditError::NegativeTime {
                time: candidate.time,
            });
        }
        if candidate.value < self.y_min || candidate.value > self.y_max {
            return Err(EditError::OutOfRange {
                value: candidate.value,
                min: self.y_min,
                max: self.y_max,
            });
        }
        Ok(())
    }

    // ─── Validated mutators (no undo) ───────────────────────────────

    /// Insert a validated node and return its post-sort index.
    pub fn add_node(&mut self, candidate: MotionNode) -> EditResult<usize> {
        if let Err(e) = self.validate(&candidate) {
            debug!("{}: add rejected: {e}", self.name);
            return Err(e);
        }
        let (index, _) = self.internal_add(candidate);
        self.notify_data_changed();
        Ok(index)
    }

    /// Replace the node at `index`, re-validate and re-sort.
    ///
    /// Returns the node's new index.
    pub fn update_node(&mut self, index: usize, candidate: MotionNode) -> EditResult<usize> {
        let id = self.checked_id(index)?;
        if let Err(e) = self.validate(&candidate) {
            debug!("{}: update of node {index} rejected: {e}", self.name);
            return Err(e);
        }
        let new_index = self.internal_move(id, candidate).unwrap_or(index);
        self.notify_data_changed();
        Ok(new_index)
    }

    /// Remove the node at `index`.
    pub fn delete_node(&mut self, index: usize) -> EditResult<MotionNode> {
        let id = self.checked_id(index)?;
        let (_, node) = self
            .internal_remove(id)
            .ok_or(EditError::IndexOutOfBounds {
                index,
                len: self.slots.len(),
            })?;
        self.notify_data_changed();
        Ok(node)
    }

    fn checked_id(&self, index: usize) -> EditResult<NodeId> {
        self.id_at(index).ok_or(EditError::IndexOutOfBounds {
            index,
            len: self.slots.len(),
        })
    }

    // ─── Raw mutators (commands and load only) ──────────────────────
    //
    // None of these validate or notify. Callers validate before and call
    // `notify_data_changed` after.

    fn allocate_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn sort(&mut self) {
        // Stable: equal times keep their current relative order.
        self.slots.sort_by(|a, b| a.node.time.total_cmp(&b.node.time));
    }

    /// Append `node` under a fresh id and re-sort.
    pub(crate) fn internal_add(&mut self, node: MotionNode) -> (usize, NodeId) {
        let id = self.allocate_id();
        self.slots.push(Slot { id, node });
        self.sort();
        let index = self.index_of(id).unwrap_or(self.slots.len() - 1);
        (index, id)
    }

    /// Put `node` back under `id` at exactly `index` (clamped to the end).
    ///
    /// Used to replay or revert a recorded edit without re-sorting, so the
    /// sequence is restored slot for slot.
    pub(crate) fn internal_insert_at(&mut self, index: usize, id: NodeId, node: MotionNode) {
        let index = index.min(self.slots.len());
        self.slots.insert(index, Slot { id, node });
    }

    /// Remove the node with `id`, returning its former index and value.
    pub(crate) fn internal_remove(&mut self, id: NodeId) -> Option<(usize, MotionNode)> {
        let index = self.index_of(id)?;
        let slot = self.slots.remove(index);
        Some((index, slot.node))
    }

    /// Move the node with `id` to `pos` and re-sort. Returns its new index.
    pub(crate) fn internal_move(&mut self, id: NodeId, pos: MotionNode) -> Option<usize> {
        let index = self.index_of(id)?;
        self.slots[index].node = pos;
        self.sort();
        self.index_of(id)
    }

    /// Move the node with `id` to `pos`, placing it at exactly `index`.
    pub(crate) fn internal_place(&mut self, id: NodeId, pos: MotionNode, index: usize) -> bool {
        match self.internal_remove(id) {
            Some(_) => {
                self.internal_insert_at(index, id, pos);
                true
            }
            None => false,
        }
    }

    /// Find the node a caller meant by `index`.
    ///
    /// Returns `index` when the node there still matches `expected`,
    /// otherwise the first node whose coordinates match `expected`.
    pub(crate) fn resolve(&self, index: usize, expected: &MotionNode) -> Option<(usize, NodeId)> {
        if let Some(slot) = self.slots.get(index) {
            if slot.node.approx_eq(expected, VALUE_EPSILON) {
                return Some((index, slot.id));
            }
        }
        let found = self
            .slots
            .iter()
            .position(|s| s.node.approx_eq(expected, VALUE_EPSILON))?;
        warn!(
            "{}: index {index} drifted, re-resolved ({}, {}) at {found}",
            self.name, expected.time, expected.value
        );
        Some((found, self.slots[found].id))
    }

    /// Tell listeners the node sequence changed.
    pub(crate) fn notify_data_changed(&mut self) {
        self.observers.emit(&ProfileEvent::DataChanged);
    }

    // ─── Repair sweep ───────────────────────────────────────────────

    /// Bring every node back inside the current constraints.
    ///
    /// 1. Clamp each value into `[y_min, y_max]`.
    /// 2. One forward pass from index 1: where `|slope|` to the previous
    ///    node exceeds `max_slope`, pull the value back onto the slope
    ///    limit, then re-clamp into range. Pairs with zero time delta are
    ///    skipped.
    ///
    /// Each pair is measured against the already corrected predecessor, so a
    /// correction chases down the curve. The pass is not repeated.
    ///
    /// Emits a single `DataChanged` when anything moved. Returns whether
    /// anything moved.
    pub fn check_all_nodes(&mut self) -> bool {
        let (lo, hi) = (self.y_min, self.y_max);
        let clamp = |v: f64| v.max(lo).min(hi);
        let mut changed = false;

        for slot in self.slots.iter_mut() {
            let clamped = clamp(slot.node.value);
            if clamped != slot.node.value {
                slot.node.value = clamped;
                changed = true;
            }
        }

        let limit = self.max_slope;
        for i in 1..self.slots.len() {
            let prev = self.slots[i - 1].node;
            let curr = self.slots[i].node;
            let dt = curr.time - prev.time;
            if dt.abs() < DEGENERATE_EPSILON {
                continue;
            }
            let slope = (curr.value - prev.value) / dt;
            if slope.abs() > limit + SLOPE_EPSILON {
                self.slots[i].node.value = clamp(prev.value + slope.clamp(-limit, limit) * dt);
                changed = true;
            }
        }

        if changed {
            debug!("{}: repair sweep adjusted nodes", self.name);
            self.notify_data_changed();
        }
        changed
    }

    /// Start indices of segments whose slope exceeds `max_slope`.
    pub fn slope_violations(&self) -> Vec<usize> {
        self.slots
            .windows(2)
            .enumerate()
            .filter_map(|(i, pair)| {
                let dt = pair[1].node.time - pair[0].node.time;
                if dt.abs() < DEGENERATE_EPSILON {
                    return None;
                }
                let slope = (pair[1].node.value - pair[0].node.value) / dt;
                (slope.abs() > self.max_slope + SLOPE_EPSILON).then_some(i)
            })
            .collect()
    }

    /// Indices of nodes outside `[y_min, y_max]`.
    pub fn range_violations(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.node.value < self.y_min || s.node.value > self.y_max)
            .map(|(i, _)| i)
            .collect()
    }

    // ─── Sampling ───────────────────────────────────────────────────

    /// Piecewise-linear value at `time` [ms].
    ///
    /// Holds the first value before the first node and the last value after
    /// the last node. Exactly on a vertical step the earliest node at that
    /// time wins. An empty profile samples as 0.
    pub fn sample_at(&self, time: f64) -> f64 {
        let (Some(first), Some(last)) = (self.slots.first(), self.slots.last()) else {
            return 0.0;
        };
        if time <= first.node.time {
            return first.node.value;
        }
        if time > last.node.time {
            return last.node.value;
        }

        // First node at or after `time`; in 1..len since first < time <= last.
        let upper = self.slots.partition_point(|s| s.node.time < time);
        let next = self.slots[upper].node;
        if next.time <= time {
            return next.value;
        }
        let prev = self.slots[upper - 1].node;
        let span = next.time - prev.time;
        if span.abs() < DEGENERATE_EPSILON {
            return prev.value;
        }
        let t = (time - prev.time) / span;
        prev.value * (1.0 - t) + next.value * t
    }

    // ─── Notification ───────────────────────────────────────────────

    /// Listen for `DataChanged` / `ConstraintsChanged`.
    pub fn subscribe(&mut self, listener: impl FnMut(&ProfileEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    /// Stop listening.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
