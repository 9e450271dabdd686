//! On-disk document shapes.
//!
//! A saved document is its id followed by one record per motor, in document
//! order:
//!
//! ```toml
//! id = "default_id"
//!
//! [[motors]]
//! name = "Motor 1"
//! color = "#c83838"
//! y_min = -100.0
//! y_max = 100.0
//! max_slope = 1000.0
//! nodes = [[0.0, 0.0], [2000.0, 50.0]]
//! ```
//!
//! Nodes are written as `[time, value]` pairs. On read a node may also be a
//! table with `time`/`value` or the legacy `x`/`y` keys.

use mpo_common::consts::DEFAULT_DOCUMENT_ID;
use mpo_common::editor::ProfileDefaults;
use serde::{Deserialize, Serialize};

use crate::document::MotionDocument;
use crate::error::{PersistError, PersistResult};
use crate::node::MotionNode;
use crate::palette::{Color, HueSequence};
use crate::profile::MotorProfile;

fn default_document_id() -> String {
    DEFAULT_DOCUMENT_ID.to_string()
}

/// A whole saved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(default = "default_document_id")]
    pub id: String,
    #[serde(default)]
    pub motors: Vec<MotorRecord>,
}

/// One saved motor.
///
/// Constraints and color are optional on read; missing ones come from the
/// configured defaults and the palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_slope: Option<f64>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

/// One saved node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRecord {
    /// `[time, value]`
    Pair([f64; 2]),
    /// `{ time, value }`, or legacy `{ x, y }`
    Keyed {
        #[serde(alias = "x")]
        time: f64,
        #[serde(alias = "y")]
        value: f64,
    },
}

impl NodeRecord {
    pub fn node(&self) -> MotionNode {
        match *self {
            Self::Pair([time, value]) => MotionNode::new(time, value),
            Self::Keyed { time, value } => MotionNode::new(time, value),
        }
    }
}

impl From<MotionNode> for NodeRecord {
    fn from(node: MotionNode) -> Self {
        Self::Pair(node.into())
    }
}

impl DocumentRecord {
    /// Snapshot `doc` for saving.
    pub fn from_document(doc: &MotionDocument, id: &str) -> Self {
        let id = if id.is_empty() {
            default_document_id()
        } else {
            id.to_string()
        };
        let motors = doc.profiles().map(|(_, p)| MotorRecord::from_profile(p)).collect();
        Self { id, motors }
    }

    /// Build every profile, failing on the first malformed motor.
    ///
    /// Nodes outside the stored range are kept as they are; a later repair
    /// sweep brings them back. Negative or non-finite times are rejected.
    pub fn into_profiles(
        self,
        defaults: &ProfileDefaults,
        palette: &mut HueSequence,
    ) -> PersistResult<(String, Vec<MotorProfile>)> {
        let profiles = self
            .motors
            .into_iter()
            .map(|m| m.into_profile(defaults, palette))
            .collect::<PersistResult<Vec<_>>>()?;
        Ok((self.id, profiles))
    }
}

impl MotorRecord {
    pub fn from_profile(profile: &MotorProfile) -> Self {
        Self {
            name: profile.name().to_string(),
            color: Some(profile.color()),
            y_min: Some(profile.y_min()),
            y_max: Some(profile.y_max()),
            max_slope: Some(profile.max_slope()),
            nodes: profile.iter().map(NodeRecord::from).collect(),
        }
    }

    fn into_profile(
        self,
        defaults: &ProfileDefaults,
        palette: &mut HueSequence,
    ) -> PersistResult<MotorProfile> {
        let limits = ProfileDefaults {
            y_min: finite(&self.name, "y_min", self.y_min.unwrap_or(defaults.y_min))?,
            y_max: finite(&self.name, "y_max", self.y_max.unwrap_or(defaults.y_max))?,
            max_slope: finite(
                &self.name,
                "max_slope",
                self.max_slope.unwrap_or(defaults.max_slope),
            )?,
        };
        let color = match self.color {
            Some(c) => c,
            None => palette.next().unwrap_or(Color::GRAY),
        };
        let mut profile = MotorProfile::with_defaults(self.name, color, &limits);
        for (i, record) in self.nodes.iter().enumerate() {
            let node = record.node();
            if !node.is_finite() || node.time < 0.0 {
                return Err(PersistError::Malformed(format!(
                    "motor '{}' node {i}: ({}, {}) is not a valid point",
                    profile.name(),
                    node.time,
                    node.value
                )));
            }
            profile.internal_add(node);
        }
        Ok(profile)
    }
}

fn finite(motor: &str, field: &str, v: f64) -> PersistResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PersistError::Malformed(format!(
            "motor '{motor}': {field} {v} is not finite"
        )))
    }
}

// ─── Sampled export ─────────────────────────────────────────────────

/// Every motor sampled on a fixed time grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledDocument {
    pub id: String,
    pub sample_rate_hz: f64,
    pub end_time_ms: f64,
    pub motors: Vec<SampledMotor>,
}

/// One motor's `[time, value]` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledMotor {
    pub name: String,
    pub samples: Vec<[f64; 2]>,
}
