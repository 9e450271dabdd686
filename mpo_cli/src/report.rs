//! Document summaries for `mpo info`.

use std::fmt;

use mpo_editor::MotionDocument;
use serde::Serialize;

/// Per-motor facts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotorSummary {
    pub name: String,
    pub color: String,
    pub nodes: usize,
    pub end_time_ms: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub max_slope: f64,
    /// Indices of nodes outside `[y_min, y_max]`.
    pub range_violations: Vec<usize>,
    /// Start indices of segments steeper than `max_slope`.
    pub slope_violations: Vec<usize>,
}

/// Whole-document facts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub active: Option<String>,
    pub end_time_ms: f64,
    pub motors: Vec<MotorSummary>,
}

impl DocumentSummary {
    pub fn new(doc: &MotionDocument, id: &str) -> Self {
        let motors = doc
            .profiles()
            .map(|(_, p)| MotorSummary {
                name: p.name().to_string(),
                color: p.color().to_string(),
                nodes: p.len(),
                end_time_ms: p.end_time(),
                y_min: p.y_min(),
                y_max: p.y_max(),
                max_slope: p.max_slope(),
                range_violations: p.range_violations(),
                slope_violations: p.slope_violations(),
            })
            .collect();
        Self {
            id: id.to_string(),
            active: doc.active_profile().map(|p| p.name().to_string()),
            end_time_ms: doc.max_end_time(),
            motors,
        }
    }

    /// Whether any motor breaks its constraints.
    pub fn has_violations(&self) -> bool {
        self.motors
            .iter()
            .any(|m| !m.range_violations.is_empty() || !m.slope_violations.is_empty())
    }
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "id: {}", self.id)?;
        writeln!(f, "motors: {}", self.motors.len())?;
        writeln!(f, "end time: {} ms", self.end_time_ms)?;
        for m in &self.motors {
            let marker = if self.active.as_deref() == Some(m.name.as_str()) {
                "*"
            } else {
                " "
            };
            writeln!(
                f,
                "{marker} {:<16} {} nodes={:<5} range=[{}, {}] slope<={} end={} ms",
                m.name, m.color, m.nodes, m.y_min, m.y_max, m.max_slope, m.end_time_ms
            )?;
            if !m.range_violations.is_empty() {
                writeln!(f, "    out of range: {:?}", m.range_violations)?;
            }
            if !m.slope_violations.is_empty() {
                writeln!(f, "    too steep:    {:?}", m.slope_violations)?;
            }
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mpo_editor::palette::Color;
    use mpo_editor::MotionNode;

    #[test]
    fn summary_flags_violations() {
        let mut doc = MotionDocument::new();
        let id = doc.add_motor("lift", Color::RED);
        doc.set_active_motor(Some(id));
        let p = doc.profile_mut(id).unwrap();
        p.add_node(MotionNode::new(0.0, 0.0)).unwrap();
        p.add_node(MotionNode::new(10.0, 90.0)).unwrap();
        p.set_max_slope(1.0);
        p.set_y_max(50.0);

        let summary = DocumentSummary::new(&doc, "doc");
        assert!(summary.has_violations());
        assert_eq!(summary.motors[0].range_violations, [1]);
        assert_eq!(summary.motors[0].slope_violations, [0]);
        assert_eq!(summary.active.as_deref(), Some("lift"));

        let text = summary.to_string();
        assert!(text.contains("* lift"));
        assert!(text.contains("too steep"));
    }
}
