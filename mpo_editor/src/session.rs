//! Editing session: one document, its undo history and the settings that
//! drive them.
//!
//! All node edits go through the history here, so the two can never drift
//! apart. Loading clears the history; removing a motor drops that motor's
//! history steps.

use std::path::Path;

use mpo_common::consts::VALUE_EPSILON;
use mpo_common::editor::EditorConfig;
use tracing::{debug, info};

use crate::command::{Command, CommandStack, PushOutcome};
use crate::document::{MotionDocument, ProfileId};
use crate::error::{EditError, EditResult, PersistResult};
use crate::export::{self, ExportRequest};
use crate::node::MotionNode;
use crate::palette::HueSequence;
use crate::profile::MotorProfile;
use crate::transform::{self, DisplayPoint, Grid};

/// Document, history and configuration bundled for a front end.
#[derive(Debug)]
pub struct Session {
    document: MotionDocument,
    history: CommandStack,
    palette: HueSequence,
    config: EditorConfig,
    document_id: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Session {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            document: MotionDocument::new(),
            history: CommandStack::new(&config.history),
            palette: HueSequence::new(&config.palette),
            document_id: config.export.document_id.clone(),
            config,
        }
    }

    pub fn document(&self) -> &MotionDocument {
        &self.document
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Id written on save and export.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn set_document_id(&mut self, id: impl Into<String>) {
        self.document_id = id.into();
    }

    // ─── Motors ─────────────────────────────────────────────────────

    /// Add a motor with the next palette color and a single `(0, 0)` node,
    /// and make it active. Not undoable.
    pub fn add_motor(&mut self, name: impl Into<String>) -> ProfileId {
        let color = self.palette.next().unwrap_or_default();
        let id = self
            .document
            .add_motor_with(name, color, &self.config.profile_defaults);
        if let Some(profile) = self.document.profile_mut(id) {
            profile.internal_add(MotionNode::default());
            profile.notify_data_changed();
        }
        self.document.set_active_motor(Some(id));
        id
    }

    /// Remove a motor together with its history steps.
    pub fn remove_motor(&mut self, id: ProfileId) -> Option<MotorProfile> {
        self.history.purge_profile(id);
        self.document.remove_motor(id)
    }

    pub fn set_active_motor(&mut self, id: Option<ProfileId>) -> bool {
        self.document.set_active_motor(id)
    }

    /// Change a motor's constraints. Nodes are left as they are until
    /// [`Session::repair`] runs.
    pub fn set_constraints(
        &mut self,
        id: ProfileId,
        y_min: f64,
        y_max: f64,
        max_slope: f64,
    ) -> EditResult<()> {
        let profile = self.profile_mut(id)?;
        profile.set_y_min(y_min);
        profile.set_y_max(y_max);
        profile.set_max_slope(max_slope);
        Ok(())
    }

    /// Run the repair sweep on one motor. Returns whether anything moved.
    ///
    /// The sweep is not undoable, so the history is sealed against merging
    /// across it.
    pub fn repair(&mut self, id: ProfileId) -> EditResult<bool> {
        let changed = self.profile_mut(id)?.check_all_nodes();
        self.history.seal();
        Ok(changed)
    }

    fn profile(&self, id: ProfileId) -> EditResult<&MotorProfile> {
        self.document.profile(id).ok_or(EditError::UnknownProfile(id))
    }

    fn profile_mut(&mut self, id: ProfileId) -> EditResult<&mut MotorProfile> {
        self.document
            .profile_mut(id)
            .ok_or(EditError::UnknownProfile(id))
    }

    fn node_at(&self, id: ProfileId, index: usize) -> EditResult<MotionNode> {
        let profile = self.profile(id)?;
        profile.node_at(index).ok_or(EditError::IndexOutOfBounds {
            index,
            len: profile.len(),
        })
    }

    // ─── Node edits ─────────────────────────────────────────────────

    /// Push any command.
    pub fn push(&mut self, cmd: Command) -> EditResult<PushOutcome> {
        self.history.push(&mut self.document, cmd)
    }

    /// Add a node. Returns its index after sorting.
    pub fn add_node(&mut self, id: ProfileId, node: MotionNode) -> EditResult<usize> {
        self.push(Command::add(id, node))?;
        match self.history.last() {
            Some(Command::Add(add)) => add.index(),
            _ => None,
        }
        .ok_or(EditError::StaleNode {
            index: 0,
            time: node.time,
            value: node.value,
        })
    }

    /// Delete the node currently at `index`.
    pub fn delete_node(&mut self, id: ProfileId, index: usize) -> EditResult<()> {
        let expected = self.node_at(id, index)?;
        self.push(Command::delete(id, index, expected)).map(|_| ())
    }

    /// Move the node at `index` to `new`. Consecutive moves of the same node
    /// merge into one undo step until [`Session::end_gesture`].
    pub fn move_node(
        &mut self,
        id: ProfileId,
        index: usize,
        new: MotionNode,
    ) -> EditResult<PushOutcome> {
        let old = self.node_at(id, index)?;
        self.push(Command::move_node(id, index, old, new))
    }

    /// Set exact coordinates for the node at `index` as one standalone step.
    ///
    /// Returns `false` without touching anything when `new` is within
    /// rounding of the current position.
    pub fn apply_node_coords(
        &mut self,
        id: ProfileId,
        index: usize,
        new: MotionNode,
    ) -> EditResult<bool> {
        let old = self.node_at(id, index)?;
        if old.approx_eq(&new, VALUE_EPSILON) {
            return Ok(false);
        }
        self.history.seal();
        self.push(Command::move_node(id, index, old, new))?;
        self.history.seal();
        Ok(true)
    }

    /// Drag the node at `index` to a display-space point.
    ///
    /// The point is snapped (when the view enables it) and clamped into the
    /// motor's band before conversion, so the move cannot be rejected for
    /// range. Returns the node's index after sorting.
    pub fn drag_node(
        &mut self,
        id: ProfileId,
        index: usize,
        point: DisplayPoint,
    ) -> EditResult<usize> {
        let reference = self.config.view.reference_value;
        let grid = Grid::from_view(&self.config.view);
        let profile = self.profile(id)?;
        let constrained = transform::constrain_display_point(point, profile, reference, Some(&grid));
        let target = transform::display_to_node(constrained, profile, reference);
        // Absorb rounding from the display round trip at the band edges.
        let value = target.value.max(profile.y_min()).min(profile.y_max());
        let target = MotionNode::new(target.time, value);
        self.move_node(id, index, target)?;
        let profile = self.profile(id)?;
        Ok(profile
            .iter()
            .position(|n| n == target)
            .unwrap_or(index.min(profile.len().saturating_sub(1))))
    }

    /// End the current drag: the next move starts a new undo step.
    pub fn end_gesture(&mut self) {
        self.history.seal();
    }

    // ─── History ────────────────────────────────────────────────────

    pub fn undo(&mut self) -> EditResult<&'static str> {
        self.history.undo(&mut self.document)
    }

    pub fn redo(&mut self) -> EditResult<&'static str> {
        self.history.redo(&mut self.document)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_text(&self) -> Option<&'static str> {
        self.history.undo_text()
    }

    pub fn redo_text(&self) -> Option<&'static str> {
        self.history.redo_text()
    }

    // ─── Files ──────────────────────────────────────────────────────

    /// Replace the document from `path` and clear the history.
    ///
    /// On error nothing changes, history included.
    pub fn load(&mut self, path: &Path) -> PersistResult<()> {
        let id = self.document.load_from_file(
            path,
            &self.config.profile_defaults,
            &mut self.palette,
        )?;
        self.history.clear();
        debug!("History cleared after load of '{id}'");
        self.document_id = id;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> PersistResult<()> {
        self.document.save_to_file(path, &self.document_id)
    }

    /// Export samples with the configured rate and end time.
    pub fn export(&self, path: &Path) -> PersistResult<()> {
        let mut request = ExportRequest::from_config(&self.config.export, &self.document);
        request.id = self.document_id.clone();
        self.export_with(path, &request)
    }

    pub fn export_with(&self, path: &Path, request: &ExportRequest) -> PersistResult<()> {
        info!("Exporting '{}' to {}", request.id, path.display());
        export::write_samples(&self.document, request, path)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
