//! Undo/redo history.
//!
//! ```text
//! push(c5)            undo ×2              push(c6)
//! undo: [c1..c5]      undo: [c1 c2 c3]     undo: [c1 c2 c3 c6]
//! redo: []            redo: [c5 c4]        redo: []
//! ```
//!
//! # Invariants
//!
//! 1. A command is on the undo stack only if its edit is currently applied.
//! 2. The redo stack is cleared whenever a new command is pushed.
//! 3. `undo_depth() <= max_depth` after every operation (0 = unlimited).

use std::collections::VecDeque;
use std::fmt;

use mpo_common::editor::HistoryConfig;
use tracing::{debug, warn};

use super::Command;
use crate::document::{MotionDocument, ProfileId};
use crate::error::{EditError, EditResult};

/// Result of a successful [`CommandStack::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Recorded as a new undo step.
    Pushed,
    /// Folded into the previous step.
    Merged,
}

/// Linear undo/redo history of [`Command`]s.
pub struct CommandStack {
    /// Applied commands, newest at back.
    undo_stack: VecDeque<Command>,
    /// Undone commands, next redo at back.
    redo_stack: Vec<Command>,
    /// 0 = unlimited.
    max_depth: usize,
    /// Blocks merging into the current top.
    sealed: bool,
}

impl fmt::Debug for CommandStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStack")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl CommandStack {
    pub fn new(config: &HistoryConfig) -> Self {
        Self::with_max_depth(config.max_depth)
    }

    /// History keeping at most `max_depth` steps (0 = unlimited).
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth,
            sealed: false,
        }
    }

    // ─── Core operations ────────────────────────────────────────────

    /// Apply `cmd` to `doc` and record it.
    ///
    /// A rejected command leaves the document and the history untouched,
    /// redo tail included. An accepted one drops the redo tail, then either
    /// merges into the top step or becomes a new step.
    pub fn push(&mut self, doc: &mut MotionDocument, mut cmd: Command) -> EditResult<PushOutcome> {
        if let Err(e) = cmd.apply(doc) {
            debug!("{} rejected: {e}", cmd.description());
            return Err(e);
        }
        self.redo_stack.clear();

        let merged = !self.sealed
            && self
                .undo_stack
                .back_mut()
                .is_some_and(|top| top.try_merge(&cmd));
        self.sealed = false;
        if merged {
            return Ok(PushOutcome::Merged);
        }

        self.undo_stack.push_back(cmd);
        self.enforce_depth();
        Ok(PushOutcome::Pushed)
    }

    /// Revert the newest step.
    ///
    /// On failure the step stays on the undo stack.
    pub fn undo(&mut self, doc: &mut MotionDocument) -> EditResult<&'static str> {
        let mut cmd = self.undo_stack.pop_back().ok_or(EditError::NothingToUndo)?;
        let description = cmd.description();
        match cmd.invert(doc) {
            Ok(()) => {
                self.redo_stack.push(cmd);
                self.sealed = true;
                Ok(description)
            }
            Err(e) => {
                warn!("Undo of '{description}' failed: {e}");
                self.undo_stack.push_back(cmd);
                Err(e)
            }
        }
    }

    /// Re-apply the most recently undone step.
    ///
    /// On failure the step stays on the redo stack.
    pub fn redo(&mut self, doc: &mut MotionDocument) -> EditResult<&'static str> {
        let mut cmd = self.redo_stack.pop().ok_or(EditError::NothingToRedo)?;
        let description = cmd.description();
        match cmd.apply(doc) {
            Ok(()) => {
                self.undo_stack.push_back(cmd);
                self.sealed = true;
                self.enforce_depth();
                Ok(description)
            }
            Err(e) => {
                warn!("Redo of '{description}' failed: {e}");
                self.redo_stack.push(cmd);
                Err(e)
            }
        }
    }

    /// Stop the next push from merging into the current top step.
    ///
    /// Call at the end of a drag gesture.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    // ─── Info ───────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the step `undo` would revert.
    pub fn undo_text(&self) -> Option<&'static str> {
        self.undo_stack.back().map(Command::description)
    }

    /// Label of the step `redo` would re-apply.
    pub fn redo_text(&self) -> Option<&'static str> {
        self.redo_stack.last().map(Command::description)
    }

    /// The step `undo` would revert.
    pub fn last(&self) -> Option<&Command> {
        self.undo_stack.back()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // ─── Maintenance ────────────────────────────────────────────────

    /// Forget all history. The document is not touched.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.sealed = false;
    }

    /// Drop every command that edits `profile`.
    ///
    /// Commands on other profiles stay usable because each profile's
    /// sequence only depends on its own commands. A batch that also edits
    /// other profiles cannot be split, so its presence clears everything.
    pub fn purge_profile(&mut self, profile: ProfileId) {
        let mixed = self
            .undo_stack
            .iter()
            .chain(self.redo_stack.iter())
            .any(|c| c.touches(profile) && c.profiles().len() > 1);
        if mixed {
            warn!("History shared with removed profile {profile}, clearing all");
            self.clear();
            return;
        }
        let before = self.undo_stack.len() + self.redo_stack.len();
        self.undo_stack.retain(|c| !c.touches(profile));
        self.redo_stack.retain(|c| !c.touches(profile));
        self.sealed = true;
        let dropped = before - self.undo_stack.len() - self.redo_stack.len();
        if dropped > 0 {
            debug!("Dropped {dropped} history steps of profile {profile}");
        }
    }

    fn enforce_depth(&mut self) {
        if self.max_depth == 0 {
            return;
        }
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MotionNode;
    use crate::palette::Color;

    fn n(t: f64, v: f64) -> MotionNode {
        MotionNode::new(t, v)
    }

    fn setup() -> (MotionDocument, ProfileId, CommandStack) {
        let mut doc = MotionDocument::new();
        let id = doc.add_motor("m", Color::RED);
        (doc, id, CommandStack::with_max_depth(0))
    }

    fn nodes(doc: &MotionDocument, id: ProfileId) -> Vec<MotionNode> {
        doc.profile(id).unwrap().nodes()
    }

    #[test]
    fn empty_stack_reports_nothing() {
        let (mut doc, _, mut stack) = setup();
        assert_eq!(stack.undo(&mut doc), Err(EditError::NothingToUndo));
        assert_eq!(stack.redo(&mut doc), Err(EditError::NothingToRedo));
        assert!(stack.undo_text().is_none());
    }

    #[test]
    fn push_undo_redo() {
        let (mut doc, id, mut stack) = setup();
        stack.push(&mut doc, Command::add(id, n(0.0, 0.0))).unwrap();
        stack.push(&mut doc, Command::add(id, n(100.0, 10.0))).unwrap();
        assert_eq!(stack.undo_text(), Some("Add node"));

        assert_eq!(stack.undo(&mut doc), Ok("Add node"));
        assert_eq!(nodes(&doc, id), [n(0.0, 0.0)]);
        assert_eq!(stack.redo_text(), Some("Add node"));

        stack.redo(&mut doc).unwrap();
        assert_eq!(nodes(&doc, id), [n(0.0, 0.0), n(100.0, 10.0)]);
        assert!(!stack.can_redo());
    }

    #[test]
    fn push_after_undo_truncates_redo() {
        let (mut doc, id, mut stack) = setup();
        stack.push(&mut doc, Command::add(id, n(0.0, 0.0))).unwrap();
        stack.push(&mut doc, Command::add(id, n(100.0, 10.0))).unwrap();
        stack.undo(&mut doc).unwrap();
        stack.push(&mut doc, Command::add(id, n(50.0, 5.0))).unwrap();
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_depth(), 2);
    }

    #[test]
    fn rejected_push_keeps_redo_tail() {
        let (mut doc, id, mut stack) = setup();
        stack.push(&mut doc, Command::add(id, n(0.0, 0.0))).unwrap();
        stack.undo(&mut doc).unwrap();
        assert!(stack.push(&mut doc, Command::add(id, n(-5.0, 0.0))).is_err());
        assert!(stack.can_redo());
    }

    #[test]
    fn consecutive_moves_merge_until_sealed() {
        let (mut doc, id, mut stack) = setup();
        stack.push(&mut doc, Command::add(id, n(0.0, 0.0))).unwrap();
        let a = Command::move_node(id, 0, n(0.0, 0.0), n(10.0, 10.0));
        let b = Command::move_node(id, 0, n(10.0, 10.0), n(20.0, 20.0));
        assert_eq!(stack.push(&mut doc, a), Ok(PushOutcome::Pushed));
        assert_eq!(stack.push(&mut doc, b), Ok(PushOutcome::Merged));
        assert_eq!(stack.undo_depth(), 2);

        stack.seal();
        let c = Command::move_node(id, 0, n(20.0, 20.0), n(30.0, 30.0));
        assert_eq!(stack.push(&mut doc, c), Ok(PushOutcome::Pushed));

        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(nodes(&doc, id), [n(0.0, 0.0)]);
    }

    #[test]
    fn depth_limit_evicts_oldest() {
        let (mut doc, id, _) = setup();
        let mut stack = CommandStack::with_max_depth(2);
        for t in [0.0, 10.0, 20.0] {
            stack.push(&mut doc, Command::add(id, n(t, 0.0))).unwrap();
        }
        assert_eq!(stack.undo_depth(), 2);
        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert!(!stack.can_undo());
        assert_eq!(nodes(&doc, id), [n(0.0, 0.0)]);
    }

    #[test]
    fn purge_drops_only_that_profile() {
        let (mut doc, a, mut stack) = setup();
        let b = doc.add_motor("b", Color::GRAY);
        stack.push(&mut doc, Command::add(a, n(0.0, 0.0))).unwrap();
        stack.push(&mut doc, Command::add(b, n(0.0, 0.0))).unwrap();
        stack.push(&mut doc, Command::add(a, n(10.0, 0.0))).unwrap();

        stack.purge_profile(b);
        doc.remove_motor(b);
        assert_eq!(stack.undo_depth(), 2);
        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert!(nodes(&doc, a).is_empty());
    }

    #[test]
    fn stale_profile_fails_and_stays() {
        let (mut doc, id, mut stack) = setup();
        stack.push(&mut doc, Command::add(id, n(0.0, 0.0))).unwrap();
        doc.remove_motor(id);
        assert_eq!(stack.undo(&mut doc), Err(EditError::UnknownProfile(id)));
        assert_eq!(stack.undo_depth(), 1);
    }
}
