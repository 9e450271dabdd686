//! Undoable node edits and the history that records them.
//!
//! ```text
//! caller ──push(cmd)──▶ CommandStack ──apply──▶ MotorProfile (raw mutators)
//!                           │                         │
//!                      undo / redo                DataChanged
//! ```
//!
//! A command names its profile by [`ProfileId`]. Removing a profile from
//! the document must purge its commands from the stack
//! ([`CommandStack::purge_profile`]); a command whose profile has gone fails
//! with [`EditError::UnknownProfile`](crate::error::EditError::UnknownProfile)
//! instead of touching anything.

mod node_ops;
mod stack;

pub use node_ops::{AddNode, DeleteNode, MoveNode, MoveNodes};
pub use stack::{CommandStack, PushOutcome};

use crate::document::{MotionDocument, ProfileId};
use crate::error::EditResult;
use crate::node::MotionNode;

/// Kind tag for a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Add,
    Delete,
    Move,
    MoveBatch,
}

impl CommandKind {
    /// Human-readable label, used for undo/redo menu text.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Add => "Add node",
            Self::Delete => "Delete node",
            Self::Move => "Move node",
            Self::MoveBatch => "Move nodes",
        }
    }
}

/// An undoable edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(AddNode),
    Delete(DeleteNode),
    Move(MoveNode),
    MoveBatch(MoveNodes),
}

impl Command {
    /// Insert `node` into `profile`.
    pub fn add(profile: ProfileId, node: MotionNode) -> Self {
        Self::Add(AddNode::new(profile, node))
    }

    /// Delete the node the caller saw as `expected` at `index`.
    pub fn delete(profile: ProfileId, index: usize, expected: MotionNode) -> Self {
        Self::Delete(DeleteNode::new(profile, index, expected))
    }

    /// Move the node at `index` from `old` to `new`.
    pub fn move_node(profile: ProfileId, index: usize, old: MotionNode, new: MotionNode) -> Self {
        Self::Move(MoveNode::new(profile, index, old, new))
    }

    /// Move several nodes as one undo step.
    pub fn move_nodes(moves: Vec<MoveNode>) -> EditResult<Self> {
        MoveNodes::new(moves).map(Self::MoveBatch)
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Add(_) => CommandKind::Add,
            Self::Delete(_) => CommandKind::Delete,
            Self::Move(_) => CommandKind::Move,
            Self::MoveBatch(_) => CommandKind::MoveBatch,
        }
    }

    pub fn description(&self) -> &'static str {
        self.kind().description()
    }

    /// Profiles this command edits, without duplicates, in first-seen order.
    pub fn profiles(&self) -> Vec<ProfileId> {
        match self {
            Self::Add(c) => vec![c.profile()],
            Self::Delete(c) => vec![c.profile()],
            Self::Move(c) => vec![c.profile()],
            Self::MoveBatch(c) => {
                let mut ids: Vec<ProfileId> = Vec::new();
                for m in c.members() {
                    if !ids.contains(&m.profile()) {
                        ids.push(m.profile());
                    }
                }
                ids
            }
        }
    }

    /// Whether this command edits `profile`.
    pub fn touches(&self, profile: ProfileId) -> bool {
        self.profiles().contains(&profile)
    }

    /// Run the edit forward and notify every touched profile once.
    pub(crate) fn apply(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        match self {
            Self::Add(c) => c.apply(doc)?,
            Self::Delete(c) => c.apply(doc)?,
            Self::Move(c) => c.apply(doc)?,
            Self::MoveBatch(c) => c.apply(doc)?,
        }
        self.notify(doc);
        Ok(())
    }

    /// Reverse the edit and notify every touched profile once.
    pub(crate) fn invert(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        match self {
            Self::Add(c) => c.invert(doc)?,
            Self::Delete(c) => c.invert(doc)?,
            Self::Move(c) => c.invert(doc)?,
            Self::MoveBatch(c) => c.invert(doc)?,
        }
        self.notify(doc);
        Ok(())
    }

    /// Absorb `next` into `self` if both are moves of the same node.
    ///
    /// Only single moves merge; every other pairing returns `false`.
    pub(crate) fn try_merge(&mut self, next: &Command) -> bool {
        match (self, next) {
            (Self::Move(mine), Self::Move(theirs)) => mine.try_merge(theirs),
            _ => false,
        }
    }

    fn notify(&self, doc: &mut MotionDocument) {
        for id in self.profiles() {
            if let Some(profile) = doc.profile_mut(id) {
                profile.notify_data_changed();
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
