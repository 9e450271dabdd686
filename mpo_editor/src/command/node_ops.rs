//! The four node edits.
//!
//! Each edit records where its node went (id and slot index) the first time
//! it runs. Later undo/redo passes put the node back at exactly that slot, so
//! a round trip restores the sequence slot for slot even when several nodes
//! share a time.
//!
//! None of these notify; [`super::Command`] does that once per touched
//! profile.

use tracing::debug;

use crate::document::{MotionDocument, ProfileId};
use crate::error::{EditError, EditResult};
use crate::node::{MotionNode, NodeId};
use crate::profile::MotorProfile;

fn profile_mut(doc: &mut MotionDocument, id: ProfileId) -> EditResult<&mut MotorProfile> {
    doc.profile_mut(id).ok_or(EditError::UnknownProfile(id))
}

fn stale(index: usize, node: &MotionNode) -> EditError {
    EditError::StaleNode {
        index,
        time: node.time,
        value: node.value,
    }
}

// ─── AddNode ────────────────────────────────────────────────────────

/// Insert one node.
#[derive(Debug, Clone, PartialEq)]
pub struct AddNode {
    profile: ProfileId,
    node: MotionNode,
    placed: Option<(NodeId, usize)>,
}

impl AddNode {
    pub fn new(profile: ProfileId, node: MotionNode) -> Self {
        Self {
            profile,
            node,
            placed: None,
        }
    }

    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    pub fn node(&self) -> MotionNode {
        self.node
    }

    /// Post-sort index of the node once applied.
    pub fn index(&self) -> Option<usize> {
        self.placed.map(|(_, index)| index)
    }

    pub(crate) fn apply(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        let profile = profile_mut(doc, self.profile)?;
        match self.placed {
            Some((id, index)) => profile.internal_insert_at(index, id, self.node),
            None => {
                profile.validate(&self.node)?;
                let (index, id) = profile.internal_add(self.node);
                debug!("{}: added node at {index}", profile.name());
                self.placed = Some((id, index));
            }
        }
        Ok(())
    }

    pub(crate) fn invert(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        let (id, index) = self.placed.ok_or_else(|| stale(0, &self.node))?;
        let profile = profile_mut(doc, self.profile)?;
        profile
            .internal_remove(id)
            .map(|_| ())
            .ok_or_else(|| stale(index, &self.node))
    }
}

// ─── DeleteNode ─────────────────────────────────────────────────────

/// Remove one node.
///
/// The target is named by index plus the node the caller saw there. If the
/// index no longer holds that node, the first node with matching coordinates
/// is removed instead.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteNode {
    profile: ProfileId,
    index: usize,
    expected: MotionNode,
    removed: Option<(NodeId, usize, MotionNode)>,
}

impl DeleteNode {
    pub fn new(profile: ProfileId, index: usize, expected: MotionNode) -> Self {
        Self {
            profile,
            index,
            expected,
            removed: None,
        }
    }

    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    pub(crate) fn apply(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        let profile = profile_mut(doc, self.profile)?;
        match self.removed {
            Some((id, index, node)) => {
                profile.internal_remove(id).ok_or_else(|| stale(index, &node))?;
            }
            None => {
                let (_, id) = profile
                    .resolve(self.index, &self.expected)
                    .ok_or_else(|| stale(self.index, &self.expected))?;
                let (index, node) = profile
                    .internal_remove(id)
                    .ok_or_else(|| stale(self.index, &self.expected))?;
                debug!("{}: deleted node at {index}", profile.name());
                self.removed = Some((id, index, node));
            }
        }
        Ok(())
    }

    pub(crate) fn invert(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        let (id, index, node) = self.removed.ok_or_else(|| stale(self.index, &self.expected))?;
        profile_mut(doc, self.profile)?.internal_insert_at(index, id, node);
        Ok(())
    }
}

// ─── MoveNode ───────────────────────────────────────────────────────

/// Move one node from `old` to `new`.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveNode {
    profile: ProfileId,
    index: usize,
    old: MotionNode,
    new: MotionNode,
    placed: Option<Placement>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    id: NodeId,
    from: usize,
    to: usize,
}

impl MoveNode {
    pub fn new(profile: ProfileId, index: usize, old: MotionNode, new: MotionNode) -> Self {
        Self {
            profile,
            index,
            old,
            new,
            placed: None,
        }
    }

    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    pub fn old_pos(&self) -> MotionNode {
        self.old
    }

    pub fn new_pos(&self) -> MotionNode {
        self.new
    }

    /// Stable id of the moved node once applied.
    pub fn node_id(&self) -> Option<NodeId> {
        self.placed.map(|p| p.id)
    }

    /// Index the node landed on after the re-sort.
    pub fn new_index(&self) -> Option<usize> {
        self.placed.map(|p| p.to)
    }

    pub(crate) fn apply(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        let profile = profile_mut(doc, self.profile)?;
        match self.placed {
            Some(p) => {
                if !profile.internal_place(p.id, self.new, p.to) {
                    return Err(stale(p.from, &self.old));
                }
            }
            None => {
                profile.validate(&self.new)?;
                let (from, id) = profile
                    .resolve(self.index, &self.old)
                    .ok_or_else(|| stale(self.index, &self.old))?;
                let to = profile
                    .internal_move(id, self.new)
                    .ok_or_else(|| stale(from, &self.old))?;
                debug!("{}: moved node {from} -> {to}", profile.name());
                self.placed = Some(Placement { id, from, to });
            }
        }
        Ok(())
    }

    pub(crate) fn invert(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        let p = self.placed.ok_or_else(|| stale(self.index, &self.old))?;
        let profile = profile_mut(doc, self.profile)?;
        if profile.internal_place(p.id, self.old, p.from) {
            Ok(())
        } else {
            Err(stale(p.to, &self.new))
        }
    }

    /// Fold a later move of the same node into this one.
    ///
    /// Keeps this move's start and takes `next`'s destination.
    pub(crate) fn try_merge(&mut self, next: &MoveNode) -> bool {
        let (Some(mine), Some(theirs)) = (self.placed, next.placed) else {
            return false;
        };
        if self.profile != next.profile || mine.id != theirs.id {
            return false;
        }
        self.new = next.new;
        self.placed = Some(Placement {
            to: theirs.to,
            ..mine
        });
        true
    }
}

// ─── MoveNodes ──────────────────────────────────────────────────────

/// Several moves applied as one step.
///
/// Members apply in order and undo in reverse order. If a member fails on the
/// first apply, the members already applied are rolled back.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveNodes {
    members: Vec<MoveNode>,
}

impl MoveNodes {
    pub fn new(members: Vec<MoveNode>) -> EditResult<Self> {
        if members.is_empty() {
            return Err(EditError::EmptyBatch);
        }
        Ok(Self { members })
    }

    pub fn members(&self) -> &[MoveNode] {
        &self.members
    }

    pub(crate) fn apply(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        for i in 0..self.members.len() {
            if let Err(e) = self.members[i].apply(doc) {
                for done in self.members[..i].iter_mut().rev() {
                    // The rollback mirrors an apply that just succeeded.
                    if let Err(rollback) = done.invert(doc) {
                        debug!("batch rollback failed: {rollback}");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    pub(crate) fn invert(&mut self, doc: &mut MotionDocument) -> EditResult<()> {
        for member in self.members.iter_mut().rev() {
            member.invert(doc)?;
        }
        Ok(())
    }
}
