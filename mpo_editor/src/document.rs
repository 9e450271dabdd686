//! The set of motor profiles being edited and the active selection.

use std::fmt;
use std::path::Path;

use mpo_common::consts::DEFAULT_MIN_EXPORT_END_MS;
use mpo_common::editor::ProfileDefaults;
use tracing::{debug, info, warn};

use crate::error::PersistResult;
use crate::events::{DocumentEvent, Observers, SubscriptionId};
use crate::palette::{Color, HueSequence};
use crate::persist;
use crate::profile::MotorProfile;

/// Handle naming one profile in a document.
///
/// Ids increase monotonically and are never reused, so a handle to a
/// removed profile can never alias a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileId(u64);

impl ProfileId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "motor#{}", self.0)
    }
}

/// Ordered list of motor profiles plus the active one.
#[derive(Debug, Default)]
pub struct MotionDocument {
    profiles: Vec<(ProfileId, MotorProfile)>,
    active: Option<ProfileId>,
    next_id: u64,
    observers: Observers<DocumentEvent>,
}

impl MotionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Profile list ───────────────────────────────────────────────

    /// Append an empty profile with default constraints.
    ///
    /// Emits `MotorAdded` then `ModelChanged`. The active profile is left
    /// alone.
    pub fn add_motor(&mut self, name: impl Into<String>, color: Color) -> ProfileId {
        self.insert_profile(MotorProfile::new(name, color))
    }

    /// Append an empty profile with configured constraints.
    pub fn add_motor_with(
        &mut self,
        name: impl Into<String>,
        color: Color,
        defaults: &ProfileDefaults,
    ) -> ProfileId {
        self.insert_profile(MotorProfile::with_defaults(name, color, defaults))
    }

    fn insert_profile(&mut self, profile: MotorProfile) -> ProfileId {
        let id = self.push_profile(profile);
        self.observers.emit(&DocumentEvent::MotorAdded(id));
        self.observers.emit(&DocumentEvent::ModelChanged);
        id
    }

    fn push_profile(&mut self, profile: MotorProfile) -> ProfileId {
        let id = ProfileId::new(self.next_id);
        self.next_id += 1;
        debug!("Added {} '{}'", id, profile.name());
        self.profiles.push((id, profile));
        id
    }

    /// Remove `id` and hand the profile back.
    ///
    /// When it was active, the preceding profile becomes active (the new
    /// first one when it was first; none when the list is now empty) and
    /// `ActiveChanged` fires before `ModelChanged`.
    pub fn remove_motor(&mut self, id: ProfileId) -> Option<MotorProfile> {
        let Some(index) = self.position(id) else {
            warn!("remove_motor: {id} is not in the document");
            return None;
        };
        let (_, profile) = self.profiles.remove(index);

        if self.active == Some(id) {
            let next = self
                .profiles
                .get(index.saturating_sub(1))
                .map(|(pid, _)| *pid);
            self.active = next;
            self.observers.emit(&DocumentEvent::ActiveChanged {
                active: next,
                previous: Some(id),
            });
        }

        self.observers.emit(&DocumentEvent::ModelChanged);
        debug!("Removed {id} '{}'", profile.name());
        Some(profile)
    }

    // ─── Active profile ─────────────────────────────────────────────

    /// Make `id` active, or clear the selection with `None`.
    ///
    /// Returns `true` and emits `ActiveChanged` only when the selection
    /// actually changed. Ids not in the document are ignored.
    pub fn set_active_motor(&mut self, id: Option<ProfileId>) -> bool {
        if let Some(pid) = id {
            if self.position(pid).is_none() {
                warn!("set_active_motor: {pid} is not in the document");
                return false;
            }
        }
        if id == self.active {
            return false;
        }
        let previous = self.active;
        self.active = id;
        self.observers.emit(&DocumentEvent::ActiveChanged {
            active: id,
            previous,
        });
        true
    }

    pub fn active(&self) -> Option<ProfileId> {
        self.active
    }

    pub fn active_profile(&self) -> Option<&MotorProfile> {
        self.active.and_then(|id| self.profile(id))
    }

    pub fn active_profile_mut(&mut self) -> Option<&mut MotorProfile> {
        let id = self.active?;
        self.profile_mut(id)
    }

    /// Position of the active profile in the list.
    pub fn active_index(&self) -> Option<usize> {
        self.active.and_then(|id| self.position(id))
    }

    // ─── Lookup ─────────────────────────────────────────────────────

    pub fn profile(&self, id: ProfileId) -> Option<&MotorProfile> {
        self.profiles
            .iter()
            .find(|(pid, _)| *pid == id)
            .map(|(_, p)| p)
    }

    pub fn profile_mut(&mut self, id: ProfileId) -> Option<&mut MotorProfile> {
        self.profiles
            .iter_mut()
            .find(|(pid, _)| *pid == id)
            .map(|(_, p)| p)
    }

    /// Profiles in document order.
    pub fn profiles(&self) -> impl Iterator<Item = (ProfileId, &MotorProfile)> {
        self.profiles.iter().map(|(id, p)| (*id, p))
    }

    pub fn ids(&self) -> Vec<ProfileId> {
        self.profiles.iter().map(|(id, _)| *id).collect()
    }

    /// First profile called `name`.
    pub fn profile_by_name(&self, name: &str) -> Option<ProfileId> {
        self.profiles
            .iter()
            .find(|(_, p)| p.name() == name)
            .map(|(id, _)| *id)
    }

    pub fn position(&self, id: ProfileId) -> Option<usize> {
        self.profiles.iter().position(|(pid, _)| *pid == id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Latest last-node time over all profiles, never below 2000 ms.
    pub fn max_end_time(&self) -> f64 {
        self.profiles
            .iter()
            .map(|(_, p)| p.end_time())
            .fold(DEFAULT_MIN_EXPORT_END_MS, f64::max)
    }

    // ─── Bulk replace ───────────────────────────────────────────────

    /// Swap in a freshly built profile list.
    ///
    /// Emits `DocumentCleared` first, then `MotorAdded` per profile,
    /// `ModelChanged`, and finally `ActiveChanged` when the selection moved
    /// (the first profile becomes active).
    pub(crate) fn replace_profiles(&mut self, profiles: Vec<MotorProfile>) {
        self.observers.emit(&DocumentEvent::DocumentCleared);
        let previous = self.active.take();
        self.profiles.clear();

        let ids: Vec<ProfileId> = profiles.into_iter().map(|p| self.push_profile(p)).collect();
        for id in &ids {
            self.observers.emit(&DocumentEvent::MotorAdded(*id));
        }
        self.observers.emit(&DocumentEvent::ModelChanged);

        self.active = ids.first().copied();
        if self.active != previous {
            self.observers.emit(&DocumentEvent::ActiveChanged {
                active: self.active,
                previous,
            });
        }
    }

    /// Replace the document with the contents of `path`.
    ///
    /// The file is parsed and every profile is built before anything is
    /// touched: on error the document is unchanged and no event fires.
    /// Returns the document id stored in the file.
    pub fn load_from_file(
        &mut self,
        path: &Path,
        defaults: &ProfileDefaults,
        palette: &mut HueSequence,
    ) -> PersistResult<String> {
        let record = persist::read_document(path)?;
        let (id, profiles) = record.into_profiles(defaults, palette)?;
        info!("Loaded {} motors from {}", profiles.len(), path.display());
        self.replace_profiles(profiles);
        Ok(id)
    }

    /// Write every profile to `path` under document id `id`.
    pub fn save_to_file(&self, path: &Path, id: &str) -> PersistResult<()> {
        persist::write_document(path, &persist::DocumentRecord::from_document(self, id))?;
        info!("Saved {} motors to {}", self.len(), path.display());
        Ok(())
    }

    // ─── Notification ───────────────────────────────────────────────

    pub fn subscribe(&mut self, listener: impl FnMut(&DocumentEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::MotionNode;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(doc: &mut MotionDocument) -> Rc<RefCell<Vec<DocumentEvent>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        doc.subscribe(move |e| sink.borrow_mut().push(*e));
        log
    }

    fn three() -> (MotionDocument, [ProfileId; 3]) {
        let mut doc = MotionDocument::new();
        let a = doc.add_motor("a", Color::RED);
        let b = doc.add_motor("b", Color::RED);
        let c = doc.add_motor("c", Color::RED);
        (doc, [a, b, c])
    }

    #[test]
    fn add_emits_added_then_model_changed() {
        let mut doc = MotionDocument::new();
        let log = recorder(&mut doc);
        let id = doc.add_motor("m", Color::RED);
        assert_eq!(
            *log.borrow(),
            [DocumentEvent::MotorAdded(id), DocumentEvent::ModelChanged]
        );
        assert_eq!(doc.active(), None);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut doc = MotionDocument::new();
        let a = doc.add_motor("a", Color::RED);
        doc.remove_motor(a);
        let b = doc.add_motor("a", Color::RED);
        assert_ne!(a, b);
        assert!(doc.profile(a).is_none());
    }

    #[test]
    fn removing_active_selects_previous() {
        let (mut doc, [a, b, c]) = three();
        doc.set_active_motor(Some(b));
        let log = recorder(&mut doc);
        assert!(doc.remove_motor(b).is_some());
        assert_eq!(doc.active(), Some(a));
        assert_eq!(
            *log.borrow(),
            [
                DocumentEvent::ActiveChanged {
                    active: Some(a),
                    previous: Some(b)
                },
                DocumentEvent::ModelChanged
            ]
        );
        doc.set_active_motor(Some(a));
        doc.remove_motor(a);
        assert_eq!(doc.active(), Some(c));
        doc.remove_motor(c);
        assert_eq!(doc.active(), None);
    }

    #[test]
    fn removing_inactive_keeps_selection() {
        let (mut doc, [a, _, c]) = three();
        doc.set_active_motor(Some(c));
        doc.remove_motor(a);
        assert_eq!(doc.active(), Some(c));
        assert_eq!(doc.active_index(), Some(1));
    }

    #[test]
    fn set_active_ignores_noop_and_strangers() {
        let (mut doc, [a, _, _]) = three();
        let log = recorder(&mut doc);
        assert!(doc.set_active_motor(Some(a)));
        assert!(!doc.set_active_motor(Some(a)));
        assert!(!doc.set_active_motor(Some(ProfileId::new(99))));
        assert!(doc.set_active_motor(None));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn replace_emits_cleared_first() {
        let (mut doc, _) = three();
        let log = recorder(&mut doc);
        doc.replace_profiles(vec![MotorProfile::new("x", Color::RED)]);
        let events = log.borrow();
        assert_eq!(events[0], DocumentEvent::DocumentCleared);
        assert!(matches!(events[1], DocumentEvent::MotorAdded(_)));
        assert_eq!(events[2], DocumentEvent::ModelChanged);
        assert!(matches!(
            events[3],
            DocumentEvent::ActiveChanged { active: Some(_), previous: None }
        ));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.active_profile().map(MotorProfile::name), Some("x"));
    }

    #[test]
    fn max_end_time_has_floor() {
        let (mut doc, [a, b, _]) = three();
        assert_eq!(doc.max_end_time(), 2000.0);
        doc.profile_mut(a)
            .unwrap()
            .add_node(MotionNode::new(3500.0, 0.0))
            .unwrap();
        doc.profile_mut(b)
            .unwrap()
            .add_node(MotionNode::new(1200.0, 0.0))
            .unwrap();
        assert_eq!(doc.max_end_time(), 3500.0);
    }

    #[test]
    fn lookup_by_name() {
        let (doc, [_, b, _]) = three();
        assert_eq!(doc.profile_by_name("b"), Some(b));
        assert_eq!(doc.profile_by_name("zz"), None);
    }
}
