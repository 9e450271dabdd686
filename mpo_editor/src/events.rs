//! Synchronous change notification.
//!
//! Listeners are called in subscription order, on the caller's stack, before
//! the mutating call returns. There is no queue and no background delivery.

use std::fmt;

use crate::document::ProfileId;

/// Change on a single motor profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileEvent {
    /// Node sequence changed.
    DataChanged,
    /// `y_min`, `y_max` or `max_slope` changed.
    ConstraintsChanged,
}

/// Structural change on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// A motor was appended.
    MotorAdded(ProfileId),
    /// The profile list changed (add, remove, reload).
    ModelChanged,
    /// The active motor switched. Listeners detach from `previous` and
    /// attach to `active`.
    ActiveChanged {
        /// Newly active profile.
        active: Option<ProfileId>,
        /// Previously active profile.
        previous: Option<ProfileId>,
    },
    /// Emitted before a load replaces every profile.
    DocumentCleared,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// Ordered listener list.
pub struct Observers<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<E>)>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E> Observers<E> {
    /// Register a listener; it is called after all earlier listeners.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to every listener in subscription order.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// No listeners registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
