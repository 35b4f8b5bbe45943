//! Held/released tracking per key or button
//!
//! Every [`InputId`] starts out released. Each identifier has its own lock so
//! that a transition and the event it emits happen as one step, even when a
//! scheduled auto-release fires on another thread.
//!
//! The map lock is never held while waiting on a slot lock.

use super::InputId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// State of a single identifier
#[derive(Debug, Default)]
pub(crate) struct KeySlot {
    held: bool,
    /// Bumped on every hold so a stale auto-release can recognise itself
    generation: u64,
    /// Dropping this wakes and cancels the pending auto-release, if any
    auto_release: Option<Sender<()>>,
}

impl KeySlot {
    pub(crate) fn is_held(&self) -> bool {
        self.held
    }

    /// Released -> Held; returns the new generation, or `None` if already held
    pub(crate) fn begin_hold(&mut self) -> Option<u64> {
        if self.held {
            return None;
        }
        self.held = true;
        self.generation = self.generation.wrapping_add(1);
        Some(self.generation)
    }

    /// Held -> Released; `false` if it was not held
    pub(crate) fn end_hold(&mut self) -> bool {
        if !self.held {
            return false;
        }
        self.held = false;
        self.auto_release.take();
        true
    }

    /// Like [`end_hold`](Self::end_hold) but only for the hold that scheduled it
    pub(crate) fn end_hold_if(&mut self, generation: u64) -> bool {
        if self.held && self.generation == generation {
            self.end_hold()
        } else {
            false
        }
    }

    pub(crate) fn arm_auto_release(&mut self, cancel: Sender<()>) {
        self.auto_release = Some(cancel);
    }
}

/// Maps each identifier to its held state
///
/// Unseen identifiers read as released; entries are created lazily.
#[derive(Debug, Default)]
pub struct KeyStateTracker {
    slots: Mutex<HashMap<InputId, Arc<Mutex<KeySlot>>>>,
}

impl KeyStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the identifier is currently held
    pub fn is_held(&self, id: InputId) -> bool {
        let slot = self.slots.lock().get(&id).cloned();
        slot.map(|slot| slot.lock().is_held()).unwrap_or(false)
    }

    /// Sets the state directly; returns whether it changed
    ///
    /// Setting the current state again does nothing. This only updates the
    /// bookkeeping, no events are emitted.
    pub fn set_held(&self, id: InputId, held: bool) -> bool {
        let slot = self.slot(id);
        let mut slot = slot.lock();
        if held {
            slot.begin_hold().is_some()
        } else {
            slot.end_hold()
        }
    }

    /// Every identifier currently held
    pub fn held_inputs(&self) -> Vec<InputId> {
        // Snapshot first; a slot may stay locked for a whole press cycle
        let slots: Vec<_> = self
            .slots
            .lock()
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();

        slots
            .into_iter()
            .filter(|(_, slot)| slot.lock().is_held())
            .map(|(id, _)| id)
            .collect()
    }

    pub(crate) fn slot(&self, id: InputId) -> Arc<Mutex<KeySlot>> {
        Arc::clone(self.slots.lock().entry(id).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MouseButton, NamedKey};
    use std::sync::mpsc;

    #[test]
    fn test_unseen_is_released() {
        let tracker = KeyStateTracker::new();
        assert!(!tracker.is_held(NamedKey::Enter.into()));
    }

    #[test]
    fn test_set_held_is_idempotent() {
        let tracker = KeyStateTracker::new();
        let id: InputId = MouseButton::Left.into();

        assert!(tracker.set_held(id, true));
        assert!(!tracker.set_held(id, true));
        assert!(tracker.is_held(id));

        assert!(tracker.set_held(id, false));
        assert!(!tracker.set_held(id, false));
        assert!(!tracker.is_held(id));
    }

    #[test]
    fn test_held_inputs() {
        let tracker = KeyStateTracker::new();
        tracker.set_held(NamedKey::Shift.into(), true);
        tracker.set_held(NamedKey::Ctrl.into(), true);
        tracker.set_held(NamedKey::Ctrl.into(), false);

        assert_eq!(tracker.held_inputs(), vec![InputId::from(NamedKey::Shift)]);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut slot = KeySlot::default();
        let first = slot.begin_hold().unwrap();
        assert!(slot.end_hold());

        let second = slot.begin_hold().unwrap();
        assert_ne!(first, second);
        assert!(!slot.end_hold_if(first));
        assert!(slot.is_held());
        assert!(slot.end_hold_if(second));
    }

    #[test]
    fn test_end_hold_cancels_auto_release() {
        let mut slot = KeySlot::default();
        let (tx, rx) = mpsc::channel::<()>();
        slot.begin_hold();
        slot.arm_auto_release(tx);

        slot.end_hold();
        assert!(matches!(rx.try_recv(), Err(mpsc::TryRecvError::Disconnected)));
    }
}
