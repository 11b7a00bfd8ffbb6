//! Callback registry
//!
//! Maps every callback id the platform issued during the current attach to
//! the purpose it serves. Dispatch looks ids up here; an id that is not
//! present is stale and gets ignored. Detach drains the registry and cancels
//! every id, so the registry is the single owner of platform-side cleanup.

use std::collections::HashMap;

use crate::platform::{CallbackId, EventSource};

/// What a registered callback is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// A media element finished loading or failed
    MediaSettled,
    /// The font-loading readiness signal resolved
    FontsReady,
    /// Next frame sample for the layout-stability gate
    GateFrame,
    /// Deferred start after zero-sized geometry
    RetryStart,
    /// Debounced handling of a window resize
    ResizeDebounce,
    /// Debounced re-resolution of the document direction
    DirectionDebounce,
    /// Persistence interval tick
    PersistTick,
    /// Subscription to an event source
    Listener(EventSource),
}

impl Purpose {
    /// One-shot callbacks are forgotten as soon as they fire
    pub fn is_one_shot(self) -> bool {
        !matches!(self, Purpose::PersistTick | Purpose::Listener(_))
    }
}

#[derive(Debug, Default)]
pub struct CallbackRegistry {
    entries: HashMap<CallbackId, Purpose>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: CallbackId, purpose: Purpose) {
        if let Some(previous) = self.entries.insert(id, purpose) {
            log::warn!("callback {:?} re-registered ({:?} -> {:?})", id, previous, purpose);
        }
    }

    /// Look up a fired callback, forgetting it if it was one-shot
    pub fn resolve(&mut self, id: CallbackId) -> Option<Purpose> {
        let purpose = *self.entries.get(&id)?;
        if purpose.is_one_shot() {
            self.entries.remove(&id);
        }
        Some(purpose)
    }

    /// Forget every id registered for `purpose`, returning them for cancellation
    pub fn remove_purpose(&mut self, purpose: Purpose) -> Vec<CallbackId> {
        let ids: Vec<CallbackId> = self
            .entries
            .iter()
            .filter(|(_, p)| **p == purpose)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.entries.remove(id);
        }
        ids
    }

    pub fn contains_purpose(&self, purpose: Purpose) -> bool {
        self.entries.values().any(|p| *p == purpose)
    }

    /// Remove everything, returning the ids in issue order
    pub fn drain(&mut self) -> Vec<CallbackId> {
        let mut ids: Vec<CallbackId> = self.entries.drain().map(|(id, _)| id).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_entries_are_forgotten_on_resolve() {
        let mut registry = CallbackRegistry::new();
        registry.insert(CallbackId(1), Purpose::RetryStart);
        registry.insert(CallbackId(2), Purpose::Listener(EventSource::WindowResize));

        assert_eq!(registry.resolve(CallbackId(1)), Some(Purpose::RetryStart));
        assert_eq!(registry.resolve(CallbackId(1)), None);

        let listener = Purpose::Listener(EventSource::WindowResize);
        assert_eq!(registry.resolve(CallbackId(2)), Some(listener));
        assert_eq!(registry.resolve(CallbackId(2)), Some(listener));
    }

    #[test]
    fn test_remove_purpose() {
        let mut registry = CallbackRegistry::new();
        registry.insert(CallbackId(1), Purpose::MediaSettled);
        registry.insert(CallbackId(2), Purpose::MediaSettled);
        registry.insert(CallbackId(3), Purpose::GateFrame);

        let mut removed = registry.remove_purpose(Purpose::MediaSettled);
        removed.sort();
        assert_eq!(removed, vec![CallbackId(1), CallbackId(2)]);
        assert!(!registry.contains_purpose(Purpose::MediaSettled));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_drain_empties_registry() {
        let mut registry = CallbackRegistry::new();
        registry.insert(CallbackId(7), Purpose::PersistTick);
        registry.insert(CallbackId(3), Purpose::ResizeDebounce);

        assert_eq!(registry.drain(), vec![CallbackId(3), CallbackId(7)]);
        assert!(registry.is_empty());
        assert_eq!(registry.resolve(CallbackId(7)), None);
    }
}
