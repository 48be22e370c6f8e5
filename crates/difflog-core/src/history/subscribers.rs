//! Subscriber registry and unsubscribe handles.

use crate::history::record::DiffRecord;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

/// Observer callback, invoked with a copy of the full ordered log.
pub type Callback = dyn Fn(&[DiffRecord]) + Send + Sync;

/// Registry key of one subscriber. Ids increase in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub:{}", self.0)
    }
}

/// Id-keyed set of callbacks, iterated in registration order.
#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    entries: BTreeMap<SubscriberId, Arc<Callback>>,
}

impl Registry {
    /// Register `callback`, or return the existing id if this exact
    /// callback allocation is already registered.
    ///
    /// The bool is `true` when a new entry was created.
    pub(crate) fn insert(&mut self, callback: Arc<Callback>) -> (SubscriberId, bool) {
        if let Some(id) = self.find(&callback) {
            return (id, false);
        }
        self.next_id += 1;
        let id = SubscriberId(self.next_id);
        self.entries.insert(id, callback);
        (id, true)
    }

    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Callbacks present right now, in registration order
    pub(crate) fn callbacks(&self) -> Vec<Arc<Callback>> {
        self.entries.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    // Identity is the data pointer; vtable pointers are not stable enough
    // to compare.
    fn find(&self, callback: &Arc<Callback>) -> Option<SubscriberId> {
        let wanted = Arc::as_ptr(callback) as *const ();
        self.entries
            .iter()
            .find(|(_, existing)| Arc::as_ptr(existing) as *const () == wanted)
            .map(|(id, _)| *id)
    }
}

/// Handle returned by `subscribe`; removes its callback when asked.
///
/// Dropping the handle does not unsubscribe. The handle holds only a weak
/// reference, so it never keeps a history log alive.
pub struct Subscription {
    id: SubscriberId,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, registry: &Arc<Mutex<Registry>>) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove the callback from the log.
    ///
    /// Safe to call any number of times. Returns `true` only for the call
    /// that actually removed the entry.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.lock().remove(self.id);
        if removed {
            tracing::debug!(
                component = module_path!(),
                op = "unsubscribe",
                subscriber_id = self.id.as_u64(),
                "subscriber removed"
            );
        }
        removed
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Arc<Callback> {
        Arc::new(|_: &[DiffRecord]| {})
    }

    #[test]
    fn test_same_allocation_deduplicated() {
        let mut registry = Registry::default();
        let callback = noop();

        let (first, inserted) = registry.insert(callback.clone());
        assert!(inserted);
        let (second, inserted) = registry.insert(callback);
        assert!(!inserted);
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_callbacks_are_distinct_entries() {
        let mut registry = Registry::default();
        let (a, _) = registry.insert(noop());
        let (b, _) = registry.insert(noop());
        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = Arc::new(Mutex::new(Registry::default()));
        let (id, _) = registry.lock().insert(noop());
        let handle = Subscription::new(id, &registry);

        assert!(handle.unsubscribe());
        assert!(!handle.unsubscribe());
        assert_eq!(registry.lock().len(), 0);
    }

    #[test]
    fn test_handle_outliving_registry() {
        let registry = Arc::new(Mutex::new(Registry::default()));
        let (id, _) = registry.lock().insert(noop());
        let handle = Subscription::new(id, &registry);
        drop(registry);
        assert!(!handle.unsubscribe());
    }
}
