//! Listener registry and subscriptions.
//!
//! Listeners are stored per event type in registration order. Dispatch
//! takes a snapshot of the list before invoking anyone, so a listener that
//! subscribes or unsubscribes during dispatch only affects later events.

// ============================================================================
// Imports
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, error};

use crate::identifiers::ListenerId;
use crate::protocol::IncomingEvent;

// ============================================================================
// Types
// ============================================================================

/// Listener callback type.
///
/// Called with every incoming event of the subscribed type. A panic inside
/// the callback is caught and logged.
pub type Listener = Arc<dyn Fn(&IncomingEvent) + Send + Sync>;

/// Registry shared between the bridge and its subscriptions.
pub(crate) type SharedRegistry = Arc<Mutex<ListenerRegistry>>;

// ============================================================================
// ListenerRegistry
// ============================================================================

/// Event type → ordered listeners.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: FxHashMap<String, Vec<(ListenerId, Listener)>>,
}

impl ListenerRegistry {
    /// Appends a listener to the end of the event type's list.
    pub(crate) fn insert(&mut self, event_type: &str, id: ListenerId, listener: Listener) {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push((id, listener));
    }

    /// Removes exactly the registration with `id`.
    ///
    /// Returns `true` if it was still present.
    pub(crate) fn remove(&mut self, event_type: &str, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(event_type) else {
            return false;
        };

        let Some(index) = list.iter().position(|(entry_id, _)| *entry_id == id) else {
            return false;
        };

        list.remove(index);
        if list.is_empty() {
            self.listeners.remove(event_type);
        }
        true
    }

    /// Returns `true` if the registration with `id` is present.
    pub(crate) fn contains(&self, event_type: &str, id: ListenerId) -> bool {
        self.listeners
            .get(event_type)
            .is_some_and(|list| list.iter().any(|(entry_id, _)| *entry_id == id))
    }

    /// Clones the current listener list for an event type.
    pub(crate) fn snapshot(&self, event_type: &str) -> Vec<(ListenerId, Listener)> {
        self.listeners.get(event_type).cloned().unwrap_or_default()
    }

    /// Returns the number of listeners for an event type.
    pub(crate) fn len(&self, event_type: &str) -> usize {
        self.listeners.get(event_type).map_or(0, Vec::len)
    }
}

// ============================================================================
// Fan-out
// ============================================================================

/// Invokes every listener in order, isolating panics.
///
/// Returns the number of listeners that panicked.
pub(crate) fn invoke_all(event: &IncomingEvent, listeners: &[(ListenerId, Listener)]) -> usize {
    let mut failures = 0;

    for (id, listener) in listeners {
        let result = catch_unwind(AssertUnwindSafe(|| listener(event)));

        if let Err(payload) = result {
            failures += 1;
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic".to_string()
            };

            error!(
                listener = %id,
                event_type = %event.event_type,
                error = %message,
                "Event listener panicked"
            );
        }
    }

    failures
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle to one listener registration.
///
/// Dropping the handle does not unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe) explicitly.
#[derive(Debug, Clone)]
pub struct Subscription {
    event_type: String,
    id: ListenerId,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    pub(crate) fn new(event_type: &str, id: ListenerId, registry: &SharedRegistry) -> Self {
        Self {
            event_type: event_type.to_string(),
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// Removes this registration.
    ///
    /// Returns `true` if this call removed it; later calls are no-ops and
    /// return `false`. A dispatch already in progress still completes.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };

        let removed = registry.lock().remove(&self.event_type, self.id);
        if removed {
            debug!(listener = %self.id, event_type = %self.event_type, "Listener removed");
        }
        removed
    }

    /// Returns `true` while the registration is still present.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.lock().contains(&self.event_type, self.id))
    }

    /// Returns the subscribed event type.
    #[inline]
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Returns the registration id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use proptest::prelude::*;
    use serde_json::Value;

    fn failing_listener(_: &IncomingEvent) {
        panic!("listener A failed");
    }

    fn recording_listener(log: &Arc<Mutex<Vec<u64>>>, tag: u64) -> Listener {
        let log = Arc::clone(log);
        Arc::new(move |_| log.lock().push(tag))
    }

    #[test]
    fn test_insertion_order_is_dispatch_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::default();

        for tag in 0..3 {
            registry.insert("t", ListenerId::next(), recording_listener(&log, tag));
        }

        invoke_all(&IncomingEvent::new("t", Value::Null), &registry.snapshot("t"));
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_remove_preserves_order_of_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::default();
        let ids: Vec<_> = (0..3).map(|_| ListenerId::next()).collect();

        for (tag, id) in ids.iter().enumerate() {
            registry.insert("t", *id, recording_listener(&log, tag as u64));
        }

        assert!(registry.remove("t", ids[1]));
        assert!(!registry.remove("t", ids[1]));

        invoke_all(&IncomingEvent::new("t", Value::Null), &registry.snapshot("t"));
        assert_eq!(*log.lock(), vec![0, 2]);
    }

    #[test]
    fn test_same_closure_registered_twice_is_removed_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let listener = recording_listener(&log, 7);
        let mut registry = ListenerRegistry::default();
        let first = ListenerId::next();

        registry.insert("t", first, Arc::clone(&listener));
        registry.insert("t", ListenerId::next(), listener);
        registry.remove("t", first);

        assert_eq!(registry.len("t"), 1);
    }

    #[test]
    fn test_empty_lists_are_dropped() {
        let mut registry = ListenerRegistry::default();
        let id = ListenerId::next();
        registry.insert("t", id, Arc::new(|_| {}));
        registry.remove("t", id);

        assert_eq!(registry.len("t"), 0);
        assert!(registry.listeners.is_empty());
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let listeners: Vec<(ListenerId, Listener)> = vec![
            (ListenerId::next(), Arc::new(failing_listener)),
            (ListenerId::next(), recording_listener(&log, 2)),
        ];

        let failures = invoke_all(&IncomingEvent::new("t", Value::Null), &listeners);
        assert_eq!(failures, 1);
        assert_eq!(*log.lock(), vec![2]);
    }

    #[test]
    fn test_subscription_outlives_registry() {
        let registry: SharedRegistry = Arc::default();
        let id = ListenerId::next();
        registry.lock().insert("t", id, Arc::new(|_| {}));
        let subscription = Subscription::new("t", id, &registry);

        assert!(subscription.is_active());
        drop(registry);
        assert!(!subscription.is_active());
        assert!(!subscription.unsubscribe());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Subscribe,
        Unsubscribe(usize),
        Dispatch,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Subscribe),
            (0usize..16).prop_map(Op::Unsubscribe),
            Just(Op::Dispatch),
        ]
    }

    proptest! {
        #[test]
        fn prop_dispatch_hits_exactly_live_listeners(ops in prop::collection::vec(op_strategy(), 1..64)) {
            let registry: SharedRegistry = Arc::default();
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut subscriptions = Vec::new();
            let mut live = BTreeSet::new();
            let mut next_tag = 0u64;

            for op in ops {
                match op {
                    Op::Subscribe => {
                        let id = ListenerId::next();
                        registry.lock().insert("t", id, recording_listener(&log, next_tag));
                        subscriptions.push((next_tag, Subscription::new("t", id, &registry)));
                        live.insert(next_tag);
                        next_tag += 1;
                    }
                    Op::Unsubscribe(index) => {
                        if let Some((tag, subscription)) = subscriptions.get(index) {
                            subscription.unsubscribe();
                            live.remove(tag);
                        }
                    }
                    Op::Dispatch => {
                        log.lock().clear();
                        let snapshot = registry.lock().snapshot("t");
                        invoke_all(&IncomingEvent::new("t", Value::Null), &snapshot);

                        let invoked = log.lock().clone();
                        let expected: Vec<u64> = live.iter().copied().collect();
                        prop_assert_eq!(invoked, expected);
                    }
                }
            }
        }
    }
}
