//! Event subscriber registry and fan-out.
//!
//! Maps event names to ordered subscriber lists. Subscribers registered
//! with [`EventBus::once`] remove themselves after their first delivery.
//! Delivery happens on the dispatch loop, in frame-arrival order, so
//! callbacks must not block on network round trips of their own.

// ============================================================================
// Imports
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::identifiers::SubscriptionId;
use crate::protocol::Event;

// ============================================================================
// Types
// ============================================================================

/// Event callback type.
///
/// Called with the full event (method plus raw params); use
/// [`Event::parse`] for typed access to the common events.
pub type EventCallback = Arc<dyn Fn(&Event) + Send + Sync>;

/// One registered subscriber.
struct Subscription {
    /// Removal handle.
    id: SubscriptionId,
    /// The callback.
    callback: EventCallback,
    /// Remove after first delivery.
    once: bool,
}

// ============================================================================
// EventBus
// ============================================================================

/// Registry of event subscribers.
///
/// Subscribers for one event name fire in registration order. Unknown
/// event names simply have no subscribers; the event is dropped after a
/// trace log, never an error.
pub struct EventBus {
    /// Subscribers by event name.
    listeners: Mutex<FxHashMap<String, Vec<Subscription>>>,
}

impl EventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(FxHashMap::default()),
        }
    }

    /// Registers a persistent subscription.
    ///
    /// Multiple subscriptions to the same name are allowed and all fire,
    /// in registration order.
    pub fn on<F>(&self, event: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register(event, Arc::new(callback), false)
    }

    /// Registers a subscription removed automatically after its first
    /// delivery.
    pub fn once<F>(&self, event: &str, callback: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.register(event, Arc::new(callback), true)
    }

    /// Removes a subscription by handle.
    ///
    /// Returns `false` if the subscription was not found (already removed
    /// or never registered under this event name).
    pub fn off(&self, event: &str, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(subscriptions) = listeners.get_mut(event) else {
            return false;
        };

        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        let removed = subscriptions.len() < before;

        if subscriptions.is_empty() {
            listeners.remove(event);
        }

        removed
    }

    /// Delivers an event to every current subscriber of its method name.
    ///
    /// `once` subscribers are unregistered before their callback runs, so
    /// re-entrant registration from inside a callback cannot double-fire
    /// them. A panicking callback is caught and logged; delivery continues
    /// with the remaining subscribers.
    pub fn emit(&self, event: &Event) {
        let to_invoke: Vec<EventCallback> = {
            let mut listeners = self.listeners.lock();
            let Some(subscriptions) = listeners.get_mut(&event.method) else {
                trace!(method = %event.method, "Event with no subscribers");
                return;
            };

            let callbacks = subscriptions
                .iter()
                .map(|s| Arc::clone(&s.callback))
                .collect();

            subscriptions.retain(|s| !s.once);
            if subscriptions.is_empty() {
                listeners.remove(&event.method);
            }

            callbacks
        };

        for callback in to_invoke {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                warn!(method = %event.method, "Event callback panicked");
            }
        }
    }

    /// Returns the number of subscribers for an event name.
    #[inline]
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .get(event)
            .map_or(0, |subscriptions| subscriptions.len())
    }

    /// Registers a subscription.
    fn register(&self, event: &str, callback: EventCallback, once: bool) -> SubscriptionId {
        let id = SubscriptionId::next();
        let mut listeners = self.listeners.lock();

        listeners
            .entry(event.to_string())
            .or_default()
            .push(Subscription { id, callback, once });

        id
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
