//! Pending-command correlation table.
//!
//! Maps command IDs to the oneshot slots their callers are waiting on.
//! IDs are allocated here as a monotonic sequence starting at 1; every
//! allocated ID keys at most one pending entry, and an entry leaves the
//! table exactly once: fulfilled, failed, removed (cancellation), or
//! drained when the connection dies.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::CommandId;

// ============================================================================
// Types
// ============================================================================

/// Receiving half of a pending command's result slot.
pub type ResultSlot = oneshot::Receiver<Result<Value>>;

/// One in-flight command.
struct PendingCall {
    /// Method name, kept for diagnostics only.
    method: String,
    /// Single-assignment result slot.
    tx: oneshot::Sender<Result<Value>>,
}

// ============================================================================
// CorrelationTable
// ============================================================================

/// Thread-safe table of in-flight commands.
///
/// The ID counter and the map are independent: `fetch_add` makes IDs
/// unique without holding the lock, and the map lock alone guards entry
/// insertion and removal. An entry's oneshot sender is consumed on
/// fulfillment, so a second `fulfill`/`fail` with the same ID finds
/// nothing and reports it.
pub struct CorrelationTable {
    /// Next command ID to hand out.
    next_id: AtomicU64,
    /// Pending entries by command ID.
    pending: Mutex<FxHashMap<CommandId, PendingCall>>,
}

impl CorrelationTable {
    /// Creates an empty table. The first allocated ID is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(FxHashMap::default()),
        }
    }

    /// Allocates an ID, registers a pending entry, and returns the slot
    /// the caller awaits.
    pub fn allocate(&self, method: &str) -> (CommandId, ResultSlot) {
        let id = CommandId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();

        let mut pending = self.pending.lock();
        pending.insert(
            id,
            PendingCall {
                method: method.to_string(),
                tx,
            },
        );

        (id, rx)
    }

    /// Resolves the pending entry for `id` with a success value.
    ///
    /// Returns `false` if no entry exists, which means the command already
    /// resolved, timed out, or was never ours.
    pub fn fulfill(&self, id: CommandId, result: Value) -> bool {
        match self.pending.lock().remove(&id) {
            Some(call) => {
                let _ = call.tx.send(Ok(result));
                true
            }
            None => false,
        }
    }

    /// Resolves the pending entry for `id` with an error.
    ///
    /// Returns `false` if no entry exists.
    pub fn fail(&self, id: CommandId, error: Error) -> bool {
        match self.pending.lock().remove(&id) {
            Some(call) => {
                let _ = call.tx.send(Err(error));
                true
            }
            None => false,
        }
    }

    /// Removes the pending entry for `id` without resolving it.
    ///
    /// Used for cancellation: the wire request is not un-sent, and a late
    /// response for this ID will be dropped as unknown.
    pub fn remove(&self, id: CommandId) -> bool {
        self.pending.lock().remove(&id).is_some()
    }

    /// Fails every remaining entry with [`Error::ConnectionClosed`].
    ///
    /// Called when the connection dies so no caller hangs forever.
    /// Returns the number of entries drained.
    pub fn drain_all(&self) -> usize {
        let drained: Vec<_> = {
            let mut pending = self.pending.lock();
            pending.drain().collect()
        };
        let count = drained.len();

        for (id, call) in drained {
            debug!(id = %id, method = %call.method, "Failing pending command on close");
            let _ = call.tx.send(Err(Error::ConnectionClosed));
        }

        count
    }

    /// Returns the number of in-flight commands.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `true` if no commands are in flight.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl Default for CorrelationTable {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let table = CorrelationTable::new();

        let (first, _rx1) = table.allocate("Page.enable");
        let (second, _rx2) = table.allocate("Page.navigate");

        assert_eq!(first, CommandId::new(1));
        assert_eq!(second, CommandId::new(2));
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_fulfill_resolves_slot() {
        let table = CorrelationTable::new();
        let (id, rx) = table.allocate("Foo.bar");

        assert!(table.fulfill(id, json!({"y": 2})));
        assert!(table.is_empty());

        let value = rx.await.expect("slot filled").expect("success");
        assert_eq!(value, json!({"y": 2}));
    }

    #[tokio::test]
    async fn test_fail_resolves_slot_with_error() {
        let table = CorrelationTable::new();
        let (id, rx) = table.allocate("Foo.bar");

        assert!(table.fail(id, Error::cdp(-32000, "boom")));

        let err = rx.await.expect("slot filled").expect_err("failure");
        assert_eq!(err.cdp_code(), Some(-32000));
    }

    #[test]
    fn test_at_most_once_fulfillment() {
        let table = CorrelationTable::new();
        let (id, _rx) = table.allocate("Foo.bar");

        assert!(table.fulfill(id, json!({})));
        assert!(!table.fulfill(id, json!({})));
        assert!(!table.fail(id, Error::ConnectionClosed));
    }

    #[test]
    fn test_unknown_id_reports_not_found() {
        let table = CorrelationTable::new();
        assert!(!table.fulfill(CommandId::new(999), json!({})));
    }

    #[test]
    fn test_remove_cancels_without_resolving() {
        let table = CorrelationTable::new();
        let (id, rx) = table.allocate("Foo.bar");

        assert!(table.remove(id));
        assert!(!table.remove(id));

        // Sender dropped without a value.
        assert!(rx.blocking_recv().is_err());
    }

    #[tokio::test]
    async fn test_drain_all_fails_everything() {
        let table = CorrelationTable::new();
        let (_id1, rx1) = table.allocate("Page.enable");
        let (_id2, rx2) = table.allocate("Page.navigate");
        let (_id3, rx3) = table.allocate("Network.enable");

        assert_eq!(table.drain_all(), 3);
        assert!(table.is_empty());

        for rx in [rx1, rx2, rx3] {
            let err = rx.await.expect("slot filled").expect_err("failure");
            assert!(matches!(err, Error::ConnectionClosed));
        }
    }

    proptest! {
        #[test]
        fn test_allocated_ids_are_pairwise_distinct(count in 1usize..512) {
            let table = CorrelationTable::new();
            let mut seen = std::collections::HashSet::new();

            for _ in 0..count {
                let (id, _rx) = table.allocate("Foo.bar");
                prop_assert!(seen.insert(id));
            }

            prop_assert_eq!(table.len(), count);
        }
    }
}
