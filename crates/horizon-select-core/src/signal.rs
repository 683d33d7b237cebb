//! Synchronous notifications.
//!
//! A [`Signal`] owns a table of slots. [`Signal::emit`] calls every slot
//! with a reference to the payload, in the order the slots were connected.
//! The selection controller exposes its `items-changed`, `select` and
//! property-change notifications this way.
//!
//! The table lock is released before any slot runs, so a slot may connect
//! or disconnect slots (itself included). Changes made during an emission
//! apply from the next one.
//!
//! ```
//! use horizon_select_core::Signal;
//!
//! let selection_changed = Signal::<Vec<usize>>::new();
//! let id = selection_changed.connect(|indices| println!("now selected: {indices:?}"));
//! selection_changed.emit(vec![0, 2]);
//! assert!(selection_changed.disconnect(id));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle to one connected slot.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

struct Connection<Args> {
    slot: Slot<Args>,
    /// Slot keys are reused after a disconnect, so ordering needs its own counter.
    seq: u64,
}

struct Connections<Args> {
    map: SlotMap<ConnectionId, Connection<Args>>,
    next_seq: u64,
}

/// A list of callbacks invoked with `&Args` on every emit.
///
/// Use `()` for notifications without a payload.
pub struct Signal<Args> {
    connections: Arc<Mutex<Connections<Args>>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(Connections {
                map: SlotMap::with_key(),
                next_seq: 0,
            })),
        }
    }

    /// Add a slot. It runs after every slot connected before it.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut connections = self.connections.lock();
        let seq = connections.next_seq;
        connections.next_seq += 1;
        connections.map.insert(Connection {
            slot: Arc::new(slot),
            seq,
        })
    }

    /// Add a slot that stays connected while the returned guard lives.
    ///
    /// ```
    /// use horizon_select_core::Signal;
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// let items_changed = Signal::<usize>::new();
    /// let seen = Arc::new(AtomicUsize::new(0));
    /// {
    ///     let seen = seen.clone();
    ///     let _guard = items_changed.connect_scoped(move |&count| {
    ///         seen.store(count, Ordering::SeqCst);
    ///     });
    ///     items_changed.emit(3);
    /// }
    /// items_changed.emit(5);
    /// assert_eq!(seen.load(Ordering::SeqCst), 3);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            id: self.connect(slot),
            connections: Arc::downgrade(&self.connections),
        }
    }

    /// Remove a slot. Returns `false` if it was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().map.remove(id).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().map.len()
    }

    /// Call every slot with `args`.
    #[tracing::instrument(skip_all, target = "horizon_select_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let slots = self.snapshot();
        tracing::trace!(target: "horizon_select_core::signal", slots = slots.len(), "emit");
        for slot in slots {
            slot(&args);
        }
    }

    fn snapshot(&self) -> Vec<Slot<Args>> {
        let connections = self.connections.lock();
        let mut ordered: Vec<(u64, Slot<Args>)> = connections
            .map
            .values()
            .map(|c| (c.seq, c.slot.clone()))
            .collect();
        drop(connections);

        ordered.sort_by_key(|(seq, _)| *seq);
        ordered.into_iter().map(|(_, slot)| slot).collect()
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connections.lock().map.len())
            .finish()
    }
}

/// Disconnects its slot when dropped.
///
/// Holds the connection table weakly, so dropping it after the signal is
/// gone is fine.
pub struct ConnectionGuard<Args> {
    connections: Weak<Mutex<Connections<Args>>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.upgrade() {
            connections.lock().map.remove(self.id);
        }
    }
}

impl<Args> fmt::Debug for ConnectionGuard<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConnectionGuard").field(&self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        signal.connect(move |value: &T| sink.lock().push(value.clone()));
        log
    }

    #[test]
    fn test_emit_reaches_slot() {
        let signal = Signal::<&'static str>::new();
        let log = recorder(&signal);
        signal.emit("items-changed");
        signal.emit("select");
        assert_eq!(*log.lock(), vec!["items-changed", "select"]);
    }

    #[test]
    fn test_disconnect_twice() {
        let signal = Signal::<u8>::new();
        let id = signal.connect(|_| {});
        assert!(signal.disconnect(id));
        assert!(!signal.disconnect(id));
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_reused_key_keeps_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let ids: Vec<_> = (0..3)
            .map(|n| {
                let order = order.clone();
                signal.connect(move |_| order.lock().push(n))
            })
            .collect();

        signal.disconnect(ids[0]);
        let late = order.clone();
        signal.connect(move |_| late.lock().push(9));

        signal.emit(());
        assert_eq!(*order.lock(), vec![1, 2, 9]);
    }

    #[test]
    fn test_slot_disconnects_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let own_id: Arc<Mutex<Option<ConnectionId>>> = Arc::new(Mutex::new(None));

        let inner = signal.clone();
        let cell = own_id.clone();
        let id = signal.connect(move |_| {
            if let Some(id) = cell.lock().take() {
                inner.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        assert_eq!(signal.connection_count(), 0);
    }

    #[test]
    fn test_guard_disconnects_on_drop() {
        let signal = Signal::<i32>::new();
        let guard = signal.connect_scoped(|_| {});
        let id = guard.id();
        drop(guard);
        assert!(!signal.disconnect(id));
    }
}
