//! Signal/slot notifications.
//!
//! A [`Signal`] holds any number of connected slots. Emitting the signal
//! invokes every slot in connection order with a reference to the arguments.
//!
//! ```
//! use xfdashboard_core::Signal;
//!
//! let changed = Signal::<(u32, String)>::new();
//! let id = changed.connect(|(n, name)| println!("{n}: {name}"));
//! changed.emit((1, "x".into()));
//! changed.disconnect(id);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Identifier of a signal-slot connection.
    ///
    /// Pass it to [`Signal::disconnect`] to remove the slot.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal with multiple connected slots.
///
/// `Signal<Args>` is `Send + Sync`. Slots run on the emitting thread.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connect a slot. Returns an id for [`disconnect`](Self::disconnect).
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Remove a connection. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Invoke every connected slot with `args`.
    ///
    /// The connection list is snapshotted first, so slots may connect or
    /// disconnect on this signal while it is being emitted.
    #[tracing::instrument(skip_all, target = "xfdashboard_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: "xfdashboard_core::signal", connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Signal<(u32, String)>, Arc<Mutex<Vec<String>>>) {
        let signal = Signal::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        signal.connect(move |(id, name): &(u32, String)| sink.lock().push(format!("{id}:{name}")));
        (signal, seen)
    }

    #[test]
    fn slots_see_every_emission_in_order() {
        let (signal, seen) = recorder();
        signal.emit((1, "opacity".into()));
        signal.emit((2, "color".into()));
        assert_eq!(*seen.lock(), ["1:opacity", "2:color"]);
    }

    #[test]
    fn disconnected_slots_stay_quiet() {
        let (signal, seen) = recorder();
        let extra = signal.connect(|_| panic!("disconnected slot called"));
        assert_eq!(signal.connection_count(), 2);
        assert!(signal.disconnect(extra));
        assert!(!signal.disconnect(extra));

        signal.emit((7, "x".into()));
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn slot_may_disconnect_itself_while_emitting() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(Mutex::new(0));
        let own_id = Arc::new(Mutex::new(None::<ConnectionId>));

        let (sig, counter, cell) = (Arc::clone(&signal), Arc::clone(&calls), Arc::clone(&own_id));
        let id = signal.connect(move |_| {
            *counter.lock() += 1;
            if let Some(id) = *cell.lock() {
                sig.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        signal.emit(());
        assert_eq!(*calls.lock(), 1);
        assert_eq!(signal.connection_count(), 0);
    }
}
