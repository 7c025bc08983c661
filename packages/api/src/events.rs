//! Named events emitted by a hypercore.
//!
//! Listeners are shared closures; a listener is identified by the `Arc` it
//! lives in, so the same `Listener` value that was subscribed is the one to
//! pass to `unsubscribe`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::Peer;

/// One argument of an emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventArg {
    Index(u64),
    Bytes(Bytes),
    Peer(Peer),
    Flag(bool),
}

/// An event listener. Receives the event's arguments as emitted.
pub type Listener = Arc<dyn Fn(&[EventArg]) + Send + Sync>;

/// Event subscription.
///
/// Wrappers implement this by delegating straight to the wrapped resource,
/// so listeners receive the resource's own emissions.
pub trait EventSource {
    /// Register `listener` for `event`.
    fn subscribe(&self, event: &str, listener: Listener);

    /// Remove a previously registered `listener` from `event`.
    ///
    /// Removing a listener that is not registered does nothing.
    fn unsubscribe(&self, event: &str, listener: &Listener);
}

/// A listener registry for resource implementations.
///
/// Emission snapshots the listener list first, so listeners may subscribe
/// or unsubscribe while an event is being delivered.
#[derive(Default)]
pub struct Emitter {
    listeners: Mutex<BTreeMap<String, Vec<Listener>>>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `args` to every listener of `event`, in subscription order.
    ///
    /// Returns true if the event had listeners.
    pub fn emit(&self, event: &str, args: &[EventArg]) -> bool {
        let snapshot = {
            let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            match listeners.get(event) {
                Some(list) if !list.is_empty() => list.clone(),
                _ => return false,
            }
        };

        for listener in snapshot {
            listener(args);
        }
        true
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(event)
            .map_or(0, Vec::len)
    }
}

impl EventSource for Emitter {
    fn subscribe(&self, event: &str, listener: Listener) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(event.to_string())
            .or_default()
            .push(listener);
    }

    fn unsubscribe(&self, event: &str, listener: &Listener) {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(list) = listeners.get_mut(event) {
            // Only the most recent registration goes, matching one subscribe.
            if let Some(pos) = list.iter().rposition(|l| Arc::ptr_eq(l, listener)) {
                list.remove(pos);
            }
            if list.is_empty() {
                listeners.remove(event);
            }
        }
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let counts: BTreeMap<&str, usize> = listeners
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("Emitter").field("listeners", &counts).finish()
    }
}
