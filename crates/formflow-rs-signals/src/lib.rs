//! # formflow-rs-signals
//!
//! Synchronous change-notification dispatch. A [`Signal`] carries a payload
//! type `T`; receivers connect under a name and are invoked in connection
//! order whenever the signal is sent. The form-state layer uses this to
//! announce field value changes to attached listeners such as cascading
//! dependency controllers.
//!
//! ## Usage
//!
//! ```
//! use formflow_rs_signals::Signal;
//! use std::sync::Arc;
//!
//! let changed: Signal<String> = Signal::new();
//!
//! changed.connect("logger", Arc::new(|key: &String| {
//!     println!("field changed: {key}");
//! }));
//!
//! changed.send(&"email".to_string());
//! assert_eq!(changed.receiver_count(), 1);
//! ```

use std::sync::{Arc, RwLock};

/// The type signature for a signal receiver callback.
///
/// Receivers must be `Send + Sync` so signals can be dispatched from any
/// thread, and return nothing: a receiver reacts to the event, it does not
/// answer it.
pub type Receiver<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A signal that receivers connect to and senders dispatch on.
///
/// Dispatch is synchronous: [`Signal::send`] invokes every receiver before
/// returning. The receiver list is snapshotted before invocation, so a
/// receiver may connect, disconnect, or send on the same signal (or mutate
/// whatever state originated the event) without deadlocking.
pub struct Signal<T> {
    receivers: RwLock<Vec<(String, Receiver<T>)>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Signal<T> {
    /// Creates a new signal with no connected receivers.
    pub fn new() -> Self {
        Self {
            receivers: RwLock::new(Vec::new()),
        }
    }

    /// Connects a receiver under the given id.
    ///
    /// The id identifies the receiver for later disconnection; connecting
    /// a second receiver under an existing id replaces the first.
    pub fn connect(&self, receiver_id: impl Into<String>, callback: Receiver<T>) {
        let id = receiver_id.into();
        let mut receivers = self.receivers.write().expect("signal lock poisoned");
        if let Some(entry) = receivers.iter_mut().find(|(rid, _)| *rid == id) {
            entry.1 = callback;
        } else {
            receivers.push((id, callback));
        }
    }

    /// Disconnects the receiver with the given id.
    ///
    /// Returns `true` if a receiver was found and removed.
    pub fn disconnect(&self, receiver_id: &str) -> bool {
        let mut receivers = self.receivers.write().expect("signal lock poisoned");
        let before = receivers.len();
        receivers.retain(|(id, _)| id != receiver_id);
        receivers.len() < before
    }

    /// Sends the payload to all connected receivers, in connection order.
    ///
    /// The receiver list is cloned out of the lock before any callback
    /// runs; receivers added or removed by a callback take effect from the
    /// next send.
    pub fn send(&self, payload: &T) {
        let snapshot: Vec<Receiver<T>> = {
            let receivers = self.receivers.read().expect("signal lock poisoned");
            receivers.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in snapshot {
            callback(payload);
        }
    }

    /// Returns the number of connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.receivers.read().expect("signal lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_connect_and_send() {
        let signal: Signal<String> = Signal::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();

        signal.connect(
            "counter",
            Arc::new(move |_: &String| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        signal.send(&"hello".to_string());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_receivers_called_in_connection_order() {
        let signal: Signal<()> = Signal::new();
        let order = Arc::new(RwLock::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let o = order.clone();
            signal.connect(
                name,
                Arc::new(move |(): &()| {
                    o.write().unwrap().push(name);
                }),
            );
        }

        signal.send(&());
        assert_eq!(*order.read().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_disconnect() {
        let signal: Signal<()> = Signal::new();
        signal.connect("a", Arc::new(|(): &()| {}));
        signal.connect("b", Arc::new(|(): &()| {}));
        assert_eq!(signal.receiver_count(), 2);

        assert!(signal.disconnect("a"));
        assert_eq!(signal.receiver_count(), 1);

        assert!(!signal.disconnect("missing"));
        assert_eq!(signal.receiver_count(), 1);
    }

    #[test]
    fn test_replace_receiver_with_same_id() {
        let signal: Signal<()> = Signal::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();

        signal.connect("handler", Arc::new(|(): &()| {}));
        signal.connect(
            "handler",
            Arc::new(move |(): &()| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(signal.receiver_count(), 1);
        signal.send(&());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_send_with_no_receivers() {
        let signal: Signal<i32> = Signal::new();
        signal.send(&42);
    }

    #[test]
    fn test_receiver_may_send_reentrantly() {
        let signal: Arc<Signal<u32>> = Arc::new(Signal::new());
        let seen = Arc::new(RwLock::new(Vec::new()));

        let inner = signal.clone();
        let s = seen.clone();
        signal.connect(
            "reentrant",
            Arc::new(move |depth: &u32| {
                s.write().unwrap().push(*depth);
                if *depth == 0 {
                    inner.send(&1);
                }
            }),
        );

        signal.send(&0);
        assert_eq!(*seen.read().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_receiver_may_disconnect_itself() {
        let signal: Arc<Signal<()>> = Arc::new(Signal::new());
        let inner = signal.clone();
        signal.connect(
            "once",
            Arc::new(move |(): &()| {
                inner.disconnect("once");
            }),
        );

        signal.send(&());
        assert_eq!(signal.receiver_count(), 0);
    }
}
