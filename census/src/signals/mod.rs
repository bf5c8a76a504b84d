//! In-process observer registration for census events.
//!
//! A [`Signal`] is owned by whoever emits it (see [`CensusSignals`]) and is
//! cheap to clone: clones share the same receiver list, so a host can keep a
//! handle and connect receivers after the manager has been built.

mod events;

pub use events::{CensusSignals, ReplyCreated, StatusChanged};

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("Receiver failed: {0}")]
    ReceiverFailed(String),

    #[error("Receiver panicked: {0}")]
    ReceiverPanicked(String),
}

type ReceiverFn<T> = Arc<dyn Fn(&T) -> Result<(), SignalError> + Send + Sync>;

struct ReceiverInfo<T> {
    dispatch_uid: String,
    receiver: ReceiverFn<T>,
}

impl<T> Clone for ReceiverInfo<T> {
    fn clone(&self) -> Self {
        Self {
            dispatch_uid: self.dispatch_uid.clone(),
            receiver: Arc::clone(&self.receiver),
        }
    }
}

pub struct Signal<T> {
    name: &'static str,
    receivers: Arc<RwLock<Vec<ReceiverInfo<T>>>>,
}

impl<T> Signal<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            receivers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Connects a receiver under `dispatch_uid`. A receiver already connected
    /// with the same uid is replaced.
    pub fn connect<F>(&self, dispatch_uid: impl Into<String>, receiver: F)
    where
        F: Fn(&T) -> Result<(), SignalError> + Send + Sync + 'static,
    {
        let dispatch_uid = dispatch_uid.into();
        let mut receivers = self.receivers.write().unwrap_or_else(|e| e.into_inner());
        receivers.retain(|r| r.dispatch_uid != dispatch_uid);
        debug!(signal = self.name, dispatch_uid = %dispatch_uid, "Connecting receiver");
        receivers.push(ReceiverInfo {
            dispatch_uid,
            receiver: Arc::new(receiver),
        });
    }

    pub fn disconnect(&self, dispatch_uid: &str) -> bool {
        let mut receivers = self.receivers.write().unwrap_or_else(|e| e.into_inner());
        let original_len = receivers.len();
        receivers.retain(|r| r.dispatch_uid != dispatch_uid);
        receivers.len() < original_len
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Delivers `payload` to every receiver, in connection order.
    ///
    /// A receiver that returns an error or panics does not stop delivery to
    /// the others, and nothing is propagated to the sender: failures are
    /// logged and returned, one result per receiver.
    pub fn send_robust(&self, payload: &T) -> Vec<Result<(), SignalError>> {
        // Snapshot so receivers may connect/disconnect while being notified.
        let receivers = self
            .receivers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let mut results = Vec::with_capacity(receivers.len());
        for info in receivers {
            let result = match panic::catch_unwind(AssertUnwindSafe(|| (info.receiver)(payload)))
            {
                Ok(result) => result,
                Err(panic) => Err(SignalError::ReceiverPanicked(panic_message(panic.as_ref()))),
            };

            if let Err(ref e) = result {
                warn!(
                    signal = self.name,
                    dispatch_uid = %info.dispatch_uid,
                    error = %e,
                    "Signal receiver failed"
                );
            }
            results.push(result);
        }
        results
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            receivers: Arc::clone(&self.receivers),
        }
    }
}

impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("receivers", &self.receiver_count())
            .finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_send_robust_reaches_every_receiver() {
        let signal: Signal<u32> = Signal::new("test");
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        signal.connect("first", move |value: &u32| {
            counter.fetch_add(*value as usize, Ordering::SeqCst);
            Ok(())
        });
        signal.connect("failing", |_: &u32| {
            Err(SignalError::ReceiverFailed("boom".to_string()))
        });
        signal.connect("panicking", |_: &u32| -> Result<(), SignalError> {
            panic!("receiver exploded")
        });
        let counter = seen.clone();
        signal.connect("last", move |value: &u32| {
            counter.fetch_add(*value as usize, Ordering::SeqCst);
            Ok(())
        });

        let results = signal.send_robust(&5);

        assert_eq!(seen.load(Ordering::SeqCst), 10);
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(SignalError::ReceiverFailed("boom".to_string()))
        );
        assert_eq!(
            results[2],
            Err(SignalError::ReceiverPanicked("receiver exploded".to_string()))
        );
        assert!(results[3].is_ok());
    }

    #[test]
    fn test_connect_replaces_same_dispatch_uid() {
        let signal: Signal<()> = Signal::new("test");
        signal.connect("receiver", |_: &()| Ok(()));
        signal.connect("receiver", |_: &()| Ok(()));
        assert_eq!(signal.receiver_count(), 1);

        assert!(signal.disconnect("receiver"));
        assert!(!signal.disconnect("receiver"));
        assert_eq!(signal.receiver_count(), 0);
        assert!(signal.send_robust(&()).is_empty());
    }

    #[test]
    fn test_clones_share_receivers() {
        let signal: Signal<()> = Signal::new("test");
        let handle = signal.clone();
        handle.connect("late", |_: &()| Ok(()));
        assert_eq!(signal.receiver_count(), 1);
    }
}
