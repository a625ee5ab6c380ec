//! Plumbing shared by the timer and monitor threads.
//!
//! Cancellation is a zero-capacity channel nobody ever sends on: dropping
//! the sender disconnects the channel, which wakes any `recv_timeout`
//! immediately. Waits are therefore cancellation-aware rather than polled.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tracing::{error, warn};

use crate::integrations::Notifier;

/// Owner side of a cancellation pair.
#[derive(Debug)]
pub(crate) struct CancelHandle {
    tx: Option<Sender<()>>,
}

/// Loop side of a cancellation pair.
#[derive(Debug, Clone)]
pub(crate) struct CancelToken {
    rx: Receiver<()>,
}

pub(crate) fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = bounded(0);
    (CancelHandle { tx: Some(tx) }, CancelToken { rx })
}

impl CancelHandle {
    /// Idempotent.
    pub(crate) fn cancel(&mut self) {
        self.tx.take();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.tx.is_none()
    }
}

impl CancelToken {
    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected) | Ok(()))
    }

    /// Block for `duration` or until cancelled. Returns `true` if cancelled.
    pub(crate) fn wait(&self, duration: Duration) -> bool {
        match self.rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) | Ok(()) => true,
        }
    }
}

/// Run a caller-supplied closure, containing any panic it raises.
///
/// Returns `None` if the closure panicked.
pub(crate) fn guarded<T>(what: &str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            error!(callback = what, "callback panicked; loop continues");
            None
        }
    }
}

/// Best-effort notification. Failures are logged and dropped.
pub(crate) fn deliver(notifier: &dyn Notifier, title: &str, message: &str) {
    let outcome = guarded("notify", || notifier.notify(title, message));
    if let Some(Err(e)) = outcome {
        warn!(error = %e, title, "notification failed");
    }
}
