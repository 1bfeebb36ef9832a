//! Shutdown signal for stopping a [`Server`](crate::Server) loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable flag that asks a server loop to stop.
///
/// The loop checks the flag between messages, so a server blocked on a read
/// stops after the next message arrives or the input ends.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a signal that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`Self::signal`] has been called on any clone.
    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Request shutdown. Every clone observes it.
    pub fn signal(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }
}
