//! Cancellation coordination for background tasks.
//!
//! One [`Shutdown`] exists per wallet session (its pollers stop on
//! disconnect), per connect attempt, and one for the whole process.

use tokio::sync::watch;

/// Coordinator for cooperative cancellation.
///
/// Provides a latched signal that any number of tasks can subscribe to,
/// including tasks that subscribe after the signal fired.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Create a new, untriggered coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Subscribe to the signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal { rx: self.tx.subscribe() }
    }

    /// Trigger the signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the signal has fired.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of a [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once the signal fires (or its coordinator is dropped).
    pub async fn recv(&mut self) {
        // A dropped coordinator can never fire again; treat it as fired.
        let _ = self.rx.wait_for(|fired| *fired).await;
    }

    /// Non-blocking check.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}
