//! Shutdown coordination for running instances.
//!
//! The coordinator outlives the instances it stops: each instance takes its
//! own `ShutdownSignal` when it starts. A trigger that lands between two
//! instances is remembered, so the next instance stops straight away.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Coordinator for graceful shutdown.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
    triggered: AtomicBool,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            triggered: AtomicBool::new(false),
        }
    }

    /// Hand a new instance its shutdown signal.
    pub fn subscribe(&self) -> ShutdownSignal {
        let rx = self.tx.subscribe();
        ShutdownSignal {
            rx,
            pending: self.triggered.load(Ordering::SeqCst),
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// One instance's view of the shutdown coordinator.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
    /// Shutdown was already triggered when this signal was handed out.
    pending: bool,
}

impl ShutdownSignal {
    /// Wait until shutdown is triggered.
    ///
    /// A coordinator dropped without triggering never requested a shutdown,
    /// so this then waits forever.
    pub async fn recv(&mut self) {
        if self.pending {
            self.pending = false;
            return;
        }
        match self.rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => {
                tracing::debug!("Shutdown coordinator dropped without a trigger");
                std::future::pending::<()>().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();

        shutdown.trigger();
        signal.recv().await;
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_trigger_before_subscribe_is_remembered() {
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let mut signal = shutdown.subscribe();
        tokio::time::timeout(Duration::from_millis(100), signal.recv())
            .await
            .expect("late subscriber missed the shutdown");
    }

    #[tokio::test]
    async fn test_dropped_coordinator_is_not_a_shutdown() {
        let mut signal = Shutdown::new().subscribe();
        let waited = tokio::time::timeout(Duration::from_millis(100), signal.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn test_trigger_then_drop_still_delivers() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        shutdown.trigger();
        drop(shutdown);

        tokio::time::timeout(Duration::from_millis(100), signal.recv())
            .await
            .expect("triggered shutdown was lost");
    }
}
