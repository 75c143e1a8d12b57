//! Cooperative shutdown coordination.
//!
//! A single cancellation event, fired by the first OS termination
//! signal (or an explicit [`ShutdownCoordinator::trigger`]), fans out
//! to every component that must stop: the publisher loop, the
//! subscriber drain, and the main wait.

use tokio::sync::watch;

/// Owns the process-wide cancellation event.
///
/// Starts armed; the first trigger fires the event for every observer.
/// Further triggers have no additional effect.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: watch::Sender<bool>,
}

/// Cloneable observer of the cancellation event.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Returns a new observer of the cancellation event.
    pub fn handle(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Fires the cancellation event. Idempotent.
    pub fn trigger(&self) {
        // send_replace succeeds even with no live observers.
        self.tx.send_replace(true);
    }

    /// Spawns a listener that triggers the event on the first
    /// termination signal. Subsequent signals are no-ops.
    pub fn bind_signals(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            termination_signal().await;
            log::info!("exit signal received");
            tx.send_replace(true);
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolves once the event has been triggered; immediately if it
    /// already was.
    pub async fn cancelled(&mut self) {
        // wait_for inspects the current value before waiting, so a
        // trigger that raced ahead of this call is not missed.
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }

    /// Whether the event has been triggered, without waiting.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Waits for SIGINT or SIGTERM (plain ctrl-c on non-unix targets).
#[cfg(unix)]
async fn termination_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to listen for SIGTERM");
    let ctrl_c = tokio::signal::ctrl_c();

    tokio::select! {
        _ = sigterm.recv() => {}
        _ = ctrl_c => {}
    }
}

#[cfg(not(unix))]
async fn termination_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn trigger_unblocks_waiting_observer_test() {
        let coordinator = ShutdownCoordinator::new();
        let mut signal = coordinator.handle();

        let waiter = tokio::spawn(async move { signal.cancelled().await });
        coordinator.trigger();

        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("observer did not unblock")
            .unwrap();
    }

    #[tokio::test]
    async fn trigger_before_wait_resolves_immediately_test() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.trigger();

        let mut signal = coordinator.handle();
        timeout(Duration::from_millis(100), signal.cancelled())
            .await
            .expect("already-triggered event should resolve at once");
    }

    #[tokio::test]
    async fn trigger_is_idempotent_test() {
        let coordinator = ShutdownCoordinator::new();
        let mut first = coordinator.handle();
        let mut second = coordinator.handle();

        coordinator.trigger();
        coordinator.trigger();

        timeout(Duration::from_secs(1), first.cancelled())
            .await
            .expect("first observer did not unblock");
        timeout(Duration::from_secs(1), second.cancelled())
            .await
            .expect("second observer did not unblock");
        assert!(coordinator.handle().is_triggered());
    }

    #[tokio::test]
    async fn untriggered_event_does_not_resolve_test() {
        let coordinator = ShutdownCoordinator::new();
        let mut signal = coordinator.handle();

        assert!(!signal.is_triggered());
        let waited = timeout(Duration::from_millis(50), signal.cancelled()).await;
        assert!(waited.is_err(), "event resolved without a trigger");
    }
}
