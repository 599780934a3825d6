// src/signal.rs

//! Shutdown signalling.
//!
//! OS termination requests (Ctrl-C, and SIGTERM on unix) are turned into a
//! single shutdown notification for the supervisor. Only the first request is
//! delivered; the listener task exits after firing.

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Create a connected trigger / signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = oneshot::channel();
    (
        ShutdownTrigger { tx: Some(tx) },
        ShutdownSignal {
            rx: Some(rx),
            requested: false,
        },
    )
}

/// Sending half. Fires at most once.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: Option<oneshot::Sender<()>>,
}

impl ShutdownTrigger {
    /// Request shutdown. Returns `true` only for the call that actually
    /// delivered the request.
    pub fn fire(&mut self) -> bool {
        match self.tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

/// Receiving half, owned by the supervisor.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: Option<oneshot::Receiver<()>>,
    requested: bool,
}

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self {
            rx: None,
            requested: false,
        }
    }

    /// Resolve once shutdown has been requested.
    ///
    /// If the trigger is dropped without firing this stays pending forever.
    /// Cancel-safe.
    pub async fn requested(&mut self) {
        if self.requested {
            return;
        }
        let Some(rx) = self.rx.as_mut() else {
            return std::future::pending().await;
        };
        let res = rx.await;
        match res {
            Ok(()) => {
                self.requested = true;
                self.rx = None;
            }
            Err(_) => {
                debug!("shutdown trigger dropped without firing");
                self.rx = None;
                std::future::pending::<()>().await;
            }
        }
    }

    /// Non-blocking check.
    pub fn is_requested(&mut self) -> bool {
        if self.requested {
            return true;
        }
        if let Some(rx) = self.rx.as_mut() {
            match rx.try_recv() {
                Ok(()) => {
                    self.requested = true;
                    self.rx = None;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.rx = None;
                }
            }
        }
        self.requested
    }
}

/// Spawn the task that waits for an OS termination request and fires
/// `trigger` once.
pub fn spawn_signal_listener(mut trigger: ShutdownTrigger) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = match wait_for_termination().await {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, "failed to listen for termination signals");
                return;
            }
        };
        info!(signal = name, "termination requested");
        if !trigger.fire() {
            debug!("supervisor already gone; shutdown request not delivered");
        }
    })
}

#[cfg(unix)]
async fn wait_for_termination() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.map(|_| "SIGINT"),
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "ctrl-c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn trigger_delivers_only_once() {
        let (mut trigger, mut signal) = shutdown_channel();
        assert!(!signal.is_requested());
        assert!(trigger.fire());
        assert!(!trigger.fire());
        assert!(signal.is_requested());
        assert!(signal.is_requested());
    }

    #[tokio::test]
    async fn requested_resolves_after_fire() {
        let (mut trigger, mut signal) = shutdown_channel();
        trigger.fire();
        tokio::time::timeout(Duration::from_secs(1), signal.requested())
            .await
            .expect("shutdown should be observed");
        // Stays resolved.
        tokio::time::timeout(Duration::from_secs(1), signal.requested())
            .await
            .expect("shutdown should stay observed");
    }

    #[tokio::test]
    async fn dropped_trigger_never_requests_shutdown() {
        let (trigger, mut signal) = shutdown_channel();
        drop(trigger);
        let res = tokio::time::timeout(Duration::from_millis(50), signal.requested()).await;
        assert!(res.is_err());
        assert!(!signal.is_requested());
    }

    #[tokio::test]
    async fn never_signal_stays_pending() {
        let mut signal = ShutdownSignal::never();
        let res = tokio::time::timeout(Duration::from_millis(20), signal.requested()).await;
        assert!(res.is_err());
        assert!(!signal.is_requested());
    }
}
