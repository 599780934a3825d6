// src/engine/queue.rs

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace};

use super::TriggerReason;

/// Fixed capacity of the rebuild queue.
pub const REBUILD_QUEUE_CAPACITY: usize = 5;

/// Token meaning "the watched tree changed, rebuild".
///
/// The reason is only carried for logging; the supervisor treats every
/// signal the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildSignal {
    pub reason: TriggerReason,
}

impl RebuildSignal {
    pub fn startup() -> Self {
        Self {
            reason: TriggerReason::Startup,
        }
    }

    pub fn file_change() -> Self {
        Self {
            reason: TriggerReason::FileChange,
        }
    }
}

/// Result of offering a signal to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    Accepted,
    /// Queue full; the signals already pending will cause a rebuild anyway.
    Dropped,
    /// The supervisor is gone.
    Closed,
}

/// Producer side of the rebuild queue.
///
/// Never blocks: bursts of filesystem events collapse into at most
/// `capacity` pending rebuilds and everything beyond that is discarded.
#[derive(Debug, Clone)]
pub struct RebuildSender {
    tx: mpsc::Sender<RebuildSignal>,
}

impl RebuildSender {
    pub fn offer(&self, signal: RebuildSignal) -> Enqueue {
        match self.tx.try_send(signal) {
            Ok(()) => {
                trace!(reason = ?signal.reason, "rebuild signal queued");
                Enqueue::Accepted
            }
            Err(TrySendError::Full(_)) => {
                debug!(reason = ?signal.reason, "rebuild queue full; dropping signal");
                Enqueue::Dropped
            }
            Err(TrySendError::Closed(_)) => Enqueue::Closed,
        }
    }

    /// Number of signals currently waiting for the supervisor.
    pub fn pending(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

/// Consumer side of the rebuild queue, owned by the supervisor.
#[derive(Debug)]
pub struct RebuildReceiver {
    rx: mpsc::Receiver<RebuildSignal>,
}

impl RebuildReceiver {
    /// Wait for the next signal. `None` once every sender has been dropped
    /// and the queue is drained.
    pub async fn recv(&mut self) -> Option<RebuildSignal> {
        self.rx.recv().await
    }

    /// Discard every signal that is already pending without waiting.
    ///
    /// The supervisor calls this right after picking up a signal so that one
    /// burst of changes results in one rebuild. Returns how many were
    /// discarded.
    pub fn drain_pending(&mut self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        if drained > 0 {
            debug!(drained, "coalesced pending rebuild signals");
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

/// Create a bounded rebuild queue.
///
/// `capacity` is clamped to at least 1.
pub fn rebuild_queue(capacity: usize) -> (RebuildSender, RebuildReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RebuildSender { tx }, RebuildReceiver { rx })
}
