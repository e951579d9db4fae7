//! Timed waits and cancellation
//!
//! The hold between keying transitions is a cancellable timed wait built on a
//! crossbeam channel: `recv_timeout` returns early when a cancel message
//! arrives and otherwise times out after the hold duration.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

/// How a hold ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    Elapsed,
    Cancelled,
}

/// Receiving side of a cancellation request, checked by the driver.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: Receiver<()>,
}

/// Sending side; dropping it without cancelling leaves the transmission running.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    /// Request cancellation. Returns false if a request is already pending
    /// or the transmission side is gone.
    pub fn cancel(&self) -> bool {
        self.tx.try_send(()).is_ok()
    }
}

/// Create a connected cancel handle / token pair.
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    (CancelHandle { tx }, Cancellation { rx })
}

impl Cancellation {
    /// A token that is never cancelled
    pub fn never() -> Self {
        Self {
            rx: crossbeam_channel::never(),
        }
    }

    /// Non-blocking check, consumes a pending request
    pub fn is_cancelled(&self) -> bool {
        matches!(self.rx.try_recv(), Ok(()))
    }

    /// Drop requests left over from an earlier transmission.
    /// Returns how many were discarded.
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }

    /// Block for `duration` unless cancelled first.
    pub fn wait(&self, duration: Duration) -> HoldOutcome {
        let deadline = Instant::now() + duration;
        match self.rx.recv_timeout(duration) {
            Ok(()) => HoldOutcome::Cancelled,
            Err(RecvTimeoutError::Timeout) => HoldOutcome::Elapsed,
            Err(RecvTimeoutError::Disconnected) => {
                // Handle dropped: nobody can cancel any more, finish the hold.
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                HoldOutcome::Elapsed
            }
        }
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::never()
    }
}

/// Wait primitive used by the transmission driver between keying transitions.
pub trait Wait {
    fn hold(&mut self, duration: Duration, cancel: &Cancellation) -> HoldOutcome;
}

/// Real-time wait on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadWait;

impl Wait for ThreadWait {
    fn hold(&mut self, duration: Duration, cancel: &Cancellation) -> HoldOutcome {
        cancel.wait(duration)
    }
}
