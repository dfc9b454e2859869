//! # Sample Transport Queue
//!
//! Unbounded FIFO hand-off between ingestion and the aggregation worker,
//! built on crossbeam channels. The queue closes when the last
//! [`SampleSender`] is dropped, so a consumer can tell "nothing yet" from
//! "nothing more" without depending on the producer finishing first.

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::window::SampleWindow;

/// Creates a connected sender/receiver pair.
pub fn sample_queue() -> (SampleSender, SampleReceiver) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (SampleSender { tx }, SampleReceiver { rx })
}

/// Producer half of the queue.
#[derive(Debug, Clone)]
pub struct SampleSender {
    tx: Sender<SampleWindow>,
}

impl SampleSender {
    /// Appends a window at the tail. Returns `false` if the receiver is gone.
    pub fn push(&self, window: SampleWindow) -> bool {
        self.tx.send(window).is_ok()
    }

    /// Signals that no more windows will be pushed from this sender.
    pub fn close(self) {
        drop(self);
    }
}

/// Consumer half of the queue.
#[derive(Debug)]
pub struct SampleReceiver {
    rx: Receiver<SampleWindow>,
}

impl SampleReceiver {
    /// Removes and returns the oldest window without blocking, or `None`
    /// when the queue is currently empty.
    pub fn get(&self) -> Option<SampleWindow> {
        match self.rx.try_recv() {
            Ok(window) => Some(window),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Blocks until a window is available. Returns `None` once every sender
    /// has been dropped and the remaining windows have been drained.
    pub fn recv(&self) -> Option<SampleWindow> {
        self.rx.recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}
