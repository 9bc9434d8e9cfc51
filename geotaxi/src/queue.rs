use async_channel as mpmc;
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const DEFAULT_CAPACITY: usize = 1024;

/// A datagram as it came off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Bytes,
    pub source: SocketAddr,
}

/// Bounded FIFO between the receiver and the workers.
///
/// Pushing never waits: when the queue is full the datagram is dropped and
/// counted. Popping waits until something arrives. Clones share the same queue.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    sender: mpmc::Sender<Datagram>,
    receiver: mpmc::Receiver<Datagram>,
    capacity: usize,
    dropped: Arc<AtomicU64>,
}

impl WorkQueue {
    pub fn bounded(capacity: usize) -> Self {
        let (sender, receiver) = mpmc::bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
            dropped: Arc::default(),
        }
    }

    /// Returns false if the datagram was dropped.
    pub fn push(&self, datagram: Datagram) -> bool {
        match self.sender.try_send(datagram) {
            Ok(()) => true,
            Err(mpmc::TrySendError::Full(datagram)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "Queue full ({} items), dropping datagram from {}",
                    self.capacity,
                    datagram.source
                );
                false
            }
            Err(mpmc::TrySendError::Closed(_)) => false,
        }
    }

    /// Waits for the next datagram. `None` once the queue is closed and drained.
    pub async fn pop(&self) -> Option<Datagram> {
        self.receiver.recv().await.ok()
    }

    pub fn close(&self) {
        self.sender.close();
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
