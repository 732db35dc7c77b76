use axum::body::Bytes;
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Full,
    Closed,
}

struct Shared {
    sender: RwLock<Option<mpsc::Sender<Bytes>>>,
    receiver: Mutex<mpsc::Receiver<Bytes>>,
    /// Counted after a send lands, so a fast consumer may briefly drive it below zero.
    depth: AtomicIsize,
    capacity: usize,
}

/// Bounded multi-producer/multi-consumer buffer of raw payment bodies.
///
/// `enqueue` never waits: a full or closed queue rejects immediately.
#[derive(Clone)]
pub struct AdmissionQueue {
    shared: Arc<Shared>,
}

impl AdmissionQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            shared: Arc::new(Shared {
                sender: RwLock::new(Some(tx)),
                receiver: Mutex::new(rx),
                depth: AtomicIsize::new(0),
                capacity,
            }),
        }
    }

    pub fn enqueue(&self, raw: Bytes) -> Admission {
        let Ok(guard) = self.shared.sender.read() else {
            return Admission::Rejected(RejectReason::Closed);
        };
        let Some(tx) = guard.as_ref() else {
            return Admission::Rejected(RejectReason::Closed);
        };

        match tx.try_send(raw) {
            Ok(()) => {
                self.shared.depth.fetch_add(1, Ordering::SeqCst);
                Admission::Accepted
            }
            Err(TrySendError::Full(_)) => Admission::Rejected(RejectReason::Full),
            Err(TrySendError::Closed(_)) => Admission::Rejected(RejectReason::Closed),
        }
    }

    /// Waits for the next item. Returns `None` once the queue is closed and drained.
    pub async fn dequeue(&self) -> Option<Bytes> {
        let mut rx = self.shared.receiver.lock().await;
        let item = rx.recv().await;
        if item.is_some() {
            self.shared.depth.fetch_sub(1, Ordering::SeqCst);
        }
        item
    }

    /// Stops admissions. Already buffered items stay available to `dequeue`.
    pub fn close(&self) {
        if let Ok(mut guard) = self.shared.sender.write() {
            guard.take();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.shared.sender.read().map(|g| g.is_none()).unwrap_or(true)
    }

    /// Never more than the items actually buffered, so never above `capacity`.
    pub fn len(&self) -> usize {
        self.shared.depth.load(Ordering::SeqCst).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn items_come_out_in_admission_order() {
        let q = AdmissionQueue::new(4);
        assert_eq!(q.enqueue(Bytes::from_static(b"a")), Admission::Accepted);
        assert_eq!(q.enqueue(Bytes::from_static(b"b")), Admission::Accepted);
        assert_eq!(q.len(), 2);
        assert_eq!(q.dequeue().await.as_deref(), Some(&b"a"[..]));
        assert_eq!(q.dequeue().await.as_deref(), Some(&b"b"[..]));
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn zero_capacity_is_bumped_to_one() {
        let q = AdmissionQueue::new(0);
        assert_eq!(q.capacity(), 1);
        assert_eq!(q.enqueue(Bytes::from_static(b"a")), Admission::Accepted);
        assert_eq!(
            q.enqueue(Bytes::from_static(b"b")),
            Admission::Rejected(RejectReason::Full)
        );
    }
}
