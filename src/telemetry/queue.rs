//! Bounded single-producer/single-consumer queue of pending readings.
//!
//! The producer side runs inline on the sampling thread and must never
//! block: when the queue is full, [`ReadingQueue::push`] evicts exactly one
//! (oldest) entry to make room.  The consumer side is the publisher task;
//! [`ReadingQueue::pop_latest`] waits for at least one entry, then discards
//! all backlog except the single newest — stale readings are never sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use super::Reading;

// ---------------------------------------------------------------------------
// ReadingQueue
// ---------------------------------------------------------------------------

/// Bounded FIFO of pending readings shared between the sampling thread and
/// the publisher task.
///
/// Lock scope is a handful of `VecDeque` operations, so the sampling thread
/// never waits on the network — the publisher holds the lock only while
/// draining, never across an HTTP call.
pub struct ReadingQueue {
    inner: Mutex<VecDeque<Reading>>,
    capacity: usize,
    notify: Notify,
}

impl ReadingQueue {
    /// Create a queue holding at most `capacity` pending readings.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ReadingQueue capacity must be > 0");
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify: Notify::new(),
        }
    }

    /// Enqueue a reading without ever blocking the caller.
    ///
    /// When the queue is full the oldest entry is evicted first, so the queue
    /// always holds the most recent readings, never stale backlog beyond
    /// capacity.
    pub fn push(&self, reading: Reading) {
        {
            let mut q = self.inner.lock().unwrap();
            if q.len() == self.capacity {
                let dropped = q.pop_front();
                if let Some(r) = dropped {
                    log::debug!(
                        "telemetry queue full; dropping oldest reading ({:.2} dB)",
                        r.dba_instant
                    );
                }
            }
            q.push_back(reading);
        }
        self.notify.notify_one();
    }

    /// Wait until at least one reading is queued, then take the newest and
    /// discard the rest of the backlog.
    ///
    /// Single-consumer only: relies on `Notify::notify_one` storing a permit
    /// when no task is waiting, so a push between the emptiness check and the
    /// await cannot be missed.
    pub async fn pop_latest(&self) -> Reading {
        loop {
            if let Some(reading) = self.take_latest() {
                return reading;
            }
            self.notify.notified().await;
        }
    }

    /// Non-blocking variant of [`pop_latest`](Self::pop_latest).
    fn take_latest(&self) -> Option<Reading> {
        let mut q = self.inner.lock().unwrap();
        let newest = q.pop_back()?;
        if !q.is_empty() {
            log::debug!("discarding {} stale queued reading(s)", q.len());
            q.clear();
        }
        Some(newest)
    }

    /// Number of readings currently queued.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    /// Returns `true` when no readings are queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
