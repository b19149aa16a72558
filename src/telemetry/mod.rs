//! Telemetry — bounded reading queue, exponential backoff, HTTP publisher.
//!
//! # Data flow
//!
//! ```text
//! sampling thread ──push──▶ ReadingQueue ──pop_latest──▶ Publisher ──POST──▶ collector
//!                  (evict oldest when full)  (newest wins)   (backoff on failure)
//! ```
//!
//! Delivery is lossy by design: the queue keeps at most `capacity` pending
//! readings, the publisher transmits only the newest backlog entry, and a
//! reading that fails to send is discarded rather than retried.  Only the
//! sampling thread produces and only the publisher task consumes.

pub mod backoff;
pub mod publisher;
pub mod queue;

pub use backoff::Backoff;
pub use publisher::{Collector, HttpCollector, PublishError, Publisher};
pub use queue::ReadingQueue;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One 1-second integrated dB(A)-like reading bound for the collector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Integrated level in dB over the last window.
    pub dba_instant: f64,
}
