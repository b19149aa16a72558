//! `Collector` trait, HTTP collector and the publisher task loop.
//!
//! The publisher runs as an independent tokio task, consuming only from the
//! [`ReadingQueue`].  It never feeds anything back into the sampling path:
//! a slow or dead collector costs queued readings, never audio blocks.
//!
//! # Delivery semantics
//!
//! At-most-once per reading.  Once a reading is dequeued and a send attempt
//! is made, that reading is gone regardless of outcome; failures only delay
//! the *next* attempt via [`Backoff`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TelemetryConfig;

use super::{Backoff, Reading, ReadingQueue};

// ---------------------------------------------------------------------------
// PublishError
// ---------------------------------------------------------------------------

/// Errors that can occur while delivering a reading.
#[derive(Debug, Error)]
pub enum PublishError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("collector request timed out")]
    Timeout,

    /// The collector answered with a non-2xx status.
    #[error("collector returned HTTP {0}")]
    Status(u16),
}

impl From<reqwest::Error> for PublishError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PublishError::Timeout
        } else if let Some(status) = e.status() {
            PublishError::Status(status.as_u16())
        } else {
            PublishError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Collector trait
// ---------------------------------------------------------------------------

/// Async trait for delivering one reading to the remote collector.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn Collector>`; tests substitute mocks for the HTTP backend.
#[async_trait]
pub trait Collector: Send + Sync {
    async fn publish(&self, reading: &Reading) -> Result<(), PublishError>;
}

// ---------------------------------------------------------------------------
// HttpCollector
// ---------------------------------------------------------------------------

/// Posts readings as JSON to the configured collector URL.
///
/// All connection details (`collector_url`, `device_id`, timeout) come
/// exclusively from the [`TelemetryConfig`] passed to
/// [`HttpCollector::from_config`]; nothing is hardcoded.
///
/// Only 2xx responses count as delivered.  The firmware this replaces
/// treated any transport-level return as success, resetting backoff even on
/// 4xx/5xx; here error statuses are failures and feed the backoff.
pub struct HttpCollector {
    client: reqwest::Client,
    url: String,
    device_id: String,
}

impl HttpCollector {
    /// Build an `HttpCollector` from telemetry config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &TelemetryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: config.collector_url.clone(),
            device_id: config.device_id.clone(),
        }
    }
}

/// JSON body for one reading, with `dba_instant` rounded to 2 decimals.
fn payload(reading: &Reading, device_id: &str) -> serde_json::Value {
    serde_json::json!({
        "dba_instant": (reading.dba_instant * 100.0).round() / 100.0,
        "device_id": device_id,
    })
}

#[async_trait]
impl Collector for HttpCollector {
    async fn publish(&self, reading: &Reading) -> Result<(), PublishError> {
        let response = self
            .client
            .post(&self.url)
            .json(&payload(reading, &self.device_id))
            .send()
            .await?;

        // No response body is consumed; only the status matters.
        response.error_for_status()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Drains the reading queue and posts to the collector, backing off on
/// failure.
///
/// Create with [`Publisher::new`], then spawn [`run`](Self::run) as a tokio
/// task from `main()`.  It never returns.
pub struct Publisher {
    queue: Arc<ReadingQueue>,
    collector: Arc<dyn Collector>,
    backoff: Backoff,
}

impl Publisher {
    pub fn new(queue: Arc<ReadingQueue>, collector: Arc<dyn Collector>, backoff: Backoff) -> Self {
        Self {
            queue,
            collector,
            backoff,
        }
    }

    /// Build a publisher with an [`HttpCollector`] from config.
    pub fn from_config(queue: Arc<ReadingQueue>, config: &TelemetryConfig) -> Self {
        Self::new(
            queue,
            Arc::new(HttpCollector::from_config(config)),
            Backoff::new(
                Duration::from_secs(config.backoff_base_secs),
                Duration::from_secs(config.backoff_max_secs),
            ),
        )
    }

    /// Publisher main loop: wait for a reading, attempt delivery, sleep out
    /// the backoff delay on failure.  Runs for the process lifetime.
    pub async fn run(mut self) {
        loop {
            let reading = self.queue.pop_latest().await;
            if let Some(delay) = self.attempt(&reading).await {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// One delivery attempt.
    ///
    /// On success the backoff resets and `None` is returned; on failure the
    /// reading is discarded (at-most-once) and the delay to sleep before the
    /// next attempt is returned.
    async fn attempt(&mut self, reading: &Reading) -> Option<Duration> {
        match self.collector.publish(reading).await {
            Ok(()) => {
                log::debug!("delivered reading ({:.2} dB)", reading.dba_instant);
                self.backoff.reset();
                None
            }
            Err(e) => {
                let delay = self.backoff.next_delay();
                log::warn!(
                    "failed to deliver reading ({:.2} dB): {e}; next attempt in {:?}",
                    reading.dba_instant,
                    delay
                );
                Some(delay)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
