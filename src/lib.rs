//! noise-watch — continuous noise-level measurement and telemetry.
//!
//! Digitizes microphone audio, converts it into a dB(A)-like estimate at two
//! cadences (per-block for the local widget, 1-second integrated for
//! telemetry) and forwards the 1-second readings to a remote HTTP collector
//! — without ever letting network stalls block audio sampling or the local
//! display.
//!
//! # Data flow
//!
//! ```text
//! microphone ─▶ audio::capture ─▶ audio::conditioner ─▶ audio::level
//!                                      │                     │
//!                 display ◀── pipeline::SharedLevel ◀────────┤  (per block)
//!                                                            │
//!                 telemetry::ReadingQueue ◀──────────────────┘  (per second)
//!                        │
//!                 telemetry::Publisher ──POST──▶ collector
//! ```
//!
//! The sampling loop runs on a dedicated thread; the publisher runs as a
//! tokio task; the widget runs on the main thread.  The only shared state is
//! the bounded reading queue and the level snapshot.

pub mod app;
pub mod audio;
pub mod config;
pub mod display;
pub mod pipeline;
pub mod telemetry;
