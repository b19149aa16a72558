//! Audio pipeline — microphone capture → signal conditioning → level estimation.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioBlock (mpsc) → SignalConditioner
//!           → LevelEstimator ─┬─ instant dB (display)
//!                             └─ 1-second integrated dB (telemetry)
//! ```
//!
//! The acquisition side is abstracted behind [`BlockSource`] so the sampling
//! loop can run against a fake microphone in tests.

pub mod capture;
pub mod conditioner;
pub mod level;

pub use capture::{AudioBlock, BlockSource, CaptureError, CpalSource, StreamHandle};
pub use conditioner::SignalConditioner;
pub use level::{block_rms, rms_to_db, LevelEstimator};
