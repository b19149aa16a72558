//! Configuration — settings structs, TOML persistence, platform paths.
//!
//! [`AppConfig`] is loaded once at startup and treated as immutable for the
//! process lifetime.  All connection details (collector URL, device id) and
//! all tunables (filter coefficient, calibration offset, noise limit) live
//! here; nothing is hardcoded in the pipeline.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, AudioConfig, DisplayConfig, TelemetryConfig};
