//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Settings for audio acquisition and level estimation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Number of raw samples per acquired block.
    pub block_samples: usize,
    /// Full-scale divisor used to normalize raw ADC-style counts to `±1.0`.
    pub full_scale: f32,
    /// One-pole high-pass coefficient `a` in
    /// `y[n] = a * (y[n-1] + x[n] - x[n-1])`.  Close to 1; lower values cut
    /// deeper into the low end.
    pub highpass_coeff: f32,
    /// Calibration offset in dB added to `20·log10(rms)`.
    ///
    /// Chosen so a known reference level on this microphone reads correctly;
    /// this is a per-device constant, never adjusted at runtime.
    pub calibration_offset_db: f64,
    /// Integration window for telemetry readings, in milliseconds.
    pub window_millis: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            block_samples: 1024,
            full_scale: 32_768.0,
            highpass_coeff: 0.995,
            calibration_offset_db: 96.0,
            window_millis: 1_000,
        }
    }
}

// ---------------------------------------------------------------------------
// TelemetryConfig
// ---------------------------------------------------------------------------

/// Settings for the HTTP telemetry publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Collector endpoint that accepts the `{dba_instant, device_id}` POST.
    pub collector_url: String,
    /// Identifier sent with every reading so the collector can attribute it.
    pub device_id: String,
    /// Maximum seconds to wait for a POST before classifying it as failed.
    pub timeout_secs: u64,
    /// Capacity of the pending-readings queue.  Small by design: when the
    /// network stalls, only the most recent readings are worth keeping.
    pub queue_capacity: usize,
    /// Initial retry delay in seconds after a failed delivery.
    pub backoff_base_secs: u64,
    /// Upper bound on the retry delay in seconds.
    pub backoff_max_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            collector_url: "http://localhost:8080/readings".into(),
            device_id: "noise-watch-dev".into(),
            timeout_secs: 5,
            queue_capacity: 5,
            backoff_base_secs: 1,
            backoff_max_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

/// Settings for the local level widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Widget refresh cadence in milliseconds (also the graph push cadence).
    pub refresh_millis: u64,
    /// Fixed noise limit in dB used for the classification badge and the
    /// dashed reference line.  Not day/night aware.
    pub limit_db: f64,
    /// Bottom of the graph's dB range.
    pub graph_min_db: f64,
    /// Top of the graph's dB range.
    pub graph_max_db: f64,
    /// Number of history points kept for the scrolling graph (one per
    /// refresh tick, sized to the graph's pixel width).
    pub history_len: usize,
    /// Last saved widget position `(x, y)` in screen pixels.  `None` means
    /// let the OS / window manager pick a position on first launch.
    pub window_position: Option<(f32, f32)>,
    /// Keep the widget floating above all other windows.
    pub always_on_top: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_millis: 120,
            limit_db: 65.0,
            graph_min_db: 30.0,
            graph_max_db: 90.0,
            history_len: 160,
            window_position: None,
            always_on_top: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use noise_watch::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Audio acquisition and level-estimation settings.
    pub audio: AudioConfig,
    /// Telemetry publisher settings.
    pub telemetry: TelemetryConfig,
    /// Local widget settings.
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
