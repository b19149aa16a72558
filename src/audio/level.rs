//! Level estimation — RMS-to-dB conversion at two cadences.
//!
//! Both cadences share one conversion formula:
//!
//! ```text
//! dB = 20 · log10(max(rms, ε)) + calibration_offset
//! ```
//!
//! * **Per-block instantaneous dB** — RMS of one conditioned block, used only
//!   for the local display.
//! * **1-second integrated dB** — sum-of-squares and sample count pooled
//!   across all blocks since the window opened, closed on elapsed monotonic
//!   time (not sample count, so it tolerates variable block latency).

use std::time::{Duration, Instant};

/// Tiny positive RMS floor that keeps `log10` defined for silent input.
pub const RMS_EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// RMS of a conditioned sample slice; `0.0` for an empty slice.
pub fn block_rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt()
}

/// Convert an RMS amplitude to a calibrated dB figure.
pub fn rms_to_db(rms: f64, calibration_offset: f64) -> f64 {
    20.0 * rms.max(RMS_EPSILON).log10() + calibration_offset
}

// ---------------------------------------------------------------------------
// WindowAccumulator
// ---------------------------------------------------------------------------

/// Running sum-of-squares over the current integration window.
struct WindowAccumulator {
    sum_squares: f64,
    sample_count: u64,
    window_start: Instant,
}

impl WindowAccumulator {
    fn new(now: Instant) -> Self {
        Self {
            sum_squares: 0.0,
            sample_count: 0,
            window_start: now,
        }
    }

    fn add(&mut self, samples: &[f32]) {
        self.sum_squares += samples
            .iter()
            .map(|&s| (s as f64) * (s as f64))
            .sum::<f64>();
        self.sample_count += samples.len() as u64;
    }

    fn reset(&mut self, now: Instant) {
        self.sum_squares = 0.0;
        self.sample_count = 0;
        self.window_start = now;
    }
}

// ---------------------------------------------------------------------------
// LevelEstimator
// ---------------------------------------------------------------------------

/// Converts conditioned samples into instantaneous and window-integrated dB.
///
/// One instance per pipeline, owned by the sampling loop.  The accumulator is
/// read and reset exactly once per elapsed window.
pub struct LevelEstimator {
    calibration_offset: f64,
    window: Duration,
    acc: WindowAccumulator,
}

impl LevelEstimator {
    /// Create an estimator with the given calibration offset (dB) and
    /// integration window (normally 1 second).
    pub fn new(calibration_offset: f64, window: Duration) -> Self {
        Self {
            calibration_offset,
            window,
            acc: WindowAccumulator::new(Instant::now()),
        }
    }

    /// Per-block instantaneous dB of one conditioned block.
    pub fn instant_db(&self, samples: &[f32]) -> f64 {
        rms_to_db(block_rms(samples), self.calibration_offset)
    }

    /// Fold one conditioned block into the current integration window.
    pub fn accumulate(&mut self, samples: &[f32]) {
        self.acc.add(samples);
    }

    /// Close the window if it has elapsed at `now`.
    ///
    /// Returns the integrated dB reading and restarts the window.  If the
    /// window elapses with zero accumulated samples (should not normally
    /// happen), it restarts without emitting.
    pub fn try_close_window(&mut self, now: Instant) -> Option<f64> {
        if now.duration_since(self.acc.window_start) < self.window {
            return None;
        }

        if self.acc.sample_count == 0 {
            self.acc.reset(now);
            return None;
        }

        let rms = (self.acc.sum_squares / self.acc.sample_count as f64).sqrt();
        let db = rms_to_db(rms, self.calibration_offset);
        self.acc.reset(now);
        Some(db)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const OFFSET: f64 = 96.0;

    fn sine(amplitude: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (i as f32 * std::f32::consts::TAU / 64.0).sin() * amplitude)
            .collect()
    }

    // ---- rms_to_db ---------------------------------------------------------

    /// A full-scale sinusoid (amplitude 1.0) has RMS 1/√2 → −3.01 dB + offset.
    #[test]
    fn full_scale_sine_db() {
        let samples = sine(1.0, 4_096);
        let db = rms_to_db(block_rms(&samples), OFFSET);

        let expected = 20.0 * (1.0_f64 / 2.0_f64.sqrt()).log10() + OFFSET;
        assert!((db - expected).abs() < 0.1, "db = {db}, expected {expected}");
    }

    /// Silence must hit the epsilon floor instead of producing −∞.
    #[test]
    fn silence_is_floored() {
        let db = rms_to_db(block_rms(&[0.0; 1_024]), OFFSET);
        assert!(db.is_finite());
        assert_eq!(db, 20.0 * RMS_EPSILON.log10() + OFFSET);
    }

    /// Constant amplitude 0.01 → RMS 0.01 → 20·log10(0.01) + 96 = 56.0 dB.
    #[test]
    fn reference_level_scenario() {
        let samples = vec![0.01_f32; 1_024];
        let db = rms_to_db(block_rms(&samples), OFFSET);
        assert!((db - 56.0).abs() < 0.01, "db = {db}");
    }

    #[test]
    fn empty_slice_rms_is_zero() {
        assert_eq!(block_rms(&[]), 0.0);
    }

    // ---- window accumulation ----------------------------------------------

    /// Pooled accumulation: RMS = sqrt((s1+s2+s3)/(n1+n2+n3)), not an average
    /// of per-block RMS values.
    #[test]
    fn window_pools_sum_of_squares() {
        let window = Duration::from_secs(1);
        let mut est = LevelEstimator::new(OFFSET, window);
        let start = Instant::now();

        let blocks = [
            vec![0.1_f32; 100],
            vec![0.3_f32; 200],
            vec![0.02_f32; 50],
        ];
        for b in &blocks {
            est.accumulate(b);
        }

        let sum_squares: f64 = blocks
            .iter()
            .flatten()
            .map(|&s| (s as f64) * (s as f64))
            .sum();
        let expected = rms_to_db((sum_squares / 350.0).sqrt(), OFFSET);

        let db = est
            .try_close_window(start + window)
            .expect("window should close");
        assert!((db - expected).abs() < 1e-9, "db = {db}, expected {expected}");
    }

    /// The window must not close before the configured duration elapses.
    #[test]
    fn window_does_not_close_early() {
        let mut est = LevelEstimator::new(OFFSET, Duration::from_secs(1));
        est.accumulate(&[0.5; 64]);
        assert!(est.try_close_window(Instant::now()).is_none());
    }

    /// An elapsed window with zero samples restarts without emitting.
    #[test]
    fn empty_window_restarts_without_emitting() {
        let window = Duration::from_secs(1);
        let mut est = LevelEstimator::new(OFFSET, window);
        let start = Instant::now();

        assert!(est.try_close_window(start + window).is_none());

        // The restart must not leave a stale start time behind: samples added
        // now belong to a new window that closes one full duration later.
        est.accumulate(&[0.1; 64]);
        assert!(est.try_close_window(start + window).is_none());
        assert!(est.try_close_window(start + window + window).is_some());
    }

    /// Closing the window resets the accumulator for the next one.
    #[test]
    fn close_resets_accumulator() {
        let window = Duration::from_secs(1);
        let mut est = LevelEstimator::new(OFFSET, window);
        let start = Instant::now();

        est.accumulate(&[0.5; 128]);
        let first = est.try_close_window(start + window).unwrap();

        est.accumulate(&[0.01; 128]);
        let second = est.try_close_window(start + window + window).unwrap();

        // The second reading must reflect only the quiet block.
        assert!(second < first);
        assert!((second - rms_to_db(0.01, OFFSET)).abs() < 1e-6);
    }

    // ---- instant_db --------------------------------------------------------

    #[test]
    fn instant_db_matches_formula() {
        let est = LevelEstimator::new(OFFSET, Duration::from_secs(1));
        let samples = vec![0.01_f32; 256];
        assert!((est.instant_db(&samples) - 56.0).abs() < 0.01);
    }
}
