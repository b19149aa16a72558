//! Shared level snapshot between the sampling thread and the UI.
//!
//! [`SharedLevel`] is a type alias for `Arc<Mutex<LevelSnapshot>>` — cheap to
//! clone and safe to share across threads.  The sampling loop overwrites it
//! once per block; the egui update loop reads it at its own cadence.

use std::sync::{Arc, Mutex};

use crate::audio::level::RMS_EPSILON;

// ---------------------------------------------------------------------------
// LevelSnapshot
// ---------------------------------------------------------------------------

/// Most recent per-block instantaneous level.
#[derive(Debug, Clone, Copy)]
pub struct LevelSnapshot {
    /// Instantaneous dB of the last conditioned block.
    pub dba_instant: f64,
    /// Whether at least one block has been measured since startup.
    pub valid: bool,
}

impl LevelSnapshot {
    /// Snapshot representing "no audio measured yet": the silence floor for
    /// the given calibration offset.
    pub fn silence(calibration_offset: f64) -> Self {
        Self {
            dba_instant: 20.0 * RMS_EPSILON.log10() + calibration_offset,
            valid: false,
        }
    }
}

// ---------------------------------------------------------------------------
// SharedLevel
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`LevelSnapshot`].
///
/// Lock with `.lock().unwrap()` for a short critical section; the write side
/// holds it for a single struct assignment.
pub type SharedLevel = Arc<Mutex<LevelSnapshot>>;

/// Construct a new [`SharedLevel`] at the silence floor.
pub fn new_shared_level(calibration_offset: f64) -> SharedLevel {
    Arc::new(Mutex::new(LevelSnapshot::silence(calibration_offset)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_snapshot_is_finite_and_invalid() {
        let snap = LevelSnapshot::silence(96.0);
        assert!(snap.dba_instant.is_finite());
        assert!(!snap.valid);
        // ε = 1e-9 → 20·(−9) + 96 = −84 dB.
        assert!((snap.dba_instant - (-84.0)).abs() < 1e-6);
    }

    #[test]
    fn shared_level_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedLevel>();
    }

    #[test]
    fn shared_level_can_be_cloned_and_mutated() {
        let level = new_shared_level(96.0);
        let level2 = Arc::clone(&level);

        {
            let mut snap = level.lock().unwrap();
            snap.dba_instant = 55.0;
            snap.valid = true;
        }
        let read = *level2.lock().unwrap();
        assert_eq!(read.dba_instant, 55.0);
        assert!(read.valid);
    }
}
