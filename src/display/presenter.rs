//! Classification badge and dB→pixel graph scaling.
//!
//! The badge uses a **fixed** limit from [`DisplayConfig::limit_db`]
//! (firmware-local threshold; deliberately not day/night aware):
//!
//! | Condition             | Badge     |
//! |-----------------------|-----------|
//! | `value ≤ limit − 5`   | `Ok`      |
//! | `value ≤ limit + 5`   | `Caution` |
//! | otherwise             | `High`    |
//!
//! [`DisplayConfig::limit_db`]: crate::config::DisplayConfig::limit_db

// ---------------------------------------------------------------------------
// Badge
// ---------------------------------------------------------------------------

/// Noise-level classification shown next to the numeric readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    /// Comfortably under the limit.
    Ok,
    /// Within ±5 dB of the limit.
    Caution,
    /// More than 5 dB over the limit.
    High,
}

impl Badge {
    /// Short label rendered in the widget.
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Ok => "OK",
            Badge::Caution => "CAUTION",
            Badge::High => "HIGH",
        }
    }
}

/// Classify a dB value against the fixed limit.
pub fn classify(value_db: f64, limit_db: f64) -> Badge {
    if value_db <= limit_db - 5.0 {
        Badge::Ok
    } else if value_db <= limit_db + 5.0 {
        Badge::Caution
    } else {
        Badge::High
    }
}

// ---------------------------------------------------------------------------
// GraphScale
// ---------------------------------------------------------------------------

/// Maps a fixed dB range onto pixel rows for the scrolling line graph.
///
/// Louder values map to smaller `y` (toward the top of the graph rect);
/// values outside the range are clamped to the graph edges.
#[derive(Debug, Clone, Copy)]
pub struct GraphScale {
    pub min_db: f64,
    pub max_db: f64,
}

impl GraphScale {
    pub fn new(min_db: f64, max_db: f64) -> Self {
        debug_assert!(max_db > min_db);
        Self { min_db, max_db }
    }

    /// Normalize a dB value into `[0.0, 1.0]` across the graph range.
    pub fn normalize(&self, db: f64) -> f32 {
        let t = (db - self.min_db) / (self.max_db - self.min_db);
        t.clamp(0.0, 1.0) as f32
    }

    /// Pixel-row `y` coordinate for a dB value inside a graph rect of the
    /// given `top` edge and `height`.
    pub fn y_for(&self, db: f64, top: f32, height: f32) -> f32 {
        top + (1.0 - self.normalize(db)) * height
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: f64 = 65.0;

    // ---- classify ----------------------------------------------------------

    #[test]
    fn well_under_limit_is_ok() {
        assert_eq!(classify(45.0, LIMIT), Badge::Ok);
    }

    /// The OK band is inclusive at `limit − 5`.
    #[test]
    fn limit_minus_five_is_ok() {
        assert_eq!(classify(60.0, LIMIT), Badge::Ok);
    }

    #[test]
    fn just_over_ok_band_is_caution() {
        assert_eq!(classify(60.1, LIMIT), Badge::Caution);
        assert_eq!(classify(65.0, LIMIT), Badge::Caution);
    }

    /// The CAUTION band is inclusive at `limit + 5`.
    #[test]
    fn limit_plus_five_is_caution() {
        assert_eq!(classify(70.0, LIMIT), Badge::Caution);
    }

    #[test]
    fn over_caution_band_is_high() {
        assert_eq!(classify(70.1, LIMIT), Badge::High);
        assert_eq!(classify(95.0, LIMIT), Badge::High);
    }

    #[test]
    fn badge_labels() {
        assert_eq!(Badge::Ok.label(), "OK");
        assert_eq!(Badge::Caution.label(), "CAUTION");
        assert_eq!(Badge::High.label(), "HIGH");
    }

    // ---- GraphScale --------------------------------------------------------

    #[test]
    fn normalize_spans_unit_range() {
        let scale = GraphScale::new(30.0, 90.0);
        assert_eq!(scale.normalize(30.0), 0.0);
        assert_eq!(scale.normalize(90.0), 1.0);
        assert!((scale.normalize(60.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_values_clamp_to_edges() {
        let scale = GraphScale::new(30.0, 90.0);
        assert_eq!(scale.normalize(10.0), 0.0);
        assert_eq!(scale.normalize(120.0), 1.0);
    }

    /// Louder values sit higher on screen (smaller y).
    #[test]
    fn louder_maps_to_smaller_y() {
        let scale = GraphScale::new(30.0, 90.0);
        let quiet = scale.y_for(40.0, 0.0, 100.0);
        let loud = scale.y_for(80.0, 0.0, 100.0);

        assert!(loud < quiet);
        assert_eq!(scale.y_for(90.0, 0.0, 100.0), 0.0);
        assert_eq!(scale.y_for(30.0, 0.0, 100.0), 100.0);
    }

    #[test]
    fn y_respects_rect_top() {
        let scale = GraphScale::new(30.0, 90.0);
        assert_eq!(scale.y_for(90.0, 50.0, 100.0), 50.0);
        assert_eq!(scale.y_for(30.0, 50.0, 100.0), 150.0);
    }
}
