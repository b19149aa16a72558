//! Signal conditioning — DC removal and one-pole high-pass filtering.
//!
//! Raw microphone counts carry a DC bias (electret bias voltage, ADC offset)
//! plus slow low-frequency drift, both of which would dominate an RMS level
//! measurement.  [`SignalConditioner`] removes the per-block mean, normalizes
//! to full scale, and runs every sample through a stateful one-pole high-pass
//! filter:
//!
//! ```text
//! y[n] = a * (y[n-1] + x[n] - x[n-1])
//! ```
//!
//! Filter state persists across blocks.  Resetting it per block would
//! reintroduce low-frequency bias at every block boundary.

// ---------------------------------------------------------------------------
// SignalConditioner
// ---------------------------------------------------------------------------

/// Stateful conditioner turning raw i16 blocks into normalized `f32` samples.
///
/// One instance per pipeline; `prev_input` / `prev_output` carry the filter
/// recurrence across block boundaries for the lifetime of the pipeline.
pub struct SignalConditioner {
    /// Full-scale divisor mapping raw counts to `±1.0`.
    full_scale: f32,
    /// High-pass coefficient `a`, close to 1.
    coeff: f32,
    /// `x[n-1]` — previous normalized, mean-removed input sample.
    prev_input: f32,
    /// `y[n-1]` — previous filtered output sample.
    prev_output: f32,
}

impl SignalConditioner {
    /// Create a conditioner with the given full-scale divisor and high-pass
    /// coefficient (e.g. `32768.0` and `0.995`).
    pub fn new(full_scale: f32, coeff: f32) -> Self {
        Self {
            full_scale,
            coeff,
            prev_input: 0.0,
            prev_output: 0.0,
        }
    }

    /// Condition one raw block.
    ///
    /// Subtracts the block's arithmetic mean (DC removal), normalizes by the
    /// full-scale divisor, and applies the high-pass recurrence.  Returns a
    /// conditioned sample stream of the same length as the input.
    pub fn process(&mut self, block: &[i16]) -> Vec<f32> {
        if block.is_empty() {
            return Vec::new();
        }

        let mean =
            block.iter().map(|&s| s as f32).sum::<f32>() / block.len() as f32;

        let mut out = Vec::with_capacity(block.len());
        for &raw in block {
            let x = (raw as f32 - mean) / self.full_scale;
            let y = self.coeff * (self.prev_output + x - self.prev_input);
            self.prev_input = x;
            self.prev_output = y;
            out.push(y);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
