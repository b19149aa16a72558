//! Fixed-capacity circular history of dB values for the scrolling graph.
//!
//! When the ring is full, each new value **overwrites** the oldest one, so
//! the most recent `capacity` readings are always available.  Capacity is
//! sized to the graph's pixel width: one value per graph column.
//!
//! Unlike a drain-style buffer, [`HistoryRing::snapshot`] does not consume
//! the contents — the graph re-reads the full history every frame.

// ---------------------------------------------------------------------------
// HistoryRing
// ---------------------------------------------------------------------------

/// A fixed-capacity circular buffer of dB values.
///
/// A single monotonic write cursor determines the next slot; `len` saturates
/// at `capacity` once the ring has wrapped.
pub struct HistoryRing {
    buf: Vec<f32>,
    capacity: usize,
    /// Index of the *next* write position (wraps around `capacity`).
    write_pos: usize,
    /// Number of valid values currently stored (≤ `capacity`).
    len: usize,
}

impl HistoryRing {
    /// Create a new ring with the given `capacity`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "HistoryRing capacity must be > 0");
        Self {
            buf: vec![0.0; capacity],
            capacity,
            write_pos: 0,
            len: 0,
        }
    }

    /// Append one value, overwriting the oldest when the ring is full.
    pub fn push(&mut self, value: f32) {
        self.buf[self.write_pos] = value;
        self.write_pos = (self.write_pos + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    /// All stored values in chronological order (oldest first).
    ///
    /// Does not modify the ring.
    pub fn snapshot(&self) -> Vec<f32> {
        // Before the first wrap the valid data starts at index 0; afterwards
        // the oldest value sits at `write_pos`.
        let read_pos = if self.len < self.capacity {
            0
        } else {
            self.write_pos
        };

        (0..self.len)
            .map(|i| self.buf[(read_pos + i) % self.capacity])
            .collect()
    }

    /// Most recently pushed value, if any.
    pub fn latest(&self) -> Option<f32> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.write_pos + self.capacity - 1) % self.capacity;
        Some(self.buf[idx])
    }

    /// Number of valid values currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the ring contains no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of values the ring can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
