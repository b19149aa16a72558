//! Display path — dB history ring, classification badge, graph scaling.
//!
//! Everything here is plain data and math; the egui front-end in
//! [`crate::app`] consumes it.  The display path never touches the network —
//! it reads only the shared level snapshot at its own fixed cadence.

pub mod presenter;
pub mod ring;

pub use presenter::{classify, Badge, GraphScale};
pub use ring::HistoryRing;
