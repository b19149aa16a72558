//! Sampling pipeline — acquisition → conditioning → estimation, looped on a
//! dedicated thread.
//!
//! The sampling loop is the primary execution context: it blocks only on the
//! microphone (paced by hardware) and is otherwise computation-bound.  It
//! publishes per-block levels into [`SharedLevel`] for the UI and pushes one
//! reading per elapsed window into the telemetry queue.  Nothing on this
//! thread ever waits for the network.

pub mod runner;
pub mod state;

pub use runner::{run_sampling, PipelineContext};
pub use state::{new_shared_level, LevelSnapshot, SharedLevel};
