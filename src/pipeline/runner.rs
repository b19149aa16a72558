//! The sampling loop — drives acquisition → conditioning → estimation.
//!
//! # Loop per block
//!
//! ```text
//! BlockSource::next_block()              (blocking, hardware-paced)
//!   └─▶ SignalConditioner::process       (DC removal + high-pass)
//!         ├─▶ LevelEstimator::instant_db → SharedLevel   (display)
//!         └─▶ LevelEstimator::accumulate
//!               └─▶ try_close_window     → ReadingQueue  (telemetry)
//! ```
//!
//! Driver faults skip the cycle and retry on the next iteration; only a
//! disconnected stream ends the loop (process shutdown).  The queue push is
//! non-blocking, so a stalled network can never back up into this thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::audio::{BlockSource, CaptureError, LevelEstimator, SignalConditioner};
use crate::config::AppConfig;
use crate::telemetry::{Reading, ReadingQueue};

use super::SharedLevel;

// ---------------------------------------------------------------------------
// PipelineContext
// ---------------------------------------------------------------------------

/// Per-pipeline mutable state: filter memory and window accumulator.
///
/// One instance per pipeline, owned by the sampling thread.  Keeping the
/// state here (instead of globals) allows multiple independent pipelines and
/// unit-level construction in tests.
pub struct PipelineContext {
    conditioner: SignalConditioner,
    estimator: LevelEstimator,
}

impl PipelineContext {
    pub fn new(conditioner: SignalConditioner, estimator: LevelEstimator) -> Self {
        Self {
            conditioner,
            estimator,
        }
    }

    /// Build the context from application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            SignalConditioner::new(config.audio.full_scale, config.audio.highpass_coeff),
            LevelEstimator::new(
                config.audio.calibration_offset_db,
                Duration::from_millis(config.audio.window_millis),
            ),
        )
    }
}

// ---------------------------------------------------------------------------
// run_sampling
// ---------------------------------------------------------------------------

/// Run the sampling loop until the source disconnects.
///
/// Intended to be spawned on a dedicated thread from `main()`:
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use noise_watch::audio::CpalSource;
/// use noise_watch::config::AppConfig;
/// use noise_watch::pipeline::{new_shared_level, run_sampling, PipelineContext};
/// use noise_watch::telemetry::ReadingQueue;
///
/// let config = AppConfig::default();
/// let level = new_shared_level(config.audio.calibration_offset_db);
/// let queue = Arc::new(ReadingQueue::new(config.telemetry.queue_capacity));
/// let (_stream, source) = CpalSource::open(config.audio.block_samples).unwrap();
/// let ctx = PipelineContext::from_config(&config);
///
/// std::thread::spawn(move || run_sampling(ctx, source, level, queue));
/// // `_stream` keeps the capture alive; dropping it ends the loop.
/// ```
pub fn run_sampling(
    mut ctx: PipelineContext,
    mut source: impl BlockSource,
    level: SharedLevel,
    queue: Arc<ReadingQueue>,
) {
    loop {
        let block = match source.next_block() {
            Ok(block) => block,
            Err(CaptureError::Disconnected) => {
                log::info!("audio stream disconnected; sampling loop exiting");
                break;
            }
            Err(e) => {
                // Transient driver fault: skip this cycle, retry on the next.
                log::warn!("microphone read failed ({e}); skipping cycle");
                continue;
            }
        };

        if block.samples.is_empty() {
            continue;
        }

        let conditioned = ctx.conditioner.process(&block.samples);
        let instant = ctx.estimator.instant_db(&conditioned);
        ctx.estimator.accumulate(&conditioned);

        {
            let mut snap = level.lock().unwrap();
            snap.dba_instant = instant;
            snap.valid = true;
        }

        if let Some(dba_instant) = ctx.estimator.try_close_window(Instant::now()) {
            queue.push(Reading { dba_instant });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioBlock;
    use crate::pipeline::new_shared_level;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Fake microphone yielding a scripted sequence, then disconnecting.
    struct ScriptedSource {
        script: std::vec::IntoIter<Result<AudioBlock, CaptureError>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<AudioBlock, CaptureError>>) -> Self {
            Self {
                script: script.into_iter(),
            }
        }
    }

    impl BlockSource for ScriptedSource {
        fn next_block(&mut self) -> Result<AudioBlock, CaptureError> {
            self.script.next().unwrap_or(Err(CaptureError::Disconnected))
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn block(samples: Vec<i16>) -> Result<AudioBlock, CaptureError> {
        Ok(AudioBlock {
            samples,
            sample_rate: 16_000,
        })
    }

    fn sine_block(amplitude: f32, len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| ((i as f32 * std::f32::consts::TAU / 64.0).sin() * amplitude) as i16)
            .collect()
    }

    fn make_context(window_millis: u64) -> PipelineContext {
        let mut config = AppConfig::default();
        config.audio.window_millis = window_millis;
        PipelineContext::from_config(&config)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    /// The loop must update the shared level for every processed block and
    /// exit cleanly when the source disconnects.
    #[test]
    fn updates_level_and_exits_on_disconnect() {
        let level = new_shared_level(96.0);
        let queue = Arc::new(ReadingQueue::new(5));

        let source = ScriptedSource::new(vec![
            block(sine_block(8_000.0, 1024)),
            Err(CaptureError::Disconnected),
        ]);

        run_sampling(
            make_context(1_000),
            source,
            Arc::clone(&level),
            Arc::clone(&queue),
        );

        let snap = *level.lock().unwrap();
        assert!(snap.valid);
        assert!(snap.dba_instant > 0.0, "level = {}", snap.dba_instant);
    }

    /// Driver faults are skipped, not fatal: blocks after the fault are
    /// still processed.
    #[test]
    fn driver_fault_skips_cycle() {
        let level = new_shared_level(96.0);
        let queue = Arc::new(ReadingQueue::new(5));

        let source = ScriptedSource::new(vec![
            Err(CaptureError::Driver("overrun".into())),
            block(sine_block(8_000.0, 1024)),
        ]);

        run_sampling(
            make_context(1_000),
            source,
            Arc::clone(&level),
            Arc::clone(&queue),
        );

        assert!(level.lock().unwrap().valid);
    }

    /// With a zero-length window every block closes a window, so each block
    /// produces exactly one queued reading.
    #[test]
    fn elapsed_windows_feed_the_queue() {
        let level = new_shared_level(96.0);
        let queue = Arc::new(ReadingQueue::new(5));

        let source = ScriptedSource::new(vec![
            block(sine_block(8_000.0, 1024)),
            block(sine_block(8_000.0, 1024)),
            block(sine_block(8_000.0, 1024)),
        ]);

        run_sampling(
            make_context(0),
            source,
            Arc::clone(&level),
            Arc::clone(&queue),
        );

        assert_eq!(queue.len(), 3);
    }

    /// Empty blocks are ignored entirely — no level update, no accumulation.
    #[test]
    fn empty_blocks_are_ignored() {
        let level = new_shared_level(96.0);
        let queue = Arc::new(ReadingQueue::new(5));

        let source = ScriptedSource::new(vec![block(Vec::new()), block(Vec::new())]);

        run_sampling(
            make_context(0),
            source,
            Arc::clone(&level),
            Arc::clone(&queue),
        );

        assert!(!level.lock().unwrap().valid);
        assert!(queue.is_empty());
    }

    /// A silent stream must still produce readings near the silence floor —
    /// the pipeline reports quiet, it does not go mute.
    #[test]
    fn silent_blocks_produce_floor_readings() {
        let level = new_shared_level(96.0);
        let queue = Arc::new(ReadingQueue::new(5));

        let source = ScriptedSource::new(vec![block(vec![0_i16; 1024])]);

        run_sampling(
            make_context(0),
            source,
            Arc::clone(&level),
            Arc::clone(&queue),
        );

        let snap = *level.lock().unwrap();
        assert!(snap.valid);
        assert!(snap.dba_instant < 0.0, "silence should be far below 0 dB");
        assert_eq!(queue.len(), 1);
    }
}
