//! Microphone capture via `cpal`.
//!
//! [`CpalSource`] wraps the cpal host/device/stream lifecycle.  The cpal
//! callback runs on a dedicated audio thread: it downmixes to mono, converts
//! the samples to raw i16 counts and forwards fixed-size [`AudioBlock`]s over
//! an mpsc channel.  [`BlockSource::next_block`] is the blocking receive on
//! that channel — the acquisition pacing comes entirely from the hardware.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc;
use thiserror::Error;

// ---------------------------------------------------------------------------
// AudioBlock
// ---------------------------------------------------------------------------

/// A single fixed-size block of raw microphone samples.
///
/// Samples are mono, ADC-style signed counts in `[-32768, 32767]`.  Blocks
/// are transient: the pipeline conditions and measures each one, then drops
/// it — nothing is persisted across blocks except filter state.
#[derive(Debug, Clone)]
pub struct AudioBlock {
    /// Mono samples as raw signed counts.
    pub samples: Vec<i16>,
    /// Sample rate of this block in Hz (e.g. 44100, 48000).
    pub sample_rate: u32,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running the audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    /// A transient driver fault reported by the running stream.  The caller
    /// skips the current cycle and retries on the next iteration.
    #[error("audio driver fault: {0}")]
    Driver(String),

    /// The stream is gone (handle dropped, device removed).  The sampling
    /// loop exits on this variant — it is the shutdown path, not a retry.
    #[error("audio stream disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// BlockSource
// ---------------------------------------------------------------------------

/// Blocking source of raw audio blocks.
///
/// Implementors block until the hardware delivers the next block.  The trait
/// exists so the sampling loop can be driven by a fake source in tests.
pub trait BlockSource: Send {
    fn next_block(&mut self) -> Result<AudioBlock, CaptureError>;
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// RAII guard that keeps the cpal stream alive.
///
/// `cpal::Stream` is not `Send` on all platforms, so the handle stays on the
/// thread that opened the device (normally the main thread) while the
/// [`CpalSource`] half moves to the sampling thread.  Dropping the handle
/// stops the hardware stream; the paired source then yields
/// [`CaptureError::Disconnected`].
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CpalSource
// ---------------------------------------------------------------------------

/// Microphone block source built on top of `cpal`.
///
/// The hardware delivers interleaved `f32` buffers at its native rate; the
/// callback downmixes to mono, rescales to i16 counts and regroups them into
/// blocks of exactly `block_samples` samples.  Stream faults reported by the
/// driver surface as [`CaptureError::Driver`] from [`next_block`].
///
/// [`next_block`]: BlockSource::next_block
pub struct CpalSource {
    rx: mpsc::Receiver<Result<AudioBlock, CaptureError>>,
    sample_rate: u32,
}

impl CpalSource {
    /// Open the system default input device and start streaming blocks of
    /// `block_samples` mono samples.
    ///
    /// Returns the stream guard together with the source: the guard must be
    /// kept alive on the opening thread, while the source (which is `Send`)
    /// moves to the sampling thread.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::NoDevice`] when no input device is available,
    /// or the corresponding variant when the platform rejects the default
    /// stream configuration.
    pub fn open(block_samples: usize) -> Result<(StreamHandle, Self), CaptureError> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let channels = supported.channels() as usize;
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        let (tx, rx) = mpsc::channel::<Result<AudioBlock, CaptureError>>();
        let err_tx = tx.clone();

        let mut pending: Vec<i16> = Vec::with_capacity(block_samples);

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Downmix each interleaved frame to mono and rescale to raw
                // signed counts, regrouping into fixed-size blocks.
                for frame in data.chunks(channels.max(1)) {
                    let mono = frame.iter().sum::<f32>() / frame.len() as f32;
                    let count = (mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    pending.push(count);

                    if pending.len() == block_samples {
                        let block = AudioBlock {
                            samples: std::mem::replace(
                                &mut pending,
                                Vec::with_capacity(block_samples),
                            ),
                            sample_rate,
                        };
                        // Ignore send errors; the receiver may have been dropped.
                        let _ = tx.send(Ok(block));
                    }
                }
            },
            move |err: cpal::StreamError| {
                log::error!("cpal stream error: {err}");
                let _ = err_tx.send(Err(CaptureError::Driver(err.to_string())));
            },
            None, // no timeout
        )?;

        stream.play()?;

        Ok((
            StreamHandle { _stream: stream },
            Self { rx, sample_rate },
        ))
    }

    /// Native sample rate of the capture stream in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl BlockSource for CpalSource {
    /// Block until the hardware delivers the next [`AudioBlock`].
    fn next_block(&mut self) -> Result<AudioBlock, CaptureError> {
        match self.rx.recv() {
            Ok(result) => result,
            Err(_) => Err(CaptureError::Disconnected),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// `AudioBlock` must be `Send` so it can cross thread boundaries.
    #[test]
    fn audio_block_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioBlock>();
    }

    #[test]
    fn audio_block_fields() {
        let block = AudioBlock {
            samples: vec![0_i16; 1024],
            sample_rate: 48_000,
        };
        assert_eq!(block.samples.len(), 1024);
        assert_eq!(block.sample_rate, 48_000);
    }

    /// A source whose channel sender was dropped must report `Disconnected`.
    #[test]
    fn closed_channel_is_disconnected() {
        struct ChannelSource(mpsc::Receiver<Result<AudioBlock, CaptureError>>);

        impl BlockSource for ChannelSource {
            fn next_block(&mut self) -> Result<AudioBlock, CaptureError> {
                match self.0.recv() {
                    Ok(result) => result,
                    Err(_) => Err(CaptureError::Disconnected),
                }
            }
        }

        let (tx, rx) = mpsc::channel();
        let mut source = ChannelSource(rx);

        tx.send(Ok(AudioBlock {
            samples: vec![1, 2, 3],
            sample_rate: 16_000,
        }))
        .unwrap();
        tx.send(Err(CaptureError::Driver("overrun".into()))).unwrap();
        drop(tx);

        assert!(source.next_block().is_ok());
        assert!(matches!(
            source.next_block(),
            Err(CaptureError::Driver(_))
        ));
        assert!(matches!(
            source.next_block(),
            Err(CaptureError::Disconnected)
        ));
    }
}
