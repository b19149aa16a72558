//! Application entry point — noise-watch.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Create the shared level snapshot and the telemetry queue.
//! 5. Spawn the telemetry publisher on the tokio runtime.
//! 6. Open the microphone and spawn the sampling thread.  If the microphone
//!    is unavailable the widget still runs (showing "waiting for audio");
//!    audio errors are never fatal.
//! 7. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.  Display initialisation failure is the only fatal error.

use std::sync::Arc;

use noise_watch::{
    app::NoiseWatchApp,
    audio::CpalSource,
    config::AppConfig,
    pipeline::{new_shared_level, run_sampling, PipelineContext},
    telemetry::{Publisher, ReadingQueue},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_decorations(false)
        .with_inner_size([340.0, 150.0])
        .with_min_inner_size([280.0, 120.0])
        .with_resizable(false);

    if config.display.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.display.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("noise-watch starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (publisher task + HTTP I/O)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Shared state
    let level = new_shared_level(config.audio.calibration_offset_db);
    let queue = Arc::new(ReadingQueue::new(config.telemetry.queue_capacity));

    // 5. Telemetry publisher task
    let publisher = Publisher::from_config(Arc::clone(&queue), &config.telemetry);
    rt.spawn(publisher.run());
    log::info!(
        "publishing readings to {} as {}",
        config.telemetry.collector_url,
        config.telemetry.device_id
    );

    // 6. Microphone + sampling thread.  Degrade gracefully when no input
    //    device is available — the widget still opens.  The stream handle
    //    must stay on this thread (cpal streams are not Send); dropping it
    //    would disconnect the sampling loop.
    let _stream_handle = match CpalSource::open(config.audio.block_samples) {
        Ok((handle, source)) => {
            log::info!(
                "audio capture started ({} Hz, {}-sample blocks)",
                source.sample_rate(),
                config.audio.block_samples
            );

            let ctx = PipelineContext::from_config(&config);
            let level_sampling = Arc::clone(&level);
            let queue_sampling = Arc::clone(&queue);

            std::thread::Builder::new()
                .name("sampling".into())
                .spawn(move || run_sampling(ctx, source, level_sampling, queue_sampling))
                .expect("failed to spawn sampling thread");

            Some(handle)
        }
        Err(e) => {
            log::warn!("audio capture unavailable: {e}");
            None
        }
    };

    // 7. Run the widget (blocks until the window is closed).  An error here
    //    is the one fatal condition in the core.
    let app = NoiseWatchApp::new(level, &config.display);
    let options = native_options(&config);

    eframe::run_native("Noise Watch", options, Box::new(move |_cc| Ok(Box::new(app))))
}
