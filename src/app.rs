//! Noise level widget — egui/eframe application.
//!
//! # Architecture
//!
//! [`NoiseWatchApp`] owns the display path: the dB history ring, the graph
//! scale and the fixed refresh cadence.  Each `update` it polls the shared
//! [`LevelSnapshot`] written by the sampling thread; once per
//! `refresh_millis` it pushes the latest instantaneous value into the ring.
//! The widget renders:
//!
//! * a numeric readout of the latest instantaneous dB value,
//! * a classification badge (`OK` / `CAUTION` / `HIGH`) against the fixed
//!   limit,
//! * a scrolling line graph of the ring, with a dashed reference line at the
//!   limit.
//!
//! This path never waits on the network — the publisher task lives entirely
//! on the tokio runtime.
//!
//! [`LevelSnapshot`]: crate::pipeline::LevelSnapshot

use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::DisplayConfig;
use crate::display::{classify, Badge, GraphScale, HistoryRing};
use crate::pipeline::SharedLevel;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

const COLOR_OK: egui::Color32 = egui::Color32::from_rgb(0x2e, 0xcc, 0x71);
const COLOR_CAUTION: egui::Color32 = egui::Color32::from_rgb(0xf3, 0x9c, 0x12);
const COLOR_HIGH: egui::Color32 = egui::Color32::from_rgb(0xe7, 0x4c, 0x3c);
const COLOR_TRACE: egui::Color32 = egui::Color32::from_rgb(0x3a, 0xa0, 0xff);
const COLOR_LIMIT: egui::Color32 = egui::Color32::from_rgb(0xaa, 0xaa, 0xaa);

/// Badge color used for both the label and the readout accent.
fn badge_color(badge: Badge) -> egui::Color32 {
    match badge {
        Badge::Ok => COLOR_OK,
        Badge::Caution => COLOR_CAUTION,
        Badge::High => COLOR_HIGH,
    }
}

// ---------------------------------------------------------------------------
// NoiseWatchApp
// ---------------------------------------------------------------------------

/// eframe application — the floating noise level widget.
pub struct NoiseWatchApp {
    /// Level snapshot written by the sampling thread.
    level: SharedLevel,
    /// Scrolling dB history, one value per refresh tick.
    history: HistoryRing,
    /// dB → pixel-row mapping for the graph.
    scale: GraphScale,
    /// Fixed classification limit in dB.
    limit_db: f64,
    /// Graph push cadence.
    refresh: Duration,
    /// Last time a value was pushed into the ring.
    last_push: Option<Instant>,
}

impl NoiseWatchApp {
    /// Create the widget from display config and the shared level handle.
    pub fn new(level: SharedLevel, display: &DisplayConfig) -> Self {
        Self {
            level,
            history: HistoryRing::new(display.history_len),
            scale: GraphScale::new(display.graph_min_db, display.graph_max_db),
            limit_db: display.limit_db,
            refresh: Duration::from_millis(display.refresh_millis),
            last_push: None,
        }
    }

    /// Returns `true` once per refresh interval and records the tick.
    ///
    /// The cadence is wall-clock based and independent of block arrival, so
    /// the graph scrolls at a constant rate regardless of audio or network
    /// state.
    fn should_push(&mut self, now: Instant) -> bool {
        let due = self
            .last_push
            .map_or(true, |t| now.duration_since(t) >= self.refresh);
        if due {
            self.last_push = Some(now);
        }
        due
    }

    /// Push the latest measured level into the history ring if a refresh
    /// tick has elapsed.
    fn tick(&mut self, now: Instant) {
        if !self.should_push(now) {
            return;
        }
        let snap = *self.level.lock().unwrap();
        if snap.valid {
            self.history.push(snap.dba_instant as f32);
        }
    }

    // ── Rendering ────────────────────────────────────────────────────────

    fn draw_readout(&self, ui: &mut egui::Ui) {
        let snap = *self.level.lock().unwrap();

        ui.horizontal(|ui| {
            if snap.valid {
                let badge = classify(snap.dba_instant, self.limit_db);
                let color = badge_color(badge);

                ui.label(
                    egui::RichText::new(format!("{:5.1} dB", snap.dba_instant))
                        .size(28.0)
                        .strong()
                        .color(color),
                );
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new(badge.label())
                        .size(16.0)
                        .strong()
                        .color(color),
                );
            } else {
                ui.label(
                    egui::RichText::new("--.- dB")
                        .size(28.0)
                        .color(egui::Color32::GRAY),
                );
                ui.add_space(8.0);
                ui.label(
                    egui::RichText::new("waiting for audio")
                        .size(12.0)
                        .color(egui::Color32::GRAY),
                );
            }
        });
    }

    fn draw_graph(&self, ui: &mut egui::Ui) {
        let height = 80.0;
        let (rect, _response) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), height),
            egui::Sense::hover(),
        );
        let painter = ui.painter_at(rect);

        painter.rect_filled(rect, 2, egui::Color32::from_rgb(0x16, 0x16, 0x1e));

        // Dashed reference line at the fixed limit.
        let limit_y = self.scale.y_for(self.limit_db, rect.top(), rect.height());
        painter.extend(egui::Shape::dashed_line(
            &[
                egui::pos2(rect.left(), limit_y),
                egui::pos2(rect.right(), limit_y),
            ],
            egui::Stroke::new(1.0, COLOR_LIMIT),
            6.0,
            4.0,
        ));

        // History trace, newest at the right edge.
        let values = self.history.snapshot();
        if values.len() >= 2 {
            let step = rect.width() / (self.history.capacity() - 1) as f32;
            let x0 = rect.right() - (values.len() - 1) as f32 * step;

            let points: Vec<egui::Pos2> = values
                .iter()
                .enumerate()
                .map(|(i, &db)| {
                    egui::pos2(
                        x0 + i as f32 * step,
                        self.scale.y_for(db as f64, rect.top(), rect.height()),
                    )
                })
                .collect();

            painter.add(egui::Shape::line(
                points,
                egui::Stroke::new(1.5, COLOR_TRACE),
            ));
        }
    }
}

impl eframe::App for NoiseWatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick(Instant::now());

        egui::CentralPanel::default()
            .frame(
                egui::Frame::new()
                    .fill(egui::Color32::from_rgb(0x1e, 0x1e, 0x28))
                    .inner_margin(egui::Margin::same(10)),
            )
            .show(ctx, |ui| {
                self.draw_readout(ui);
                ui.add_space(6.0);
                self.draw_graph(ui);
            });

        // Keep repainting at the graph cadence even without input events.
        ctx.request_repaint_after(self.refresh);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
