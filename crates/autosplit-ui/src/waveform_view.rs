//! egui widget showing the session waveform and routing pointer input to the
//! [`InteractionController`].

use crate::interaction::{InteractionController, InteractionEvent};
use crate::render::{self, DrawCmd, WaveformScene};
use autosplit_audio::{Peak, Waveform};
use autosplit_core::AudioSession;
use egui::{Rect, Sense, Vec2};

/// Minimum height of the waveform area.
pub const MIN_HEIGHT: f32 = 160.0;

/// Inputs the peak list depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PeaksKey {
    generation: u64,
    zoom: f64,
    view_start: f64,
    width: usize,
}

/// Inputs the display list depends on.
#[derive(Debug, Clone, PartialEq)]
struct SceneKey {
    peaks: PeaksKey,
    duration: f64,
    trim: (f64, f64),
    split_points: Vec<f64>,
    playhead: f64,
    rect: Rect,
}

/// Waveform widget with cached peaks and display list.
#[derive(Default)]
pub struct WaveformView {
    waveform: Option<Waveform>,
    generation: u64,
    gain: f32,
    controller: InteractionController,
    peaks: Option<(PeaksKey, Vec<Peak>)>,
    scene: Option<(SceneKey, Vec<DrawCmd>)>,
}

impl WaveformView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed waveform and drop every cache.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        let peak = waveform.max_magnitude();
        self.gain = if peak > 1e-4 { (1.0 / peak).min(8.0) } else { 1.0 };
        self.waveform = Some(waveform);
        self.generation += 1;
        self.peaks = None;
        self.scene = None;
        self.controller.cancel();
    }

    pub fn clear(&mut self) {
        self.waveform = None;
        self.generation += 1;
        self.peaks = None;
        self.scene = None;
        self.controller.cancel();
    }

    pub fn has_waveform(&self) -> bool {
        self.waveform.is_some()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    fn refresh_peaks(&mut self, key: PeaksKey, session: &AudioSession) {
        let stale = self.peaks.as_ref().map_or(true, |(k, _)| *k != key);
        if stale {
            let peaks = self.waveform.as_ref().map_or_else(Vec::new, |w| {
                w.peaks(
                    session.viewport.view_start,
                    session.viewport.visible_duration(),
                    key.width,
                )
            });
            self.peaks = Some((key, peaks));
        }
    }

    /// Draw the waveform and handle input. Returns what changed this frame.
    pub fn show(&mut self, ui: &mut egui::Ui, session: &mut AudioSession) -> Vec<InteractionEvent> {
        let size = Vec2::new(ui.available_width(), ui.available_height().max(MIN_HEIGHT));
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let rect = response.rect;
        session.viewport.set_width(rect.width() as f64);

        let mut events = Vec::new();
        let local_x = |pos: egui::Pos2| (pos.x - rect.left()) as f64;
        let (pressed, released, pointer_pos, scroll_y) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
                i.raw_scroll_delta.y,
            )
        });

        if pressed && response.hovered() {
            if let Some(pos) = pointer_pos {
                self.controller.pointer_down(session, local_x(pos));
            }
        }
        if response.dragged() {
            if let Some(pos) = pointer_pos {
                events.extend(self.controller.pointer_move(session, local_x(pos)));
            }
        }
        if released {
            if let Some(pos) = pointer_pos {
                events.extend(self.controller.pointer_up(session, local_x(pos)));
            } else {
                self.controller.cancel();
            }
        }
        if response.hovered() && scroll_y != 0.0 {
            if let Some(pos) = response.hover_pos() {
                let ticks = if scroll_y > 0.0 { 1 } else { -1 };
                events.extend(self.controller.wheel(session, local_x(pos), ticks));
            }
        }

        if response.hovered() || self.controller.is_dragging() {
            let hover = response.hover_pos().map(local_x);
            ui.ctx().set_cursor_icon(self.controller.cursor(session, hover));
        }

        let peaks_key = PeaksKey {
            generation: self.generation,
            zoom: session.viewport.zoom,
            view_start: session.viewport.view_start,
            width: rect.width().max(0.0) as usize,
        };
        let scene_key = SceneKey {
            peaks: peaks_key,
            duration: session.duration(),
            trim: (session.trim_start(), session.trim_end()),
            split_points: session.split_points().to_vec(),
            playhead: session.playhead(),
            rect,
        };

        if self.scene.as_ref().map_or(true, |(k, _)| *k != scene_key) {
            self.refresh_peaks(peaks_key, session);
            let peaks = self.peaks.as_ref().map_or(&[][..], |(_, p)| p.as_slice());
            let scene = WaveformScene {
                peaks,
                gain: self.gain,
                viewport: &session.viewport,
                trim: session.trim_range(),
                split_points: session.split_points(),
                playhead: session.playhead(),
            };
            let cmds = render::build_display_list(&scene, rect);
            self.scene = Some((scene_key, cmds));
        }

        if let Some((_, cmds)) = &self.scene {
            render::paint(&painter, cmds);
        }

        events
    }
}
