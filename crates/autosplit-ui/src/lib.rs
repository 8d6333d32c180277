//! Autosplit UI - egui widgets for the waveform editor
//!
//! Provides:
//! - `render`: display list for the waveform, trim flags, split markers and playhead
//! - `interaction`: pointer state machine for trimming, splitting, panning and zoom
//! - `waveform_view`: the egui widget tying both to an `AudioSession`
//! - `theme`: palette and egui style

pub mod interaction;
pub mod render;
pub mod theme;
pub mod waveform_view;

pub use interaction::{hit_test, DragState, Hit, InteractionController, InteractionEvent};
pub use render::{build_display_list, DrawCmd, WaveformScene};
pub use theme::Theme;
pub use waveform_view::WaveformView;
