//! Autosplit Audio - decoding, peaks and playback
//!
//! Architecture:
//! - `decode`: symphonia-based decoding of whole files into planar f32
//! - `waveform`: pre-computed min/max buckets and per-pixel peaks for display
//! - `playback`: cpal output stream that follows a seekable playhead

pub mod decode;
pub mod playback;
pub mod waveform;

pub use decode::{decode_bytes, decode_file};
pub use playback::Player;
pub use waveform::{Peak, Waveform};
