//! Autosplit Media - FFmpeg integration for silence detection and encoding
//!
//! This crate handles:
//! - Running `silencedetect` passes and parsing their log output
//! - Encoding one time range of the source into MP3 or FLAC
//! - Exporting every segment of a session and writing the track files

pub mod encode;
pub mod export;
pub mod silence;

pub use encode::{AudioCodec, EncodeParams, FfmpegEngine, SegmentEncoder};
pub use export::{
    track_file_name, write_segments, ExportOutcome, ExportProgress, SegmentExporter, TrackFile,
};
pub use silence::{parse_silence_log, SilenceDetector};
