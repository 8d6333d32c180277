//! Autosplit Core - Foundation types for the audio splitter
//!
//! This crate provides the pieces every other crate shares:
//! - Time ranges and timecode formatting
//! - Time/pixel mapping for the waveform viewport
//! - The editable session (trim bounds, split points, export results)
//! - Silence-based split point selection
//! - Error types and cooperative cancellation

pub mod audio;
pub mod cancel;
pub mod error;
pub mod segment;
pub mod session;
pub mod split;
pub mod time;
pub mod viewport;

pub use audio::DecodedAudio;
pub use cancel::CancelToken;
pub use error::{Result, SplitterError};
pub use segment::{ExportedSegment, SilenceInterval};
pub use session::{AudioSession, SplitRejection};
pub use split::{
    detect_progressively, select_split_points, select_split_points_in_range, DetectionOutcome,
    DetectionPass,
};
pub use time::{format_timecode, TimeRange};
pub use viewport::Viewport;
