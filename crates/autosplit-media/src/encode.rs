//! Segment encoding through an FFmpeg subprocess.
//!
//! [`FfmpegEngine`] is constructed once (binary located from settings or
//! `PATH`) and handed to background jobs. It implements both
//! [`SegmentEncoder`] and [`crate::SilenceDetector`].

use autosplit_core::{CancelToken, Result, SplitterError, TimeRange};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

// ── Output formats ──────────────────────────────────────────────

/// Audio codec for exported tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioCodec {
    #[default]
    Mp3,
    Flac,
}

impl AudioCodec {
    pub const ALL: [AudioCodec; 2] = [AudioCodec::Mp3, AudioCodec::Flac];

    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::Flac => "flac",
        }
    }

    /// File extension for this codec.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Flac => "flac",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Flac => "FLAC",
        }
    }

    /// Whether the bitrate setting applies.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Mp3)
    }
}

/// Encoder settings for one export batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeParams {
    pub codec: AudioCodec,
    /// Bitrate in kbps. Ignored for FLAC.
    pub bitrate_kbps: u32,
}

impl EncodeParams {
    pub const BITRATES: [u32; 5] = [128, 160, 192, 256, 320];

    pub fn mp3(bitrate_kbps: u32) -> Self {
        Self {
            codec: AudioCodec::Mp3,
            bitrate_kbps,
        }
    }

    pub fn flac() -> Self {
        Self {
            codec: AudioCodec::Flac,
            bitrate_kbps: 0,
        }
    }
}

impl Default for EncodeParams {
    fn default() -> Self {
        Self::mp3(192)
    }
}

/// Something that can encode `[start, end)` of a source file.
pub trait SegmentEncoder {
    /// Encode one range. `Ok(None)` means the token fired mid-encode.
    fn encode(
        &self,
        source: &Path,
        range: TimeRange,
        params: EncodeParams,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<u8>>>;
}

/// Format seconds for ffmpeg time arguments.
fn seconds_arg(t: f64) -> String {
    format!("{:.3}", t.max(0.0))
}

/// Build the ffmpeg arguments for encoding `range` of `source` to `output`.
pub fn encode_args(source: &Path, range: TimeRange, params: EncodeParams, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-i".into(),
        source.to_string_lossy().into_owned(),
        "-ss".into(),
        seconds_arg(range.start),
        "-t".into(),
        seconds_arg(range.duration()),
        "-vn".into(),
        "-c:a".into(),
        params.codec.ffmpeg_encoder().into(),
    ];

    if params.codec.is_lossy() {
        args.extend_from_slice(&["-b:a".into(), format!("{}k", params.bitrate_kbps)]);
    }

    args.push(output.to_string_lossy().into_owned());
    args
}

// ── Engine ───────────────────────────────────────────────────────

/// Log lines from one finished ffmpeg run.
pub(crate) struct FfmpegRun {
    pub lines: Vec<String>,
    pub cancelled: bool,
}

/// FFmpeg subprocess engine for detection and encoding.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    binary: PathBuf,
}

impl FfmpegEngine {
    /// Use a specific ffmpeg binary.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Resolve the binary from an explicit path, falling back to `PATH`.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let engine = Self::new(path);
            if path.is_file() && engine.is_available() {
                return Ok(engine);
            }
            warn!(path = %path.display(), "Configured ffmpeg binary not usable, searching PATH");
        }

        let binary = which::which("ffmpeg")
            .map_err(|e| SplitterError::NotFound(format!("ffmpeg not found on PATH: {e}")))?;
        info!(ffmpeg = %binary.display(), "Using ffmpeg");
        Ok(Self::new(binary))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Check that the binary runs.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    }

    /// Run ffmpeg with `args`, collecting every log line.
    ///
    /// The token is polled on each event; when it fires the child is killed
    /// and the run reports `cancelled`.
    pub(crate) fn run(
        &self,
        args: &[String],
        cancel: &CancelToken,
        on_error: fn(String) -> SplitterError,
    ) -> Result<FfmpegRun> {
        let mut child = FfmpegCommand::new_with_path(&self.binary)
            .args(args)
            .spawn()
            .map_err(|e| on_error(format!("Failed to spawn ffmpeg: {e}")))?;

        let events = child
            .iter()
            .map_err(|e| on_error(format!("Failed to read ffmpeg output: {e}")))?;

        let mut lines = Vec::new();
        let mut errors = Vec::new();
        for event in events {
            if cancel.is_cancelled() {
                debug!("Killing ffmpeg after cancel");
                let _ = child.kill();
                let _ = child.wait();
                return Ok(FfmpegRun {
                    lines,
                    cancelled: true,
                });
            }
            match event {
                FfmpegEvent::Log(_, line) => lines.push(line),
                FfmpegEvent::Error(line) => errors.push(line),
                _ => {}
            }
        }

        let status = child
            .wait()
            .map_err(|e| on_error(format!("Failed to wait for ffmpeg: {e}")))?;
        if !status.success() {
            let detail = errors.last().or(lines.last()).cloned().unwrap_or_default();
            return Err(on_error(format!("ffmpeg exited with {status}: {detail}")));
        }

        Ok(FfmpegRun {
            lines,
            cancelled: false,
        })
    }
}

impl SegmentEncoder for FfmpegEngine {
    fn encode(
        &self,
        source: &Path,
        range: TimeRange,
        params: EncodeParams,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<u8>>> {
        let scratch = tempfile::Builder::new()
            .prefix("autosplit-")
            .suffix(&format!(".{}", params.codec.extension()))
            .tempfile()?;

        let args = encode_args(source, range, params, scratch.path());
        debug!(start = range.start, end = range.end, codec = params.codec.label(), "Encoding segment");

        let run = self.run(&args, cancel, SplitterError::Encoder)?;
        if run.cancelled {
            return Ok(None);
        }

        let bytes = std::fs::read(scratch.path())?;
        if bytes.is_empty() {
            return Err(SplitterError::Encoder("ffmpeg produced an empty file".into()));
        }
        Ok(Some(bytes))
    }
}
