//! Silence detection with FFmpeg's `silencedetect` filter.

use crate::encode::FfmpegEngine;
use autosplit_core::{CancelToken, DetectionPass, Result, SilenceInterval, SplitterError};
use std::path::Path;
use tracing::{debug, warn};

/// Something that can run one detection pass over a file.
pub trait SilenceDetector {
    /// Intervals found with `pass` settings. A cancelled run may return a
    /// partial list; callers check the token themselves.
    fn detect(
        &self,
        source: &Path,
        pass: DetectionPass,
        cancel: &CancelToken,
    ) -> Result<Vec<SilenceInterval>>;
}

/// Build the ffmpeg arguments for one detection pass.
pub fn silence_args(source: &Path, pass: DetectionPass) -> Vec<String> {
    vec![
        "-i".into(),
        source.to_string_lossy().into_owned(),
        "-af".into(),
        format!(
            "silencedetect=noise={}dB:d={}",
            pass.noise_threshold_db, pass.min_duration
        ),
        "-f".into(),
        "null".into(),
        "-".into(),
    ]
}

/// Value following `key` on a log line, if it parses as a number.
fn marker_value(line: &str, key: &str) -> Option<Option<f64>> {
    let rest = &line[line.find(key)? + key.len()..];
    Some(rest.split_whitespace().next().and_then(|v| v.parse::<f64>().ok()))
}

/// Pair `silence_start` / `silence_end` markers into intervals.
///
/// A start without a matching end (including silence that runs to the end of
/// the file), an end without a start, and unparseable values are dropped.
pub fn parse_silence_log<'a, I>(lines: I) -> Vec<SilenceInterval>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut intervals = Vec::new();
    let mut pending: Option<f64> = None;
    let mut dropped = 0usize;

    for line in lines {
        if let Some(value) = marker_value(line, "silence_start:") {
            if pending.is_some() {
                dropped += 1;
            }
            pending = value.map(|v| v.max(0.0));
            if value.is_none() {
                dropped += 1;
            }
        } else if let Some(value) = marker_value(line, "silence_end:") {
            match (pending.take(), value) {
                (Some(start), Some(end)) => match SilenceInterval::new(start, end) {
                    Some(interval) => intervals.push(interval),
                    None => dropped += 1,
                },
                _ => dropped += 1,
            }
        }
    }

    if pending.is_some() {
        dropped += 1;
    }
    if dropped > 0 {
        warn!(dropped, "Dropped unpaired or malformed silence markers");
    }
    intervals
}

impl SilenceDetector for FfmpegEngine {
    fn detect(
        &self,
        source: &Path,
        pass: DetectionPass,
        cancel: &CancelToken,
    ) -> Result<Vec<SilenceInterval>> {
        if !source.exists() {
            return Err(SplitterError::NotFound(format!(
                "File not found: {}",
                source.display()
            )));
        }

        let args = silence_args(source, pass);
        let run = self.run(&args, cancel, SplitterError::Detection)?;
        let intervals = parse_silence_log(run.lines.iter().map(String::as_str));
        debug!(
            threshold_db = pass.noise_threshold_db,
            min_duration = pass.min_duration,
            found = intervals.len(),
            cancelled = run.cancelled,
            "silencedetect finished"
        );
        Ok(intervals)
    }
}
