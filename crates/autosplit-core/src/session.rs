//! The editable state of one loaded audio file.
//!
//! Trim bounds and split points always satisfy
//! `trim_start < split_points[0] < … < split_points[n-1] < trim_end`.
//! Every mutation that moves a boundary bumps the revision and drops any
//! previously exported tracks.

use crate::audio::DecodedAudio;
use crate::segment::{self, ExportedSegment};
use crate::time::TimeRange;
use crate::viewport::Viewport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum distance between the two trim bounds.
pub const TRIM_MIN_GAP: f64 = 0.1;
/// Minimum distance between a dragged split and its neighbours.
pub const SPLIT_MIN_GAP: f64 = 0.05;
/// A new split must be at least this far from either trim bound.
pub const ADD_SPLIT_TRIM_MARGIN: f64 = 0.05;
/// A new split must be at least this far from every existing split.
pub const ADD_SPLIT_MIN_SPACING: f64 = 0.1;

/// Why a split could not be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRejection {
    /// The position lies outside the trimmed range.
    OutsideTrim,
    /// The position is within the margin of a trim bound.
    TooCloseToTrim,
    /// The position is within the spacing of an existing split.
    TooCloseToSplit,
}

impl SplitRejection {
    pub fn message(self) -> &'static str {
        match self {
            Self::OutsideTrim => "Split position is outside the trimmed range",
            Self::TooCloseToTrim => "Split position is too close to a trim boundary",
            Self::TooCloseToSplit => "Split position is too close to an existing split",
        }
    }
}

/// A loaded file with its trim bounds, split points, view and playhead.
#[derive(Debug, Clone)]
pub struct AudioSession {
    source_path: Option<PathBuf>,
    base_name: String,
    audio: Arc<DecodedAudio>,
    duration: f64,
    trim_start: f64,
    trim_end: f64,
    split_points: Vec<f64>,
    /// Zoom and scroll of the waveform view.
    pub viewport: Viewport,
    playhead: f64,
    revision: u64,
    exported: Option<Vec<ExportedSegment>>,
}

impl AudioSession {
    /// Start a session over freshly decoded audio.
    pub fn new(source_path: Option<PathBuf>, audio: DecodedAudio) -> Self {
        let duration = audio.duration();
        let base_name = source_path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        Self {
            source_path,
            base_name,
            audio: Arc::new(audio),
            duration,
            trim_start: 0.0,
            trim_end: duration,
            split_points: Vec::new(),
            viewport: Viewport::new(duration, 0.0),
            playhead: 0.0,
            revision: 0,
            exported: None,
        }
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// File stem used for exported track names.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn audio(&self) -> &Arc<DecodedAudio> {
        &self.audio
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn trim_start(&self) -> f64 {
        self.trim_start
    }

    pub fn trim_end(&self) -> f64 {
        self.trim_end
    }

    pub fn trim_range(&self) -> TimeRange {
        TimeRange::new(self.trim_start, self.trim_end)
    }

    pub fn split_points(&self) -> &[f64] {
        &self.split_points
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Bumped on every trim or split change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// `[trim_start, ...split_points, trim_end]`.
    pub fn boundaries(&self) -> Vec<f64> {
        segment::boundaries(self.trim_start, &self.split_points, self.trim_end)
    }

    /// Time ranges of the tracks an export would produce.
    pub fn segments(&self) -> Vec<TimeRange> {
        segment::segment_ranges(&self.boundaries())
    }

    /// Number of tracks an export would produce.
    pub fn track_count(&self) -> usize {
        self.split_points.len() + 1
    }

    // ── Trim ──────────────────────────────────────────────────

    /// Move the trim start towards `t`, clamped. Returns the applied value.
    pub fn set_trim_start(&mut self, t: f64) -> f64 {
        let mut hi = self.trim_end - TRIM_MIN_GAP;
        if let Some(&first) = self.split_points.first() {
            hi = hi.min(first - SPLIT_MIN_GAP);
        }
        let lo = 0.0;
        if hi < lo {
            return self.trim_start;
        }
        let next = t.clamp(lo, hi);
        if next != self.trim_start {
            self.trim_start = next;
            self.touch();
        }
        self.trim_start
    }

    /// Move the trim end towards `t`, clamped. Returns the applied value.
    pub fn set_trim_end(&mut self, t: f64) -> f64 {
        let mut lo = self.trim_start + TRIM_MIN_GAP;
        if let Some(&last) = self.split_points.last() {
            lo = lo.max(last + SPLIT_MIN_GAP);
        }
        let hi = self.duration;
        if hi < lo {
            return self.trim_end;
        }
        let next = t.clamp(lo, hi);
        if next != self.trim_end {
            self.trim_end = next;
            self.touch();
        }
        self.trim_end
    }

    /// Restore the trim bounds to the whole file.
    pub fn reset_trim(&mut self) {
        if self.trim_start != 0.0 || self.trim_end != self.duration {
            self.trim_start = 0.0;
            self.trim_end = self.duration;
            self.touch();
        }
    }

    // ── Splits ────────────────────────────────────────────────

    /// Drag split `index` towards `t`, keeping it between its neighbours.
    /// Returns the applied value, or `None` if the index is out of range.
    pub fn move_split(&mut self, index: usize, t: f64) -> Option<f64> {
        let current = *self.split_points.get(index)?;
        let prev = if index == 0 {
            self.trim_start
        } else {
            self.split_points[index - 1]
        };
        let next = self
            .split_points
            .get(index + 1)
            .copied()
            .unwrap_or(self.trim_end);
        let lo = (prev + SPLIT_MIN_GAP).max(0.0);
        let hi = (next - SPLIT_MIN_GAP).min(self.duration);
        if hi < lo {
            return Some(current);
        }
        let value = t.clamp(lo, hi);
        if value != current {
            self.split_points[index] = value;
            self.touch();
        }
        Some(value)
    }

    /// Insert a split at `t`, typically the playhead.
    pub fn add_split_at(&mut self, t: f64) -> Result<usize, SplitRejection> {
        if t <= self.trim_start || t >= self.trim_end {
            return Err(SplitRejection::OutsideTrim);
        }
        if t - self.trim_start < ADD_SPLIT_TRIM_MARGIN || self.trim_end - t < ADD_SPLIT_TRIM_MARGIN
        {
            return Err(SplitRejection::TooCloseToTrim);
        }
        if self
            .split_points
            .iter()
            .any(|&s| (s - t).abs() < ADD_SPLIT_MIN_SPACING)
        {
            return Err(SplitRejection::TooCloseToSplit);
        }
        let index = self.split_points.partition_point(|&s| s < t);
        self.split_points.insert(index, t);
        self.touch();
        debug!(index, time = t, "Split added");
        Ok(index)
    }

    /// Remove split `index`. Returns its time.
    pub fn remove_split(&mut self, index: usize) -> Option<f64> {
        if index >= self.split_points.len() {
            return None;
        }
        let t = self.split_points.remove(index);
        self.touch();
        Some(t)
    }

    /// Index of the split closest to `t`.
    pub fn nearest_split(&self, t: f64) -> Option<usize> {
        self.split_points
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - t).abs().total_cmp(&(b.1 - t).abs()))
            .map(|(i, _)| i)
    }

    pub fn clear_splits(&mut self) {
        if !self.split_points.is_empty() {
            self.split_points.clear();
            self.touch();
        }
    }

    /// Replace all split points, e.g. with selector output.
    ///
    /// Points are sorted; any that would break the boundary ordering
    /// (outside the trim range or closer than [`SPLIT_MIN_GAP`] to a
    /// neighbour) are dropped. Returns how many were dropped.
    pub fn set_split_points(&mut self, mut points: Vec<f64>) -> usize {
        points.retain(|p| p.is_finite());
        points.sort_by(f64::total_cmp);
        let requested = points.len();
        let mut accepted: Vec<f64> = Vec::with_capacity(requested);
        for p in points {
            let prev = accepted.last().copied().unwrap_or(self.trim_start);
            if p - prev >= SPLIT_MIN_GAP && self.trim_end - p >= SPLIT_MIN_GAP {
                accepted.push(p);
            }
        }
        let dropped = requested - accepted.len();
        if dropped > 0 {
            warn!(dropped, "Discarded split points that violate boundary ordering");
        }
        self.split_points = accepted;
        self.touch();
        dropped
    }

    // ── Playhead ──────────────────────────────────────────────

    /// Move the playhead, clamped to the file.
    pub fn seek(&mut self, t: f64) -> f64 {
        self.playhead = t.clamp(0.0, self.duration);
        self.playhead
    }

    // ── Export results ────────────────────────────────────────

    pub fn exported(&self) -> Option<&[ExportedSegment]> {
        self.exported.as_deref()
    }

    /// Store export output produced for `revision`.
    ///
    /// Returns `false` and drops the segments when boundaries changed while
    /// the export was running.
    pub fn store_export(&mut self, revision: u64, segments: Vec<ExportedSegment>) -> bool {
        if revision != self.revision {
            warn!(
                export_revision = revision,
                current = self.revision,
                "Discarding stale export"
            );
            return false;
        }
        self.exported = Some(segments);
        true
    }

    pub fn invalidate_exports(&mut self) {
        if self.exported.take().is_some() {
            debug!("Exported tracks invalidated");
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.invalidate_exports();
    }
}
