//! Silence intervals, export segments and boundary sequences.

use crate::time::TimeRange;
use serde::{Deserialize, Serialize};

/// A detected region of near-silence. Always `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceInterval {
    start: f64,
    end: f64,
}

impl SilenceInterval {
    /// Create an interval; `None` unless `start < end` and both are finite.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        (start.is_finite() && end.is_finite() && start < end).then_some(Self { start, end })
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Center of the silent region, used as a split candidate.
    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) * 0.5
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// One encoded track produced by an export batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedSegment {
    /// Zero-based track index.
    pub index: usize,
    pub start_time: f64,
    pub end_time: f64,
    /// Encoded file contents.
    pub blob: Vec<u8>,
}

/// Whether a boundary sequence is strictly increasing.
pub fn is_strictly_increasing(boundaries: &[f64]) -> bool {
    boundaries.windows(2).all(|w| w[0] < w[1])
}

/// Build `[trim_start, ...split_points, trim_end]`.
pub fn boundaries(trim_start: f64, split_points: &[f64], trim_end: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(split_points.len() + 2);
    out.push(trim_start);
    out.extend_from_slice(split_points);
    out.push(trim_end);
    out
}

/// Consecutive pairs of a boundary sequence.
pub fn segment_ranges(boundaries: &[f64]) -> Vec<TimeRange> {
    boundaries
        .windows(2)
        .map(|w| TimeRange::new(w[0], w[1]))
        .collect()
}
