//! Time ranges and timecode formatting.
//!
//! All times are seconds as `f64`. Audio positions come from sample counts
//! divided by the sample rate, so sub-millisecond precision is plenty.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open time range `[start, end)` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive).
    pub start: f64,
    /// End time (exclusive).
    pub end: f64,
}

impl TimeRange {
    /// Create a new time range.
    #[inline]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Length of the range; zero when inverted.
    #[inline]
    pub fn duration(self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Midpoint of the range.
    #[inline]
    pub fn midpoint(self) -> f64 {
        (self.start + self.end) * 0.5
    }

    /// Check if a time is within this range.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} – {}",
            format_timecode(self.start),
            format_timecode(self.end)
        )
    }
}

/// Format seconds as `m:ss.cc` (or `h:mm:ss.cc` past one hour).
pub fn format_timecode(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let cs = total_cs % 100;
    let total_s = total_cs / 100;
    let s = total_s % 60;
    let m = (total_s / 60) % 60;
    let h = total_s / 3600;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}.{cs:02}")
    } else {
        format!("{m}:{s:02}.{cs:02}")
    }
}

/// Format a time-axis label. Whole seconds only.
pub fn format_axis_label(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let m = total / 60;
    let s = total % 60;
    if m >= 60 {
        format!("{}:{:02}:{:02}", m / 60, m % 60, s)
    } else {
        format!("{m}:{s:02}")
    }
}
