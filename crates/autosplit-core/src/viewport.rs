//! Mapping between audio time and waveform pixel columns.
//!
//! The viewport shows `duration / zoom` seconds starting at `view_start`
//! across `width` pixels. Pixel coordinates are relative to the left edge of
//! the waveform area.

use crate::time::TimeRange;
use serde::{Deserialize, Serialize};

/// Lowest zoom level (whole file visible).
pub const MIN_ZOOM: f64 = 1.0;
/// Highest zoom level.
pub const MAX_ZOOM: f64 = 200.0;
/// Zoom multiplier applied per wheel tick towards the user.
pub const ZOOM_IN_FACTOR: f64 = 1.18;
/// Zoom multiplier applied per wheel tick away from the user.
pub const ZOOM_OUT_FACTOR: f64 = 0.85;

/// Time-axis label spacing ladder in seconds, coarse to fine.
pub const LABEL_INTERVALS: [f64; 4] = [60.0, 10.0, 5.0, 1.0];

/// Convert a time to a pixel column.
///
/// Undefined when `visible_duration <= 0` or `pixel_width <= 0`; callers
/// guard against that.
#[inline]
pub fn time_to_x(t: f64, view_start: f64, visible_duration: f64, pixel_width: f64) -> f64 {
    ((t - view_start) / visible_duration) * pixel_width
}

/// Convert a pixel column to a time. Inverse of [`time_to_x`].
#[inline]
pub fn x_to_time(x: f64, view_start: f64, visible_duration: f64, pixel_width: f64) -> f64 {
    view_start + (x / pixel_width) * visible_duration
}

/// Zoom and scroll state of the waveform view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Total audio duration in seconds.
    pub duration: f64,
    /// Zoom factor, `MIN_ZOOM..=MAX_ZOOM`.
    pub zoom: f64,
    /// First visible time in seconds.
    pub view_start: f64,
    /// Width of the waveform area in pixels.
    pub width: f64,
}

impl Viewport {
    /// A fully zoomed-out viewport.
    pub fn new(duration: f64, width: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            zoom: MIN_ZOOM,
            view_start: 0.0,
            width,
        }
    }

    /// Seconds of audio currently visible.
    #[inline]
    pub fn visible_duration(&self) -> f64 {
        self.duration / self.zoom
    }

    /// The visible time window.
    pub fn visible_range(&self) -> TimeRange {
        TimeRange::new(self.view_start, self.view_start + self.visible_duration())
    }

    /// Whether pixel/time mapping is defined for the current state.
    #[inline]
    pub fn is_mappable(&self) -> bool {
        self.visible_duration() > 0.0 && self.width > 0.0
    }

    /// Whether the view is zoomed in past the whole-file view.
    #[inline]
    pub fn is_zoomed(&self) -> bool {
        self.zoom > MIN_ZOOM + 1e-9
    }

    /// Pixel column for `t`. Returns 0 when the viewport is not mappable.
    pub fn time_to_x(&self, t: f64) -> f64 {
        if !self.is_mappable() {
            return 0.0;
        }
        time_to_x(t, self.view_start, self.visible_duration(), self.width)
    }

    /// Time at pixel column `x`. Returns `view_start` when not mappable.
    pub fn x_to_time(&self, x: f64) -> f64 {
        if !self.is_mappable() {
            return self.view_start;
        }
        x_to_time(x, self.view_start, self.visible_duration(), self.width)
    }

    /// Time at pixel column `x`, clamped into `[0, duration]`.
    pub fn x_to_time_clamped(&self, x: f64) -> f64 {
        self.x_to_time(x).clamp(0.0, self.duration)
    }

    pub fn pixels_per_second(&self) -> f64 {
        if !self.is_mappable() {
            return 0.0;
        }
        self.width / self.visible_duration()
    }

    /// Largest legal `view_start` at the current zoom.
    pub fn max_view_start(&self) -> f64 {
        (self.duration - self.visible_duration()).max(0.0)
    }

    /// Pull `view_start` back into `[0, duration − visible_duration]`.
    pub fn clamp_view_start(&mut self) {
        self.view_start = self.view_start.clamp(0.0, self.max_view_start());
    }

    /// Resize the drawing area. Zoom and view start are kept.
    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Translate the view by a pointer drag of `dx` pixels.
    ///
    /// Dragging right (positive `dx`) reveals earlier audio.
    pub fn pan_by_pixels(&mut self, dx: f64) {
        let pps = self.pixels_per_second();
        if pps <= 0.0 {
            return;
        }
        self.view_start -= dx / pps;
        self.clamp_view_start();
    }

    /// Set the zoom level directly, keeping the time at pixel `anchor_x`
    /// stationary on screen.
    pub fn set_zoom_at(&mut self, anchor_x: f64, zoom: f64) {
        if !self.is_mappable() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            return;
        }
        let anchor_time = self.x_to_time(anchor_x);
        let fraction = anchor_x / self.width;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.view_start = anchor_time - fraction * self.visible_duration();
        self.clamp_view_start();
    }

    /// Multiply the zoom by `factor` around pixel `anchor_x`.
    pub fn zoom_at(&mut self, anchor_x: f64, factor: f64) {
        let target = self.zoom * factor;
        self.set_zoom_at(anchor_x, target);
    }

    /// Apply wheel ticks around `anchor_x`. Positive ticks zoom in.
    pub fn wheel_zoom(&mut self, anchor_x: f64, ticks: i32) {
        if ticks == 0 {
            return;
        }
        let factor = if ticks > 0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        self.zoom_at(anchor_x, factor.powi(ticks.abs()));
    }

    /// Reset to the whole-file view.
    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.view_start = 0.0;
    }

    /// Scroll so `t` is visible, placing it at the left quarter when it was
    /// off screen.
    pub fn ensure_visible(&mut self, t: f64) {
        let range = self.visible_range();
        if t < range.start || t > range.end {
            self.view_start = t - self.visible_duration() * 0.25;
            self.clamp_view_start();
        }
    }

    /// Spacing between time-axis labels for the visible duration.
    pub fn time_label_interval(&self) -> f64 {
        let visible = self.visible_duration();
        if visible >= 300.0 {
            LABEL_INTERVALS[0]
        } else if visible >= 60.0 {
            LABEL_INTERVALS[1]
        } else if visible >= 20.0 {
            LABEL_INTERVALS[2]
        } else {
            LABEL_INTERVALS[3]
        }
    }

    /// Label times inside the visible window, aligned to the interval.
    pub fn label_times(&self) -> Vec<f64> {
        let interval = self.time_label_interval();
        let range = self.visible_range();
        let first = (range.start / interval).ceil() as i64;
        let last = (range.end / interval).floor() as i64;
        (first..=last).map(|k| k as f64 * interval).collect()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
