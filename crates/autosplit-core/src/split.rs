//! Choosing split points from detected silence.
//!
//! The selector places `num_tracks - 1` splits near the equal-division
//! positions, snapping each one to the nearest unused silence midpoint when
//! one lies close enough. Silence itself is found by [`detect_progressively`],
//! which relaxes the detector settings until enough intervals turn up.

use crate::cancel::CancelToken;
use crate::error::{Result, SplitterError};
use crate::segment::SilenceInterval;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Search radius as a fraction of the ideal track length.
pub const SEARCH_RADIUS_FRACTION: f64 = 0.4;

/// Noise thresholds in dBFS, strictest first.
pub const NOISE_THRESHOLDS_DB: [f64; 5] = [-50.0, -45.0, -40.0, -35.0, -30.0];

/// Minimum silence durations in seconds, longest first.
pub const MIN_SILENCE_DURATIONS: [f64; 4] = [2.0, 1.5, 1.0, 0.5];

/// Equal-division split positions for `num_tracks` tracks.
pub fn ideal_positions(num_tracks: usize, duration: f64) -> Vec<f64> {
    if num_tracks < 2 {
        return Vec::new();
    }
    (1..num_tracks)
        .map(|k| duration * k as f64 / num_tracks as f64)
        .collect()
}

/// Pick split points for `num_tracks` tracks over `[0, duration]`.
///
/// Greedy per ideal slot, in order: the first slot claims its nearest
/// midpoint before later slots look. Midpoints farther than the search
/// radius leave the slot at its ideal position.
pub fn select_split_points(
    num_tracks: usize,
    duration: f64,
    silences: &[SilenceInterval],
) -> Vec<f64> {
    let ideals = ideal_positions(num_tracks, duration);
    if silences.is_empty() || ideals.is_empty() {
        return ideals;
    }

    let radius = SEARCH_RADIUS_FRACTION * (duration / num_tracks as f64);
    let midpoints: Vec<f64> = silences.iter().map(SilenceInterval::midpoint).collect();
    let mut used = vec![false; midpoints.len()];

    let mut points: Vec<f64> = ideals
        .iter()
        .map(|&ideal| {
            let best = midpoints
                .iter()
                .enumerate()
                .filter(|(i, _)| !used[*i])
                .map(|(i, &m)| (i, (m - ideal).abs()))
                .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((i, d)),
                });

            match best {
                Some((i, distance)) if distance < radius => {
                    used[i] = true;
                    midpoints[i]
                }
                _ => ideal,
            }
        })
        .collect();

    points.sort_by(f64::total_cmp);
    points
}

/// Run the selector over `[start, end]` instead of the whole file.
///
/// Silences are clipped to the range before their midpoints are taken.
pub fn select_split_points_in_range(
    num_tracks: usize,
    start: f64,
    end: f64,
    silences: &[SilenceInterval],
) -> Vec<f64> {
    let length = end - start;
    if length <= 0.0 {
        return Vec::new();
    }
    let local: Vec<SilenceInterval> = silences
        .iter()
        .filter_map(|s| SilenceInterval::new(s.start().max(start) - start, s.end().min(end) - start))
        .collect();
    select_split_points(num_tracks, length, &local)
        .into_iter()
        .map(|p| p + start)
        .collect()
}

/// Settings for one silence-detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionPass {
    /// Noise floor in dBFS; quieter audio counts as silence.
    pub noise_threshold_db: f64,
    /// Shortest silence worth reporting, in seconds.
    pub min_duration: f64,
}

/// All passes in the order they are tried.
pub fn detection_ladder() -> Vec<DetectionPass> {
    NOISE_THRESHOLDS_DB
        .iter()
        .flat_map(|&noise_threshold_db| {
            MIN_SILENCE_DURATIONS
                .iter()
                .map(move |&min_duration| DetectionPass {
                    noise_threshold_db,
                    min_duration,
                })
        })
        .collect()
}

/// What a progressive detection run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    /// Detection finished. `satisfied` is false when the ladder ran out
    /// before finding enough intervals; `intervals` then holds the richest
    /// pass.
    Found {
        pass: DetectionPass,
        intervals: Vec<SilenceInterval>,
        satisfied: bool,
    },
    /// The cancel token fired between passes.
    Cancelled,
}

/// Relax detector settings until at least `num_splits` intervals appear.
///
/// `detect` runs one pass. The token is checked before each pass.
pub fn detect_progressively<F>(
    num_splits: usize,
    cancel: &CancelToken,
    mut detect: F,
) -> Result<DetectionOutcome>
where
    F: FnMut(DetectionPass) -> Result<Vec<SilenceInterval>>,
{
    let mut best: Option<(DetectionPass, Vec<SilenceInterval>)> = None;

    for pass in detection_ladder() {
        if cancel.is_cancelled() {
            info!("Silence detection cancelled");
            return Ok(DetectionOutcome::Cancelled);
        }

        let intervals = detect(pass)?;
        // A pass interrupted by cancel may report a truncated list.
        if cancel.is_cancelled() {
            info!("Silence detection cancelled");
            return Ok(DetectionOutcome::Cancelled);
        }
        debug!(
            threshold_db = pass.noise_threshold_db,
            min_duration = pass.min_duration,
            found = intervals.len(),
            "Silence detection pass"
        );

        if intervals.len() >= num_splits {
            return Ok(DetectionOutcome::Found {
                pass,
                intervals,
                satisfied: true,
            });
        }
        if best
            .as_ref()
            .map_or(true, |(_, b)| intervals.len() > b.len())
        {
            best = Some((pass, intervals));
        }
    }

    best.map(|(pass, intervals)| DetectionOutcome::Found {
        pass,
        intervals,
        satisfied: false,
    })
    .ok_or_else(|| SplitterError::Detection("detection ladder is empty".into()))
}
