//! Waveform computation for audio visualization.
//!
//! A mono mixdown is summarized into fixed-size min/max buckets once per
//! file. Per-pixel peaks for the visible window are then built from the
//! buckets when zoomed out, or from raw samples when zoomed in far enough
//! that a pixel covers less than a few buckets.

use autosplit_core::DecodedAudio;
use serde::{Deserialize, Serialize};

/// Source samples summarized by each bucket.
pub const DEFAULT_SAMPLES_PER_BUCKET: usize = 256;

/// A min/max pair representing the amplitude range at a pixel position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub min: f32,
    pub max: f32,
}

impl Peak {
    const EMPTY: Self = Self {
        min: f32::MAX,
        max: f32::MIN,
    };

    #[inline]
    fn include(&mut self, other: Peak) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Largest absolute amplitude in the pair.
    pub fn magnitude(&self) -> f32 {
        self.min.abs().max(self.max.abs())
    }
}

/// Pre-computed waveform data for a file's mono mixdown.
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Samples per bucket (the reduction ratio).
    pub samples_per_bucket: usize,
    /// Min/max per bucket.
    pub buckets: Vec<Peak>,
    /// Mono mixdown used for zoomed-in views.
    samples: Vec<f32>,
    /// Source sample rate.
    pub sample_rate: u32,
}

impl Waveform {
    /// Build a waveform from decoded audio.
    pub fn from_audio(audio: &DecodedAudio) -> Self {
        Self::compute(audio.mixdown(), DEFAULT_SAMPLES_PER_BUCKET, audio.sample_rate)
    }

    /// Compute a waveform from mono samples.
    pub fn compute(samples: Vec<f32>, samples_per_bucket: usize, sample_rate: u32) -> Self {
        let samples_per_bucket = samples_per_bucket.max(1);
        let buckets = samples
            .chunks(samples_per_bucket)
            .map(|chunk| {
                chunk.iter().fold(Peak::EMPTY, |mut acc, &s| {
                    acc.include(Peak { min: s, max: s });
                    acc
                })
            })
            .collect();

        Self {
            samples_per_bucket,
            buckets,
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest absolute amplitude in the file, for normalized drawing.
    pub fn max_magnitude(&self) -> f32 {
        self.buckets
            .iter()
            .map(Peak::magnitude)
            .fold(0.0, f32::max)
    }

    /// One min/max pair per pixel for the window
    /// `[view_start, view_start + visible_duration)`.
    ///
    /// Pixels past the end of the audio get a zero pair.
    pub fn peaks(&self, view_start: f64, visible_duration: f64, width_px: usize) -> Vec<Peak> {
        if width_px == 0 || visible_duration <= 0.0 || self.sample_rate == 0 {
            return Vec::new();
        }

        let rate = self.sample_rate as f64;
        let len = self.samples.len();
        let samples_per_px = visible_duration * rate / width_px as f64;
        let use_buckets = samples_per_px >= (self.samples_per_bucket * 2) as f64;

        (0..width_px)
            .map(|px| {
                let t0 = view_start + visible_duration * px as f64 / width_px as f64;
                let t1 = view_start + visible_duration * (px + 1) as f64 / width_px as f64;
                let s0 = (t0 * rate).floor().max(0.0) as usize;
                let s1 = ((t1 * rate).floor().max(0.0) as usize).max(s0 + 1).min(len);
                if s0 >= len {
                    return Peak::default();
                }

                let peak = if use_buckets {
                    let b0 = s0 / self.samples_per_bucket;
                    let b1 = s1.div_ceil(self.samples_per_bucket).min(self.buckets.len());
                    self.buckets[b0..b1.max(b0 + 1)]
                        .iter()
                        .fold(Peak::EMPTY, |mut acc, &p| {
                            acc.include(p);
                            acc
                        })
                } else {
                    self.samples[s0..s1]
                        .iter()
                        .fold(Peak::EMPTY, |mut acc, &s| {
                            acc.include(Peak { min: s, max: s });
                            acc
                        })
                };

                if peak.is_empty() {
                    Peak::default()
                } else {
                    peak
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_buckets() {
        // 100 samples, 10 per bucket → 10 buckets
        let samples: Vec<f32> = (0..100).map(|i| (i as f32 / 100.0) * 2.0 - 1.0).collect();
        let wf = Waveform::compute(samples, 10, 44100);
        assert_eq!(wf.buckets.len(), 10);

        // First bucket: samples 0-9 → values -1.0 to -0.82
        assert!(wf.buckets[0].min < -0.8);
        assert!(wf.buckets[0].max < 0.0);

        // Last bucket: samples 90-99 → values 0.8 to 0.98
        assert!(wf.buckets[9].min > 0.7);
        assert!(wf.buckets[9].max > 0.9);
    }

    #[test]
    fn test_waveform_empty() {
        let wf = Waveform::compute(Vec::new(), 100, 48000);
        assert!(wf.buckets.is_empty());
        assert!(wf.peaks(0.0, 1.0, 10).iter().all(|p| *p == Peak::default()));
    }

    #[test]
    fn test_waveform_duration() {
        let samples = vec![0.0f32; 48000]; // 1 second at 48kHz
        let wf = Waveform::compute(samples, 480, 48000);
        assert!((wf.duration_seconds() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_peaks_one_per_pixel() {
        let samples = vec![0.25f32; 48000];
        let wf = Waveform::compute(samples, 256, 48000);
        let peaks = wf.peaks(0.0, 1.0, 300);
        assert_eq!(peaks.len(), 300);
        assert!(peaks.iter().all(|p| p.min == 0.25 && p.max == 0.25));
    }

    #[test]
    fn test_peaks_past_end_are_zero() {
        let samples = vec![0.5f32; 1000];
        let wf = Waveform::compute(samples, 64, 1000);
        let peaks = wf.peaks(0.5, 1.0, 10);
        assert_eq!(peaks[0].max, 0.5);
        assert_eq!(peaks[9], Peak::default());
    }

    #[test]
    fn test_bucket_and_raw_paths_agree() {
        let rate = 8000;
        let samples: Vec<f32> = (0..rate * 4)
            .map(|i| (i as f32 * 0.01).sin() * if i < rate * 2 { 0.3 } else { 0.9 })
            .collect();
        let wf = Waveform::compute(samples, 64, rate as u32);

        // Zoomed out: 32000 samples over 100 px uses buckets.
        let coarse = wf.peaks(0.0, 4.0, 100);
        assert!(coarse[10].max <= 0.3 + 1e-6 && coarse[10].max > 0.25);
        assert!(coarse[90].max > 0.85);

        // Zoomed in: 800 samples over 400 px reads raw samples.
        let fine = wf.peaks(3.0, 0.1, 400);
        assert!(fine.iter().all(|p| p.max <= 0.9 + 1e-6 && p.min >= -0.9 - 1e-6));
    }

    #[test]
    fn test_max_magnitude() {
        let wf = Waveform::compute(vec![0.1, -0.7, 0.4], 2, 10);
        assert!((wf.max_magnitude() - 0.7).abs() < 1e-6);
    }
}
