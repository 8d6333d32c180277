//! Decoded PCM audio held by a session.

/// Planar f32 samples for every channel of a decoded file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedAudio {
    /// Source sample rate in Hz.
    pub sample_rate: u32,
    /// One sample vector per channel, all the same length.
    pub channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Wrap planar channel data.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Build from interleaved samples.
    pub fn from_interleaved(sample_rate: u32, channel_count: usize, interleaved: &[f32]) -> Self {
        let channel_count = channel_count.max(1);
        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (ch, &s) in frame.iter().enumerate() {
                channels[ch].push(s);
            }
        }
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Average all channels into one mono track.
    pub fn mixdown(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            n => {
                let scale = 1.0 / n as f32;
                (0..self.frame_count())
                    .map(|i| self.channels.iter().map(|c| c[i]).sum::<f32>() * scale)
                    .collect()
            }
        }
    }
}
