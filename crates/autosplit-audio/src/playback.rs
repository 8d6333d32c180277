//! Audio preview through the default output device.
//!
//! The cpal callback reads straight from the decoded buffer. Position lives in
//! an atomic so the UI can draw the playhead without taking the lock.

use autosplit_core::{DecodedAudio, Result, SplitterError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

struct Shared {
    audio: Mutex<Arc<DecodedAudio>>,
    /// Playback position in seconds, stored as f64 bits.
    position: AtomicU64,
    playing: AtomicBool,
}

impl Shared {
    fn position(&self) -> f64 {
        f64::from_bits(self.position.load(Ordering::Acquire))
    }

    fn set_position(&self, seconds: f64) {
        self.position.store(seconds.to_bits(), Ordering::Release);
    }

    /// Move the position from `from` to `to` unless a seek landed in between.
    fn advance_position(&self, from: f64, to: f64) -> bool {
        self.position
            .compare_exchange(
                from.to_bits(),
                to.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Plays the loaded file from the current position.
pub struct Player {
    shared: Arc<Shared>,
    _stream: cpal::Stream,
}

impl Player {
    /// Open the default output device.
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| SplitterError::Audio("No audio output device available".into()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| SplitterError::Audio(format!("No default output config: {e}")))?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(SplitterError::Audio(format!(
                "Unsupported output sample format: {:?}",
                supported.sample_format()
            )));
        }

        let config: cpal::StreamConfig = supported.into();
        let device_rate = config.sample_rate.0;
        let out_channels = config.channels as usize;
        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate = device_rate,
            channels = out_channels,
            "Opened audio output"
        );

        let shared = Arc::new(Shared {
            audio: Mutex::new(Arc::new(DecodedAudio::default())),
            position: AtomicU64::new(0f64.to_bits()),
            playing: AtomicBool::new(false),
        });

        let cb_shared = Arc::clone(&shared);
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if !cb_shared.playing.load(Ordering::Acquire) {
                        data.fill(0.0);
                        return;
                    }
                    let Some(audio) = cb_shared.audio.try_lock().map(|guard| Arc::clone(&*guard)) else {
                        data.fill(0.0);
                        return;
                    };
                    let start = cb_shared.position();
                    let mut position = start;
                    let still_playing =
                        render_frames(&audio, &mut position, device_rate, data, out_channels);
                    // A seek from the UI during render keeps its position.
                    if !cb_shared.advance_position(start, position) {
                        return;
                    }
                    if !still_playing {
                        cb_shared.playing.store(false, Ordering::Release);
                    }
                },
                |err| error!("Audio stream error: {err}"),
                None,
            )
            .map_err(|e| SplitterError::Audio(format!("Failed to build output stream: {e}")))?;

        stream
            .play()
            .map_err(|e| SplitterError::Audio(format!("Failed to start output stream: {e}")))?;

        Ok(Self {
            shared,
            _stream: stream,
        })
    }

    /// Swap in a new file; playback stops and rewinds.
    pub fn load(&self, audio: Arc<DecodedAudio>) {
        self.shared.playing.store(false, Ordering::Release);
        *self.shared.audio.lock() = audio;
        self.shared.set_position(0.0);
    }

    pub fn play(&self) {
        let duration = self.shared.audio.lock().duration();
        if duration <= 0.0 {
            warn!("Nothing loaded to play");
            return;
        }
        if self.shared.position() >= duration {
            self.shared.set_position(0.0);
        }
        self.shared.playing.store(true, Ordering::Release);
    }

    pub fn pause(&self) {
        self.shared.playing.store(false, Ordering::Release);
    }

    /// Toggle play/pause. Returns the new playing state.
    pub fn toggle(&self) -> bool {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.is_playing()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }

    /// Current position in seconds.
    pub fn position(&self) -> f64 {
        self.shared.position()
    }

    /// Move the play position, clamped to the loaded file.
    pub fn seek(&self, seconds: f64) {
        let duration = self.shared.audio.lock().duration();
        self.shared.set_position(seconds.clamp(0.0, duration.max(0.0)));
    }
}

/// Fill an interleaved output buffer from `audio` starting at `position`.
///
/// Source frames are stepped at `source_rate / device_rate` with no
/// interpolation. Output channels past the source count repeat the last
/// source channel. Returns false once the end of the audio is reached; the
/// remainder of `out` is silence.
pub fn render_frames(
    audio: &DecodedAudio,
    position: &mut f64,
    device_rate: u32,
    out: &mut [f32],
    out_channels: usize,
) -> bool {
    let src_channels = audio.channel_count();
    let frames = audio.frame_count();
    if out_channels == 0 || device_rate == 0 || src_channels == 0 || audio.sample_rate == 0 {
        out.fill(0.0);
        return false;
    }

    let step = 1.0 / device_rate as f64;
    let rate = audio.sample_rate as f64;
    let mut playing = true;

    for frame in out.chunks_mut(out_channels) {
        let index = (*position * rate) as usize;
        if !playing || index >= frames {
            playing = false;
            frame.fill(0.0);
            continue;
        }
        for (ch, sample) in frame.iter_mut().enumerate() {
            *sample = audio.channels[ch.min(src_channels - 1)][index];
        }
        *position += step;
    }

    if playing && (*position * rate) as usize >= frames {
        playing = false;
    }
    playing
}
