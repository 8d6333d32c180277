//! Persistent user preferences.

use autosplit_core::{Result, SplitterError};
use autosplit_media::{AudioCodec, EncodeParams};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings saved between runs as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Track count requested from automatic detection.
    pub track_count: usize,
    pub codec: AudioCodec,
    /// MP3 bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Explicit ffmpeg binary; `PATH` is searched when unset.
    pub ffmpeg_path: Option<PathBuf>,
    pub last_output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            track_count: 2,
            codec: AudioCodec::Mp3,
            bitrate_kbps: 192,
            ffmpeg_path: None,
            last_output_dir: None,
        }
    }
}

impl Settings {
    pub const MIN_TRACKS: usize = 2;
    pub const MAX_TRACKS: usize = 99;

    /// Encoder parameters for the configured format.
    pub fn encode_params(&self) -> EncodeParams {
        match self.codec {
            AudioCodec::Mp3 => EncodeParams::mp3(self.bitrate_kbps),
            AudioCodec::Flac => EncodeParams::flac(),
        }
    }

    /// Clamp values a hand-edited file could have put out of range.
    fn sanitized(mut self) -> Self {
        self.track_count = self.track_count.clamp(Self::MIN_TRACKS, Self::MAX_TRACKS);
        if !EncodeParams::BITRATES.contains(&self.bitrate_kbps) {
            self.bitrate_kbps = Self::default().bitrate_kbps;
        }
        self
    }

    /// Save the settings to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SplitterError::Settings(format!("Failed to serialize settings: {e}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str::<Self>(&json)
            .map(Self::sanitized)
            .map_err(|e| SplitterError::Settings(format!("Failed to parse settings: {e}")))
    }

    /// Load, falling back to defaults when the file is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                info!(path = %path.display(), "Loaded settings");
                settings
            }
            Err(SplitterError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), "Using default settings: {e}");
                Self::default()
            }
        }
    }

    /// Default settings file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("autosplit")
            .join("settings.json")
    }
}
