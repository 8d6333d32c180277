//! Error types for Autosplit.

use thiserror::Error;

/// Main error type for Autosplit operations.
#[derive(Error, Debug)]
pub enum SplitterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Silence detection failed: {0}")]
    Detection(String),

    #[error("Audio device error: {0}")]
    Audio(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    /// A segment failed during a batch export. `index` is zero-based.
    #[error("Export of track {} failed: {message}", index + 1)]
    Export { index: usize, message: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl SplitterError {
    /// Short category label for status lines.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Decode(_) => "decode",
            Self::Detection(_) => "detection",
            Self::Audio(_) => "audio",
            Self::Encoder(_) | Self::Export { .. } => "export",
            Self::InvalidParameter(_) => "parameter",
            Self::NotFound(_) => "not-found",
            Self::Settings(_) => "settings",
        }
    }
}

/// Result type alias for Autosplit operations.
pub type Result<T> = std::result::Result<T, SplitterError>;
