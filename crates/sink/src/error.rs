//! Error types for cwburst sinks

use thiserror::Error;

/// Sink error types
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Audio device '{device}' unavailable: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("Playback already in progress")]
    Busy,

    #[error("Audio stream error: {msg}")]
    Stream { msg: String },

    #[error("Unsupported device: {name}")]
    UnsupportedDevice { name: String },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cwburst sink operations
pub type Result<T> = std::result::Result<T, SinkError>;
