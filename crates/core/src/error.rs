//! Error types for cwburst core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate { rate: u32 },

    #[error("PCM buffer capacity exceeded: {requested} frames requested, capacity is {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("Unknown waveform: {name}")]
    UnknownWaveform { name: String },
}

/// Result type for cwburst core operations
pub type Result<T> = std::result::Result<T, CoreError>;
