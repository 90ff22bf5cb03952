//! Error types for the cwburst engine

use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Render worker unavailable: {msg}")]
    WorkerUnavailable { msg: String },

    #[error("Invalid configuration: {msg}")]
    InvalidConfig { msg: String },

    #[error("Core error: {0}")]
    Core(#[from] cwburst_core::CoreError),

    #[error("Keying error: {0}")]
    Keying(#[from] cwburst_keying::KeyingError),

    #[error("Sink error: {0}")]
    Sink(#[from] cwburst_sink::SinkError),
}

/// Result type for cwburst engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
