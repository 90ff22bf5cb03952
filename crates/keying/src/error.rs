//! Error types for cwburst keying

use thiserror::Error;

/// Keying error types
#[derive(Error, Debug)]
pub enum KeyingError {
    #[error("Invalid code speed: {cpm} CpM")]
    InvalidSpeed { cpm: u32 },

    #[error("Core error: {0}")]
    Core(#[from] cwburst_core::CoreError),
}

/// Result type for cwburst keying operations
pub type Result<T> = std::result::Result<T, KeyingError>;
