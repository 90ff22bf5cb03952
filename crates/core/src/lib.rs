//! cwburst Core - tone synthesis primitives
//!
//! This crate provides the waveform oscillator, the rise/fall envelope,
//! the PCM accumulation buffer and the burst generator used to key
//! Morse code into click-free audio.

pub mod buffer;
pub mod burst;
pub mod envelope;
pub mod oscillator;
pub mod error;

pub use error::{CoreError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        buffer::{ChannelLayout, PcmBuffer},
        burst::{BurstGenerator, SignalParams, PEAK_AMPLITUDE},
        envelope::Envelope,
        oscillator::Waveform,
        error::{CoreError, Result},
    };
}
