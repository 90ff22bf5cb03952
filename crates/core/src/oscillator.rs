//! Periodic waveform generation
//!
//! The oscillator is stateless: every sample is computed from its index
//! since the start of the burst, so a burst always starts at phase zero.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Waveform kinds supported by the tone generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Silence,
    #[default]
    Sine,
    Sawtooth,
    Square,
}

impl Waveform {
    /// Compute one sample at index `x` of a burst
    ///
    /// Sine is in [-1, 1]; sawtooth and square are centred on zero with a
    /// peak of 0.5.
    pub fn sample(self, x: usize, frequency: u32, sample_rate: u32) -> f64 {
        let cycles = frequency as f64 * x as f64 / sample_rate as f64;
        match self {
            Waveform::Silence => 0.0,
            Waveform::Sine => (2.0 * PI * cycles).sin(),
            Waveform::Sawtooth => (cycles - cycles.floor()) - 0.5,
            Waveform::Square => (2.0 * PI * cycles).sin().ceil() - 0.5,
        }
    }

    /// Next audible waveform in the cycle Sine -> Sawtooth -> Square -> Sine
    pub fn next(self) -> Self {
        match self {
            Waveform::Sine => Waveform::Sawtooth,
            Waveform::Sawtooth => Waveform::Square,
            Waveform::Square | Waveform::Silence => Waveform::Sine,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Silence => "silence",
            Waveform::Sine => "sine",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Square => "square",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "silence" | "none" | "0" => Ok(Waveform::Silence),
            "sine" | "1" => Ok(Waveform::Sine),
            "sawtooth" | "saw" | "2" => Ok(Waveform::Sawtooth),
            "square" | "3" => Ok(Waveform::Square),
            _ => Err(CoreError::UnknownWaveform { name: s.to_string() }),
        }
    }
}
