//! Engine configuration and tunable parameters

use crate::{EngineError, Result};
use cwburst_core::buffer::DEFAULT_MAX_SECONDS;
use cwburst_core::oscillator::Waveform;
use cwburst_keying::timing::KeyingParams;
use cwburst_sink::device::DeviceConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rise/fall time range reachable by interactive adjustment (ms)
pub const RISE_FALL_RANGE: (f64, f64) = (0.1, 10.0);
/// Constant tone range reachable by interactive adjustment (Hz)
pub const TONE_RANGE: (u32, u32) = (150, 1600);
/// Step for speed adjustments (CpM)
pub const SPEED_STEP: u32 = 10;

/// Tone parameters that may change between renderings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub waveform: Waveform,
    pub rise_fall_ms: f64,
    /// Use `tone_frequency` for every rendering instead of a random pitch
    pub constant_tone: bool,
    pub tone_frequency: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            rise_fall_ms: 2.0,
            constant_tone: false,
            tone_frequency: 800,
        }
    }
}

impl Tuning {
    /// Pitch for the next rendering
    ///
    /// Random pitches lie between `sample_rate / 90` and `sample_rate / 50`.
    pub fn pick_frequency<R: Rng + ?Sized>(&self, sample_rate: u32, rng: &mut R) -> u32 {
        if self.constant_tone {
            return self.tone_frequency;
        }
        let r: f64 = rng.gen();
        (sample_rate as f64 / (50.0 + 40.0 * r)) as u32
    }

    /// Frequency used when a fixed pitch is wanted regardless of mode
    pub fn fixed_frequency(&self) -> u32 {
        if self.constant_tone {
            self.tone_frequency
        } else {
            800
        }
    }

    pub fn cycle_waveform(&mut self) {
        self.waveform = self.waveform.next();
    }

    pub fn increase_rise_fall(&mut self) {
        if self.rise_fall_ms + 0.1 <= RISE_FALL_RANGE.1 {
            self.rise_fall_ms += 0.1;
        }
    }

    pub fn decrease_rise_fall(&mut self) {
        if self.rise_fall_ms > RISE_FALL_RANGE.0 {
            self.rise_fall_ms -= 0.1;
        }
    }

    /// Lower the constant tone, switching to random pitch below the range
    pub fn lower_tone(&mut self) {
        if self.tone_frequency >= TONE_RANGE.0 + 10 {
            self.tone_frequency -= 10;
        } else {
            self.constant_tone = false;
        }
    }

    /// Raise the constant tone, switching from random pitch first
    pub fn raise_tone(&mut self) {
        if !self.constant_tone {
            self.constant_tone = true;
        } else if self.tone_frequency < TONE_RANGE.1 {
            self.tone_frequency += 10;
        }
    }

    pub fn toggle_constant_tone(&mut self) {
        self.constant_tone = !self.constant_tone;
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: u32,
    #[serde(flatten)]
    pub tuning: Tuning,
    /// Overall speed in CpM
    pub code_speed: u32,
    /// Minimum character speed in CpM, 0 disables Farnsworth
    pub min_char_speed: u32,
    /// Longest rendering the buffer accepts
    pub max_buffer_seconds: u32,
    pub device: DeviceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            tuning: Tuning::default(),
            code_speed: 200,
            min_char_speed: 0,
            max_buffer_seconds: DEFAULT_MAX_SECONDS,
            device: DeviceConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Check values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(EngineError::InvalidConfig {
                msg: "sample rate must be positive".to_string(),
            });
        }
        if self.code_speed == 0 {
            return Err(EngineError::InvalidConfig {
                msg: "code speed must be positive".to_string(),
            });
        }
        let rise_fall = self.tuning.rise_fall_ms;
        if rise_fall.is_nan() || rise_fall < 0.0 {
            return Err(EngineError::InvalidConfig {
                msg: format!("invalid rise/fall time: {}", self.tuning.rise_fall_ms),
            });
        }
        if self.max_buffer_seconds == 0 {
            return Err(EngineError::InvalidConfig {
                msg: "buffer must hold at least one second".to_string(),
            });
        }
        Ok(())
    }

    pub fn keying(&self) -> KeyingParams {
        KeyingParams::new(self.code_speed, self.min_char_speed)
    }

    pub fn increase_speed(&mut self) {
        self.code_speed += SPEED_STEP;
    }

    pub fn decrease_speed(&mut self) {
        if self.code_speed > SPEED_STEP {
            self.code_speed -= SPEED_STEP;
        }
    }

    pub fn increase_min_char_speed(&mut self) {
        self.min_char_speed += SPEED_STEP;
    }

    pub fn decrease_min_char_speed(&mut self) {
        if self.min_char_speed > SPEED_STEP {
            self.min_char_speed -= SPEED_STEP;
        }
    }
}
