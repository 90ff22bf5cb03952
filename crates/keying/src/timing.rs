//! Keying speed and element timing
//!
//! Speeds are in CpM (characters per minute, 5 per word). One dot at
//! `cpm` lasts `6 / cpm` seconds, so at 200 CpM (40 WPM) a dot is 30 ms.

use crate::{KeyingError, Result};
use serde::{Deserialize, Serialize};

/// Convert CpM to WPM
pub fn cpm_to_wpm(cpm: u32) -> u32 {
    cpm / 5
}

/// Convert WPM to CpM
pub fn wpm_to_cpm(wpm: u32) -> u32 {
    wpm * 5
}

/// Dot length in samples for a speed in CpM
pub fn dot_samples(sample_rate: u32, cpm: u32) -> Result<usize> {
    if cpm == 0 {
        return Err(KeyingError::InvalidSpeed { cpm });
    }
    Ok((sample_rate as u64 * 6 / cpm as u64) as usize)
}

/// Requested keying speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyingParams {
    /// Overall speed in CpM
    pub code_speed: u32,
    /// Minimum character speed in CpM, 0 disables Farnsworth spacing
    pub min_char_speed: u32,
}

impl KeyingParams {
    pub fn new(code_speed: u32, min_char_speed: u32) -> Self {
        Self {
            code_speed,
            min_char_speed,
        }
    }

    /// Characters are keyed faster than the overall speed
    pub fn farnsworth(&self) -> bool {
        self.code_speed < self.min_char_speed
    }

    /// Speed at which the elements of a character are keyed
    pub fn char_speed(&self) -> u32 {
        if self.farnsworth() {
            self.min_char_speed
        } else {
            self.code_speed
        }
    }

    /// Derive sample timing for a rendering
    pub fn timing(&self, sample_rate: u32, edge: usize) -> Result<Timing> {
        let char_speed = self.char_speed();
        let dot = dot_samples(sample_rate, char_speed)?;

        let (farnsworth, char_gap) = if self.farnsworth() {
            let fw_dot = dot_samples(sample_rate, self.code_speed)?;
            (true, (3 * fw_dot).saturating_sub(dot))
        } else {
            (false, 2 * dot)
        };

        Ok(Timing {
            char_speed,
            farnsworth,
            dot,
            dash: 3 * dot,
            edge,
            char_gap,
            lead_in: sample_rate as usize / 4,
        })
    }
}

impl Default for KeyingParams {
    fn default() -> Self {
        Self::new(200, 0)
    }
}

/// Burst lengths in samples for one rendering
///
/// Tones are lengthened by `edge` and the following element gap is
/// shortened by the same amount, keeping the element period intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub char_speed: u32,
    pub farnsworth: bool,
    pub dot: usize,
    pub dash: usize,
    pub edge: usize,
    /// Silence appended after the last element gap of a character
    pub char_gap: usize,
    /// Silence before the first character
    pub lead_in: usize,
}

impl Timing {
    pub fn dot_tone(&self) -> usize {
        self.dot + self.edge
    }

    pub fn dash_tone(&self) -> usize {
        self.dash + self.edge
    }

    /// Gap after every dot or dash
    pub fn element_gap(&self) -> usize {
        self.dot.saturating_sub(self.edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_standard_timing() {
        let t = KeyingParams::new(200, 0).timing(44100, 88).unwrap();
        assert!(!t.farnsworth);
        assert_eq!(t.char_speed, 200);
        assert_eq!(t.dot, 1323);
        assert_eq!(t.dash, 3969);
        assert_eq!(t.char_gap, 2646);
        assert_eq!(t.lead_in, 11025);
        assert_eq!(t.dot_tone(), 1411);
        assert_eq!(t.element_gap(), 1235);
    }

    #[test]
    fn test_farnsworth_timing() {
        let params = KeyingParams::new(100, 300);
        assert!(params.farnsworth());
        let t = params.timing(48000, 0).unwrap();
        assert!(t.farnsworth);
        assert_eq!(t.char_speed, 300);
        assert_eq!(t.dot, 960);
        // 3 * (48000 * 6 / 100) - 960
        assert_eq!(t.char_gap, 3 * 2880 - 960);
    }

    #[test]
    fn test_equal_speeds_are_not_farnsworth() {
        assert!(!KeyingParams::new(250, 250).farnsworth());
    }

    #[test]
    fn test_zero_speed_rejected() {
        assert!(matches!(
            KeyingParams::new(0, 0).timing(44100, 0),
            Err(KeyingError::InvalidSpeed { cpm: 0 })
        ));
    }

    #[test]
    fn test_wpm_conversion() {
        assert_eq!(cpm_to_wpm(200), 40);
        assert_eq!(wpm_to_cpm(25), 125);
    }

    #[test]
    fn test_edge_longer_than_dot() {
        let t = KeyingParams::new(2000, 0).timing(8000, 100).unwrap();
        assert_eq!(t.dot, 24);
        assert_eq!(t.element_gap(), 0);
    }

    #[quickcheck]
    fn prop_standard_dot_length(code: u16, min: u16) -> bool {
        let code = code as u32 + 1;
        let min = min as u32 % (code + 1);
        let t = KeyingParams::new(code, min).timing(44100, 0).unwrap();
        !t.farnsworth && t.dot == (44100 * 6 / code) as usize && t.dash == 3 * t.dot
    }

    #[quickcheck]
    fn prop_farnsworth_uses_both_speeds(code: u16, extra: u16) -> bool {
        let code = code as u32 + 1;
        let min = code + extra as u32 + 1;
        let t = KeyingParams::new(code, min).timing(44100, 0).unwrap();
        let fw_dot = (44100 * 6 / code) as usize;
        t.farnsworth
            && t.dot == (44100 * 6 / min) as usize
            && t.char_gap == 3 * fw_dot - t.dot
    }
}
