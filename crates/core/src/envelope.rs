//! Rise/fall shaping of tone bursts
//!
//! Both edges follow a sin² curve over `edge` samples. The rising and
//! falling conditions are evaluated independently, so on a burst shorter
//! than two edges both apply to the samples in the overlap. Keep the edge
//! well below half of the shortest burst to get a clean shape.

use std::f64::consts::PI;

/// Convert a rise/fall time in milliseconds to a length in samples
pub fn edge_samples(sample_rate: u32, rise_fall_ms: f64) -> usize {
    if rise_fall_ms <= 0.0 {
        return 0;
    }
    (sample_rate as f64 * (rise_fall_ms / 1000.0)) as usize
}

/// Edge shaper for one burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    edge: usize,
}

impl Envelope {
    /// Create an envelope with the given edge length in samples
    pub fn new(edge: usize) -> Self {
        Self { edge }
    }

    /// Create an envelope from a rise/fall time
    pub fn from_millis(sample_rate: u32, rise_fall_ms: f64) -> Self {
        Self::new(edge_samples(sample_rate, rise_fall_ms))
    }

    /// Edge length in samples
    pub fn edge(&self) -> usize {
        self.edge
    }

    /// Gain at sample `x` of a burst of nominal length `len`
    pub fn gain(&self, x: usize, len: usize) -> f64 {
        if self.edge == 0 {
            return 1.0;
        }

        let ed = self.edge as f64;
        let x_f = x as f64;
        let mut gain = 1.0;

        if x < self.edge {
            gain *= (PI * x_f / (2.0 * ed)).sin().powi(2);
        }

        let fall_start = len as i64 - self.edge as i64;
        if (x as i64) > fall_start {
            let pos = (x as i64 - fall_start) as f64 + ed;
            gain *= (2.0 * PI * pos / (4.0 * ed)).sin().powi(2);
        }

        gain
    }

    /// Apply the envelope to a raw oscillator value
    pub fn apply(&self, value: f64, x: usize, len: usize) -> f64 {
        value * self.gain(x, len)
    }
}
