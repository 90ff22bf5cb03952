//! Tone and silence burst generation

use crate::buffer::PcmBuffer;
use crate::envelope::Envelope;
use crate::oscillator::Waveform;
use crate::Result;
use tracing::trace;

/// Peak output amplitude, leaving headroom below 16-bit full scale
pub const PEAK_AMPLITUDE: f64 = 32500.0;

/// Signal parameters shared by all bursts of one rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalParams {
    pub sample_rate: u32,
    pub waveform: Waveform,
    pub rise_fall_ms: f64,
}

impl SignalParams {
    pub fn new(sample_rate: u32, waveform: Waveform, rise_fall_ms: f64) -> Self {
        Self {
            sample_rate,
            waveform,
            rise_fall_ms: rise_fall_ms.max(0.0),
        }
    }

    /// Edge length in samples
    pub fn edge_samples(&self) -> usize {
        crate::envelope::edge_samples(self.sample_rate, self.rise_fall_ms)
    }
}

/// Synthesizes bursts of tone or silence into a [`PcmBuffer`]
#[derive(Debug, Clone)]
pub struct BurstGenerator {
    sample_rate: u32,
    envelope: Envelope,
}

impl BurstGenerator {
    pub fn new(params: &SignalParams) -> Self {
        Self {
            sample_rate: params.sample_rate,
            envelope: Envelope::new(params.edge_samples()),
        }
    }

    /// Edge length in samples
    pub fn edge(&self) -> usize {
        self.envelope.edge()
    }

    /// Compute the output sample at index `x` of a burst of length `len`
    pub fn sample_at(&self, x: usize, len: usize, frequency: u32, waveform: Waveform) -> i16 {
        let val = waveform.sample(x, frequency, self.sample_rate);
        let val = self.envelope.apply(val, x, len);
        // Square reaches -1.5 where sin() is exactly -1
        (val * PEAK_AMPLITUDE).clamp(-PEAK_AMPLITUDE, PEAK_AMPLITUDE) as i16
    }

    /// Append one burst of `length` samples to `buffer`
    ///
    /// The burst covers indices `0..length - 1`, so `length - 1` frames are
    /// written. A frequency of zero or [`Waveform::Silence`] yields silence.
    /// Fails without writing anything if the buffer cannot hold the burst.
    pub fn render_burst(
        &self,
        buffer: &mut PcmBuffer,
        frequency: u32,
        length: usize,
        waveform: Waveform,
    ) -> Result<usize> {
        let count = length.saturating_sub(1);
        let waveform = if frequency == 0 { Waveform::Silence } else { waveform };
        trace!(frequency, length, %waveform, "burst");

        buffer.extend_samples((0..count).map(|x| self.sample_at(x, length, frequency, waveform)))?;
        Ok(count)
    }

    /// Append a silence burst of `length` samples
    pub fn render_silence(&self, buffer: &mut PcmBuffer, length: usize) -> Result<usize> {
        self.render_burst(buffer, 0, length, Waveform::Silence)
    }
}
