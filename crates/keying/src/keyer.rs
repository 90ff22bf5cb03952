//! Morse keying engine
//!
//! Turns text into a sequence of tone and silence bursts with exact sample
//! timing and accumulates them into a [`PcmBuffer`].

use crate::code::{code_for, Symbol};
use crate::timing::{KeyingParams, Timing};
use crate::Result;
use cwburst_core::buffer::PcmBuffer;
use cwburst_core::burst::{BurstGenerator, SignalParams};
use tracing::debug;

/// Outcome of one text rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSummary {
    pub characters: usize,
    pub frames: usize,
    pub frequency: u32,
    pub timing: Timing,
}

/// Keys text into PCM
#[derive(Debug, Clone)]
pub struct MorseKeyer {
    signal: SignalParams,
    generator: BurstGenerator,
}

impl MorseKeyer {
    /// Create a keyer for the given signal parameters
    pub fn new(signal: SignalParams) -> Self {
        Self {
            generator: BurstGenerator::new(&signal),
            signal,
        }
    }

    pub fn signal(&self) -> &SignalParams {
        &self.signal
    }

    /// Timing a rendering with `params` would use
    pub fn timing(&self, params: &KeyingParams) -> Result<Timing> {
        params.timing(self.signal.sample_rate, self.generator.edge())
    }

    /// Render `text` into `buffer`, replacing its previous contents
    ///
    /// Characters outside the code table are sent as the unknown-character
    /// code. On error the buffer holds a partial rendering and must not be
    /// played.
    pub fn render_text(
        &self,
        buffer: &mut PcmBuffer,
        text: &str,
        frequency: u32,
        params: &KeyingParams,
    ) -> Result<RenderSummary> {
        buffer.clear();
        self.append_text(buffer, text, frequency, params)
    }

    /// Render `text` after whatever `buffer` already holds
    ///
    /// Each call starts with its own lead-in silence, which separates texts
    /// keyed back to back. `frames` in the summary counts only this text.
    pub fn append_text(
        &self,
        buffer: &mut PcmBuffer,
        text: &str,
        frequency: u32,
        params: &KeyingParams,
    ) -> Result<RenderSummary> {
        let timing = self.timing(params)?;
        let waveform = self.signal.waveform;
        let gen = &self.generator;

        debug!(
            text,
            frequency,
            dot = timing.dot,
            edge = timing.edge,
            farnsworth = timing.farnsworth,
            "rendering"
        );

        let start = buffer.len();
        gen.render_silence(buffer, timing.lead_in)?;

        let mut characters = 0;
        for ch in text.chars() {
            for symbol in code_for(ch).symbols() {
                let tone = match symbol {
                    Symbol::Dot => timing.dot_tone(),
                    Symbol::Dash => timing.dash_tone(),
                };
                gen.render_burst(buffer, frequency, tone, waveform)?;
                gen.render_silence(buffer, timing.element_gap())?;
            }
            gen.render_silence(buffer, timing.char_gap)?;
            characters += 1;
        }

        let frames = buffer.len() - start;
        debug!(characters, frames, "rendered");
        Ok(RenderSummary {
            characters,
            frames,
            frequency,
            timing,
        })
    }
}
