//! Render context: settings, accumulation buffer and output device

use crate::config::{EngineConfig, Tuning};
use crate::status::SendingComplete;
use crate::Result;
use cwburst_core::buffer::PcmBuffer;
use cwburst_core::burst::SignalParams;
use cwburst_core::oscillator::Waveform;
use cwburst_keying::keyer::{MorseKeyer, RenderSummary};
use cwburst_keying::timing::KeyingParams;
use cwburst_sink::device::close_device;
use cwburst_sink::AudioSink;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{debug, info};

/// One "play this text" request
///
/// Fields left as `None` come from the engine's current [`Tuning`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub text: String,
    pub keying: KeyingParams,
    pub frequency: Option<u32>,
    pub waveform: Option<Waveform>,
    pub rise_fall_ms: Option<f64>,
}

impl RenderRequest {
    pub fn new(text: impl Into<String>, keying: KeyingParams) -> Self {
        Self {
            text: text.into(),
            keying,
            frequency: None,
            waveform: None,
            rise_fall_ms: None,
        }
    }

    pub fn with_frequency(mut self, frequency: u32) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = Some(waveform);
        self
    }

    pub fn with_rise_fall_ms(mut self, rise_fall_ms: f64) -> Self {
        self.rise_fall_ms = Some(rise_fall_ms);
        self
    }
}

/// Owns everything one rendering needs
pub struct AudioEngine {
    sample_rate: u32,
    tuning: Tuning,
    buffer: PcmBuffer,
    sink: Box<dyn AudioSink>,
    sending: SendingComplete,
    rng: StdRng,
}

impl AudioEngine {
    /// Create an engine playing through `sink`
    pub fn new(config: &EngineConfig, sink: Box<dyn AudioSink>) -> Result<Self> {
        config.validate()?;
        let buffer = PcmBuffer::new(config.sample_rate, config.max_buffer_seconds, sink.layout())?;

        Ok(Self {
            sample_rate: config.sample_rate,
            tuning: config.tuning,
            buffer,
            sink,
            sending: SendingComplete::new(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Create an engine and open the configured device
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let sink = config.device.open(config.sample_rate)?;
        Self::new(config, sink)
    }

    /// Seed the pitch generator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn tuning_mut(&mut self) -> &mut Tuning {
        &mut self.tuning
    }

    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    /// Flag for the input loop
    pub fn sending_complete(&self) -> SendingComplete {
        self.sending.clone()
    }

    /// Last rendered buffer
    pub fn buffer(&self) -> &PcmBuffer {
        &self.buffer
    }

    pub fn sink(&self) -> &dyn AudioSink {
        self.sink.as_ref()
    }

    fn key(&mut self, request: &RenderRequest, append: bool) -> Result<RenderSummary> {
        let waveform = request.waveform.unwrap_or(self.tuning.waveform);
        let rise_fall_ms = request.rise_fall_ms.unwrap_or(self.tuning.rise_fall_ms);
        let frequency = match request.frequency {
            Some(f) => f,
            None => self.tuning.pick_frequency(self.sample_rate, &mut self.rng),
        };

        let keyer = MorseKeyer::new(SignalParams::new(self.sample_rate, waveform, rise_fall_ms));
        let started = Instant::now();
        let summary = if append {
            keyer.append_text(&mut self.buffer, &request.text, frequency, &request.keying)?
        } else {
            keyer.render_text(&mut self.buffer, &request.text, frequency, &request.keying)?
        };
        debug!(
            "Rendered {:?} in {:?}: {} frames ({:.2} s buffered)",
            request.text,
            started.elapsed(),
            summary.frames,
            self.buffer.duration_secs()
        );
        Ok(summary)
    }

    /// Render `request` into the buffer without playing it
    pub fn render(&mut self, request: &RenderRequest) -> Result<RenderSummary> {
        self.key(request, false)
    }

    /// Render several requests back to back into one buffer
    ///
    /// Each text keeps its own lead-in silence, so consecutive texts stay
    /// apart. Pitch is picked per request.
    pub fn render_sequence(&mut self, requests: &[RenderRequest]) -> Result<Vec<RenderSummary>> {
        self.buffer.clear();
        requests.iter().map(|r| self.key(r, true)).collect()
    }

    /// Render and play, blocking until the device has consumed the buffer
    pub(crate) fn play(&mut self, request: &RenderRequest) -> Result<RenderSummary> {
        let summary = self.render(request)?;
        self.sink.start(&self.buffer)?;
        debug!("Played {:?} on {}", request.text, self.sink.describe());
        Ok(summary)
    }

    /// Render `request`, play it and block until playback completes
    ///
    /// The sending-complete flag is cleared for the duration of the call.
    pub fn render_and_play(&mut self, request: &RenderRequest) -> Result<RenderSummary> {
        self.sending.begin();
        let result = self.play(request);
        self.sending.finish();
        result
    }

    /// Render `requests` as one buffer, play it and block until done
    pub fn render_and_play_sequence(
        &mut self,
        requests: &[RenderRequest],
    ) -> Result<Vec<RenderSummary>> {
        self.sending.begin();
        let result = self.render_sequence(requests).and_then(|summaries| {
            self.sink.start(&self.buffer)?;
            Ok(summaries)
        });
        self.sending.finish();
        result
    }

    /// Stop output and release the device
    pub fn close(self) -> Result<()> {
        info!("Closing audio engine");
        close_device(self.sink)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use cwburst_core::CoreError;
    use cwburst_keying::KeyingError;
    use cwburst_sink::push::NullSink;
    use cwburst_core::buffer::ChannelLayout;

    fn engine() -> AudioEngine {
        let config = EngineConfig::default();
        AudioEngine::new(&config, Box::new(NullSink::new(ChannelLayout::PackedStereo))).unwrap()
    }

    #[test]
    fn test_buffer_follows_sink_layout() {
        let config = EngineConfig::default();
        let engine = AudioEngine::new(&config, Box::new(NullSink::new(ChannelLayout::Mono))).unwrap();
        assert_eq!(engine.buffer().layout(), ChannelLayout::Mono);
        assert_eq!(engine.buffer().capacity(), 44100 * 20);
    }

    #[test]
    fn test_request_overrides_tuning() {
        let mut engine = engine();
        let request = RenderRequest::new("E", KeyingParams::new(200, 0))
            .with_frequency(700)
            .with_waveform(Waveform::Silence)
            .with_rise_fall_ms(0.0);
        let summary = engine.render(&request).unwrap();
        assert_eq!(summary.frequency, 700);
        assert_eq!(summary.timing.edge, 0);
        assert!(engine.buffer().samples().all(|s| s == 0));
    }

    #[test]
    fn test_seeded_pitch_is_repeatable() {
        let request = RenderRequest::new("K", KeyingParams::default());
        let a = engine().with_seed(7).render(&request).unwrap().frequency;
        let b = engine().with_seed(7).render(&request).unwrap().frequency;
        assert_eq!(a, b);
    }

    #[test]
    fn test_sending_flag_restored_after_error() {
        let mut engine = engine();
        let flag = engine.sending_complete();
        let request = RenderRequest::new("E", KeyingParams::new(0, 0));
        let err = engine.render_and_play(&request).unwrap_err();
        assert!(matches!(err, EngineError::Keying(KeyingError::InvalidSpeed { .. })));
        assert!(flag.is_complete());
    }

    #[test]
    fn test_overlong_text_is_reported() {
        let config = EngineConfig {
            max_buffer_seconds: 1,
            ..EngineConfig::default()
        };
        let mut engine =
            AudioEngine::new(&config, Box::new(NullSink::new(ChannelLayout::Mono))).unwrap();
        let request = RenderRequest::new("CQ CQ CQ DE TEST TEST", KeyingParams::new(100, 0));
        let err = engine.render_and_play(&request).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Keying(KeyingError::Core(CoreError::CapacityExceeded { .. }))
        ));
    }

    #[test]
    fn test_sequence_keeps_texts_apart() {
        let keying = KeyingParams::new(200, 0);
        let requests = [
            RenderRequest::new("CQ", keying).with_frequency(600),
            RenderRequest::new("DE", keying).with_frequency(600),
        ];

        let mut single = engine();
        single.render(&requests[0]).unwrap();
        let cq = single.buffer().frames().to_vec();
        single.render(&requests[1]).unwrap();
        let de = single.buffer().frames().to_vec();

        let mut engine = engine();
        let summaries = engine.render_and_play_sequence(&requests).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].frames + summaries[1].frames, engine.buffer().len());
        assert_eq!(engine.buffer().frames(), [cq, de].concat().as_slice());
        assert!(engine.sending_complete().is_complete());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            sample_rate: 0,
            ..EngineConfig::default()
        };
        let result = AudioEngine::new(&config, Box::new(NullSink::default()));
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }
}
