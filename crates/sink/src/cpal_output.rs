//! Hardware output through cpal

use crate::pull::{OutputUnit, Playback, PullSink};
use crate::{Result, SinkError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use cwburst_core::buffer::ChannelLayout;
use std::sync::Arc;
use tracing::{error, info};

/// Frames pulled from the playback per block inside the callback
const CALLBACK_BLOCK: usize = 512;

/// cpal output stream acting as the hardware output unit
pub struct CpalOutput {
    stream: cpal::Stream,
    name: String,
}

impl CpalOutput {
    /// Open an output device and build a stream that calls into `playback`
    ///
    /// `device_name` selects the first device whose name contains it;
    /// `None` uses the host default.
    pub fn open(
        device_name: Option<&str>,
        sample_rate: u32,
        layout: ChannelLayout,
        playback: Arc<Playback>,
    ) -> Result<Self> {
        let host = cpal::default_host();
        let device = select_output_device(&host, device_name)?;
        let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        let unavailable = |reason: String| SinkError::DeviceUnavailable {
            device: name.clone(),
            reason,
        };

        let supported = device
            .supported_output_configs()
            .map_err(|e| unavailable(e.to_string()))?
            .filter(|cfg| cfg.channels() >= layout.channels())
            .filter(|cfg| {
                matches!(
                    cfg.sample_format(),
                    cpal::SampleFormat::I16 | cpal::SampleFormat::F32
                )
            })
            .find(|cfg| {
                cfg.min_sample_rate().0 <= sample_rate && cfg.max_sample_rate().0 >= sample_rate
            })
            .ok_or_else(|| unavailable(format!("no output config at {} Hz", sample_rate)))?
            .with_sample_rate(cpal::SampleRate(sample_rate));

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let stream = match sample_format {
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, layout, playback),
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, layout, playback),
            other => return Err(unavailable(format!("unsupported sample format {:?}", other))),
        }
        .map_err(|e| unavailable(e.to_string()))?;

        // Streams may start running on creation
        stream.pause().map_err(|e| SinkError::Stream { msg: e.to_string() })?;

        info!(
            device = %name,
            sample_rate,
            channels = config.channels,
            "Opened audio output"
        );
        Ok(Self { stream, name })
    }
}

impl OutputUnit for CpalOutput {
    fn start(&mut self) -> Result<()> {
        self.stream
            .play()
            .map_err(|e| SinkError::Stream { msg: e.to_string() })
    }

    fn stop(&mut self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| SinkError::Stream { msg: e.to_string() })
    }

    fn describe(&self) -> String {
        format!("cpal:{}", self.name)
    }
}

/// Open the platform output as a pull sink
pub fn open_cpal(
    device_name: Option<&str>,
    sample_rate: u32,
    layout: ChannelLayout,
) -> Result<PullSink<CpalOutput>> {
    let playback = Playback::shared();
    let unit = CpalOutput::open(device_name, sample_rate, layout, Arc::clone(&playback))?;
    Ok(PullSink::new(unit, playback, layout))
}

fn build_stream<S>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    layout: ChannelLayout,
    playback: Arc<Playback>,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    S: SizedSample + FromSample<i16>,
{
    let channels = config.channels as usize;
    let mut scratch = [0i32; CALLBACK_BLOCK];

    device.build_output_stream(
        config,
        move |data: &mut [S], _: &cpal::OutputCallbackInfo| {
            for block in data.chunks_mut(CALLBACK_BLOCK * channels) {
                let frames = block.len() / channels;
                playback.fill(&mut scratch[..frames]);
                for (out, &frame) in block.chunks_mut(channels).zip(&scratch[..frames]) {
                    let (left, right) = layout.split(frame);
                    for (ch, slot) in out.iter_mut().enumerate() {
                        *slot = S::from_sample(if ch == 1 { right } else { left });
                    }
                }
            }
        },
        |err| error!("audio stream error: {}", err),
        None,
    )
}

fn select_output_device(host: &cpal::Host, device_name: Option<&str>) -> Result<cpal::Device> {
    if let Some(wanted) = device_name {
        let devices = host.output_devices().map_err(|e| SinkError::DeviceUnavailable {
            device: wanted.to_string(),
            reason: e.to_string(),
        })?;
        for dev in devices {
            let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
            if name.contains(wanted) {
                return Ok(dev);
            }
        }
        return Err(SinkError::DeviceUnavailable {
            device: wanted.to_string(),
            reason: "no output device matched".to_string(),
        });
    }

    host.default_output_device()
        .ok_or_else(|| SinkError::DeviceUnavailable {
            device: "default".to_string(),
            reason: "no default output device available".to_string(),
        })
}
