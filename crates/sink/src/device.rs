//! Device selection and lifetime

use crate::push::{NullSink, PushSink};
use crate::wav::WavSink;
use crate::{AudioSink, Result, SinkError};
use cwburst_core::buffer::ChannelLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Default raw output device
pub const DEFAULT_RAW_DEVICE: &str = "/dev/dsp";

/// Which output to open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeviceConfig {
    /// Character device or file taking raw interleaved stereo s16le
    Raw { path: PathBuf },
    /// WAV file, rewritten per rendering
    Wav { path: PathBuf },
    /// Platform audio output, optionally selected by name
    Cpal {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    /// Discard audio
    Null,
}

impl Default for DeviceConfig {
    /// The platform's default output when built with `cpal`
    #[cfg(feature = "cpal")]
    fn default() -> Self {
        DeviceConfig::Cpal { name: None }
    }

    /// The raw OSS device otherwise
    #[cfg(not(feature = "cpal"))]
    fn default() -> Self {
        DeviceConfig::Raw {
            path: PathBuf::from(DEFAULT_RAW_DEVICE),
        }
    }
}

impl fmt::Display for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceConfig::Raw { path } => write!(f, "{}", path.display()),
            DeviceConfig::Wav { path } => write!(f, "{}", path.display()),
            DeviceConfig::Cpal { name: Some(name) } => write!(f, "cpal:{}", name),
            DeviceConfig::Cpal { name: None } => f.write_str("cpal"),
            DeviceConfig::Null => f.write_str("null"),
        }
    }
}

impl FromStr for DeviceConfig {
    type Err = SinkError;

    /// `null`, `cpal`, `cpal:<name>`, `*.wav` or a raw device path
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(DeviceConfig::default());
        }
        if s == "null" {
            return Ok(DeviceConfig::Null);
        }
        if s == "cpal" {
            return Ok(DeviceConfig::Cpal { name: None });
        }
        if let Some(name) = s.strip_prefix("cpal:") {
            return Ok(DeviceConfig::Cpal {
                name: Some(name.to_string()),
            });
        }
        if s.to_lowercase().ends_with(".wav") {
            return Ok(DeviceConfig::Wav { path: PathBuf::from(s) });
        }
        Ok(DeviceConfig::Raw { path: PathBuf::from(s) })
    }
}

impl DeviceConfig {
    /// Frame layout the device expects
    pub fn layout(&self) -> ChannelLayout {
        match self {
            DeviceConfig::Raw { .. } | DeviceConfig::Cpal { .. } => ChannelLayout::PackedStereo,
            DeviceConfig::Wav { .. } | DeviceConfig::Null => ChannelLayout::Mono,
        }
    }

    /// Open the device
    pub fn open(&self, sample_rate: u32) -> Result<Box<dyn AudioSink>> {
        let layout = self.layout();
        let sink: Box<dyn AudioSink> = match self {
            DeviceConfig::Raw { path } => {
                let file = OpenOptions::new()
                    .write(true)
                    .open(path)
                    .map_err(|e| SinkError::DeviceUnavailable {
                        device: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                let tail = sample_rate as usize / 2;
                Box::new(PushSink::new(file, layout, path.display().to_string()).with_tail(tail))
            }
            DeviceConfig::Wav { path } => Box::new(WavSink::new(path.clone(), layout)),
            DeviceConfig::Null => Box::new(NullSink::new(layout)),
            DeviceConfig::Cpal { name } => open_cpal(name.as_deref(), sample_rate, layout)?,
        };

        info!("Opened audio device {}", sink.describe());
        Ok(sink)
    }
}

#[cfg(feature = "cpal")]
fn open_cpal(name: Option<&str>, sample_rate: u32, layout: ChannelLayout) -> Result<Box<dyn AudioSink>> {
    Ok(Box::new(crate::cpal_output::open_cpal(name, sample_rate, layout)?))
}

#[cfg(not(feature = "cpal"))]
fn open_cpal(name: Option<&str>, _sample_rate: u32, _layout: ChannelLayout) -> Result<Box<dyn AudioSink>> {
    Err(SinkError::UnsupportedDevice {
        name: format!("cpal:{} (built without the cpal feature)", name.unwrap_or("default")),
    })
}

/// Open an output by name or path, see [`DeviceConfig::from_str`]
pub fn open_device(name_or_path: &str, sample_rate: u32) -> Result<Box<dyn AudioSink>> {
    name_or_path.parse::<DeviceConfig>()?.open(sample_rate)
}

/// Stop and release a device
pub fn close_device(mut sink: Box<dyn AudioSink>) -> Result<()> {
    let name = sink.describe();
    sink.close()?;
    info!("Closed audio device {}", name);
    Ok(())
}
