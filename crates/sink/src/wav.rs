//! WAV file sink

use crate::{AudioSink, Result};
use cwburst_core::buffer::{ChannelLayout, PcmBuffer};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes each played buffer to a 16-bit PCM WAV file
///
/// Every `start` replaces the file, so the file holds the last rendering.
pub struct WavSink {
    path: PathBuf,
    layout: ChannelLayout,
}

impl WavSink {
    pub fn new(path: impl Into<PathBuf>, layout: ChannelLayout) -> Self {
        Self {
            path: path.into(),
            layout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AudioSink for WavSink {
    fn layout(&self) -> ChannelLayout {
        self.layout
    }

    fn start(&mut self, buffer: &PcmBuffer) -> Result<()> {
        let spec = hound::WavSpec {
            channels: self.layout.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(&self.path, spec)?;
        for &frame in buffer.frames() {
            let (left, right) = self.layout.split(frame);
            writer.write_sample(left)?;
            if self.layout == ChannelLayout::PackedStereo {
                writer.write_sample(right)?;
            }
        }
        writer.finalize()?;

        info!("Wrote {} frames to {:?}", buffer.len(), self.path);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("wav:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_wav_round_trip() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut sink = WavSink::new(temp_file.path(), ChannelLayout::PackedStereo);

        let mut buf = PcmBuffer::with_capacity(44100, 8, ChannelLayout::PackedStereo).unwrap();
        buf.extend_samples([0i16, 1000, -1000].into_iter()).unwrap();
        sink.start(&buf).unwrap();

        let mut reader = hound::WavReader::open(temp_file.path()).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44100);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 0, 1000, 1000, -1000, -1000]);
    }
}
