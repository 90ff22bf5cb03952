//! Push sinks: one blocking write per buffer

use crate::{AudioSink, Result};
use cwburst_core::buffer::{ChannelLayout, PcmBuffer};
use std::io::Write;
use tracing::debug;

/// Writes signed 16-bit little-endian PCM to a device handle
///
/// The write returns once the device has accepted all data. A tail of
/// silence follows each buffer so the device FIFO plays out the last
/// element before the next rendering.
pub struct PushSink<W: Write> {
    writer: W,
    layout: ChannelLayout,
    tail_frames: usize,
    name: String,
}

impl<W: Write> PushSink<W> {
    pub fn new(writer: W, layout: ChannelLayout, name: impl Into<String>) -> Self {
        Self {
            writer,
            layout,
            tail_frames: 0,
            name: name.into(),
        }
    }

    /// Append `frames` frames of silence after every buffer
    pub fn with_tail(mut self, frames: usize) -> Self {
        self.tail_frames = frames;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn encode(&self, buffer: &PcmBuffer) -> Vec<u8> {
        let frame_bytes = self.layout.channels() as usize * 2;
        let mut bytes = Vec::with_capacity((buffer.len() + self.tail_frames) * frame_bytes);

        for &frame in buffer.frames() {
            match self.layout {
                ChannelLayout::Mono => bytes.extend_from_slice(&(frame as i16).to_le_bytes()),
                ChannelLayout::PackedStereo => bytes.extend_from_slice(&frame.to_le_bytes()),
            }
        }
        bytes.resize(bytes.len() + self.tail_frames * frame_bytes, 0);
        bytes
    }
}

impl<W: Write> AudioSink for PushSink<W> {
    fn layout(&self) -> ChannelLayout {
        self.layout
    }

    fn start(&mut self, buffer: &PcmBuffer) -> Result<()> {
        let bytes = self.encode(buffer);
        debug!(device = %self.name, bytes = bytes.len(), "push write");
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("push:{}", self.name)
    }
}

/// Discards audio, completing immediately
#[derive(Debug, Default)]
pub struct NullSink {
    layout: ChannelLayout,
    plays: usize,
    frames: usize,
}

impl NullSink {
    pub fn new(layout: ChannelLayout) -> Self {
        Self {
            layout,
            plays: 0,
            frames: 0,
        }
    }

    /// Number of buffers played
    pub fn plays(&self) -> usize {
        self.plays
    }

    /// Total frames consumed
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl AudioSink for NullSink {
    fn layout(&self) -> ChannelLayout {
        self.layout
    }

    fn start(&mut self, buffer: &PcmBuffer) -> Result<()> {
        self.plays += 1;
        self.frames += buffer.len();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "null".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(layout: ChannelLayout) -> PcmBuffer {
        let mut buf = PcmBuffer::with_capacity(8000, 16, layout).unwrap();
        buf.extend_samples([1i16, -2, 300].into_iter()).unwrap();
        buf
    }

    #[test]
    fn test_stereo_write_is_interleaved() {
        let mut sink = PushSink::new(Vec::new(), ChannelLayout::PackedStereo, "mem");
        sink.start(&buffer(ChannelLayout::PackedStereo)).unwrap();
        let out = sink.into_inner();
        assert_eq!(out.len(), 12);
        assert_eq!(&out[0..4], &[1, 0, 1, 0]);
        assert_eq!(&out[4..8], &[0xFE, 0xFF, 0xFE, 0xFF]);
        assert_eq!(i16::from_le_bytes([out[8], out[9]]), 300);
        assert_eq!(i16::from_le_bytes([out[10], out[11]]), 300);
    }

    #[test]
    fn test_mono_write_with_tail() {
        let mut sink = PushSink::new(Vec::new(), ChannelLayout::Mono, "mem").with_tail(4);
        sink.start(&buffer(ChannelLayout::Mono)).unwrap();
        let out = sink.into_inner();
        assert_eq!(out.len(), 3 * 2 + 4 * 2);
        assert_eq!(i16::from_le_bytes([out[2], out[3]]), -2);
        assert!(out[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_null_sink_counts() {
        let mut sink = NullSink::new(ChannelLayout::Mono);
        sink.start(&buffer(ChannelLayout::Mono)).unwrap();
        sink.start(&buffer(ChannelLayout::Mono)).unwrap();
        assert_eq!(sink.plays(), 2);
        assert_eq!(sink.frames(), 6);
    }
}
