//! PCM accumulation buffer

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Default maximum buffer length in seconds
pub const DEFAULT_MAX_SECONDS: u32 = 20;

/// How generated samples are laid out in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelLayout {
    /// One 16-bit sample per frame
    Mono,
    /// The mono sample duplicated into both halves of a 32-bit frame
    #[default]
    PackedStereo,
}

impl ChannelLayout {
    /// Number of output channels
    pub fn channels(self) -> u16 {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::PackedStereo => 2,
        }
    }

    /// Build a frame from one mono sample
    pub fn frame(self, sample: i16) -> i32 {
        match self {
            ChannelLayout::Mono => sample as i32,
            ChannelLayout::PackedStereo => pack_stereo(sample, sample),
        }
    }

    /// Split a frame into (left, right) samples
    pub fn split(self, frame: i32) -> (i16, i16) {
        match self {
            ChannelLayout::Mono => (frame as i16, frame as i16),
            ChannelLayout::PackedStereo => unpack_stereo(frame),
        }
    }
}

/// Pack two 16-bit samples into one 32-bit frame, left in the low half
pub fn pack_stereo(left: i16, right: i16) -> i32 {
    ((left as u16 as u32) | ((right as u16 as u32) << 16)) as i32
}

/// Inverse of [`pack_stereo`]
pub fn unpack_stereo(frame: i32) -> (i16, i16) {
    let bits = frame as u32;
    (bits as u16 as i16, (bits >> 16) as u16 as i16)
}

/// Fixed-capacity buffer of PCM frames
///
/// Frames are appended by the burst generator and read back by a sink.
/// Pushing past the capacity fails instead of growing.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    frames: Vec<i32>,
    capacity: usize,
    sample_rate: u32,
    layout: ChannelLayout,
}

impl PcmBuffer {
    /// Create a buffer holding at most `max_seconds` of audio
    pub fn new(sample_rate: u32, max_seconds: u32, layout: ChannelLayout) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }
        let capacity = sample_rate as usize * max_seconds as usize;
        Self::with_capacity(sample_rate, capacity, layout)
    }

    /// Create a buffer with an explicit frame capacity
    pub fn with_capacity(sample_rate: u32, capacity: usize, layout: ChannelLayout) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }
        Ok(Self {
            frames: Vec::new(),
            capacity,
            sample_rate,
            layout,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the channel layout
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Maximum number of frames
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames still available before the capacity is reached
    pub fn remaining(&self) -> usize {
        self.capacity - self.frames.len()
    }

    /// Playback duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }

    /// Get a reference to the underlying frames
    pub fn frames(&self) -> &[i32] {
        &self.frames
    }

    /// Left channel (or the mono channel) as 16-bit samples
    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        let layout = self.layout;
        self.frames.iter().map(move |&f| layout.split(f).0)
    }

    /// Clear the buffer, keeping its allocation
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Make sure `additional` more frames fit
    pub fn ensure_room(&mut self, additional: usize) -> Result<()> {
        let requested = self.frames.len() + additional;
        if requested > self.capacity {
            return Err(CoreError::CapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }
        self.frames.reserve(additional);
        Ok(())
    }

    /// Append one mono sample, laid out according to the buffer's layout
    pub fn push_sample(&mut self, sample: i16) -> Result<()> {
        self.ensure_room(1)?;
        self.frames.push(self.layout.frame(sample));
        Ok(())
    }

    /// Append mono samples in bulk
    pub fn extend_samples<I>(&mut self, samples: I) -> Result<()>
    where
        I: ExactSizeIterator<Item = i16>,
    {
        self.ensure_room(samples.len())?;
        let layout = self.layout;
        self.frames.extend(samples.map(|s| layout.frame(s)));
        Ok(())
    }
}

impl Index<usize> for PcmBuffer {
    type Output = i32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}
