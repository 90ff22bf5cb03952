//! cwburst Sink - audio output
//!
//! A sink takes a finished [`PcmBuffer`], plays it and returns only once the
//! whole buffer has been consumed. Two families exist: push sinks do one
//! blocking write, pull sinks hand the buffer to a hardware callback and
//! wait for it to report exhaustion.

pub mod device;
pub mod pull;
pub mod push;
pub mod wav;
pub mod error;

#[cfg(feature = "cpal")]
pub mod cpal_output;

use cwburst_core::buffer::{ChannelLayout, PcmBuffer};

pub use error::{SinkError, Result};

/// Platform audio output
pub trait AudioSink {
    /// Frame layout this sink expects in the buffer
    fn layout(&self) -> ChannelLayout;

    /// Play `buffer`, blocking until it has been fully consumed
    fn start(&mut self, buffer: &PcmBuffer) -> Result<()>;

    /// Stop output
    fn stop(&mut self) -> Result<()>;

    /// Release the device
    fn close(&mut self) -> Result<()> {
        self.stop()
    }

    /// Human readable device description
    fn describe(&self) -> String;
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn layout(&self) -> ChannelLayout {
        (**self).layout()
    }

    fn start(&mut self, buffer: &PcmBuffer) -> Result<()> {
        (**self).start(buffer)
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        device::{close_device, open_device, DeviceConfig},
        pull::{FillStatus, OutputUnit, Playback, PlaybackPhase, PullSink},
        push::{NullSink, PushSink},
        wav::WavSink,
        error::{SinkError, Result},
        AudioSink,
    };
}
