//! cwburst Engine - render context and playback worker
//!
//! Ties the keyer to an output device. [`AudioEngine`] renders one text at
//! a time into its buffer and plays it synchronously; [`RenderWorker`] owns
//! an engine on a dedicated thread so callers can queue requests and keep
//! handling input while audio plays.

pub mod config;
pub mod engine;
pub mod status;
pub mod worker;
pub mod error;

pub use config::{EngineConfig, Tuning};
pub use engine::{AudioEngine, RenderRequest};
pub use error::{EngineError, Result};
pub use status::SendingComplete;
pub use worker::{PendingRender, RenderWorker};

pub use cwburst_core::oscillator::Waveform;
pub use cwburst_keying::keyer::RenderSummary;
pub use cwburst_keying::timing::KeyingParams;
pub use cwburst_sink::device::DeviceConfig;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        config::{EngineConfig, Tuning, RISE_FALL_RANGE, SPEED_STEP, TONE_RANGE},
        engine::{AudioEngine, RenderRequest},
        error::{EngineError, Result},
        status::SendingComplete,
        worker::{PendingRender, RenderWorker},
        DeviceConfig, KeyingParams, RenderSummary, Waveform,
    };
}
