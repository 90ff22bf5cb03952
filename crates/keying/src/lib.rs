//! cwburst Keying - Morse code table and keying engine
//!
//! This crate maps text to dot/dash sequences and keys them into PCM with
//! standard or Farnsworth timing.

pub mod code;
pub mod keyer;
pub mod timing;
pub mod error;

pub use error::{KeyingError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        code::{code_for, lookup, Code, Symbol, UNKNOWN_CODE},
        keyer::{MorseKeyer, RenderSummary},
        timing::{cpm_to_wpm, wpm_to_cpm, KeyingParams, Timing},
        error::{KeyingError, Result},
    };
}
