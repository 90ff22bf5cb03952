//! Sending-complete flag shared with the input loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Tells the input loop whether audio is still being rendered or played
///
/// Counts outstanding renderings; sending is complete when none remain.
#[derive(Debug, Clone, Default)]
pub struct SendingComplete {
    pending: Arc<AtomicUsize>,
}

impl SendingComplete {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no rendering is queued or playing
    pub fn is_complete(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 0
    }

    /// Renderings not yet finished
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub(crate) fn begin(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn finish(&self) {
        let _ = self
            .pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}
