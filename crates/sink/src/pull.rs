//! Pull sinks driven by a hardware callback
//!
//! The hardware output unit calls [`Playback::fill`] from its own real-time
//! thread whenever it needs frames. The thread that started playback sleeps
//! on a condition variable until the callback reports that the buffer has
//! been exhausted.
//!
//! Phases: `Idle -> Playing -> Draining -> Idle`. `Playing` copies frames
//! and moves the cursor. Once the cursor hits the end the phase becomes
//! `Draining`; the next callback outputs silence and signals completion.
//! The starting thread then stops the unit and returns the state to `Idle`.
//!
//! Phase, cursor and completion live in atomics. The callback never waits
//! on a lock: it only try-locks the frame slot, and takes the signal mutex
//! once per buffer to notify the waiter.

use crate::{AudioSink, Result, SinkError};
use cwburst_core::buffer::{ChannelLayout, PcmBuffer};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, TryLockError};
use tracing::{debug, trace};

const IDLE: u8 = 0;
const LOADING: u8 = 1;
const PLAYING: u8 = 2;
const DRAINING: u8 = 3;

/// Playback phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Playing,
    Draining,
}

/// What the callback should do after a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// Nothing loaded, output is silence
    Idle,
    /// Audio is still flowing
    Playing,
    /// Buffer fully played; the unit may be stopped
    Exhausted,
}

/// Buffer, cursor and completion signal shared with the hardware callback
#[derive(Debug)]
pub struct Playback {
    frames: Mutex<Arc<[i32]>>,
    cursor: AtomicUsize,
    phase: AtomicU8,
    completed: AtomicBool,
    completions: AtomicU64,
    signal: Mutex<()>,
    finished: Condvar,
}

impl Playback {
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(Arc::from(Vec::new())),
            cursor: AtomicUsize::new(0),
            phase: AtomicU8::new(IDLE),
            completed: AtomicBool::new(false),
            completions: AtomicU64::new(0),
            signal: Mutex::new(()),
            finished: Condvar::new(),
        }
    }

    /// New playback behind an `Arc`, ready to hand to a callback
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // A panicking callback must not wedge the worker
    fn lock_frames(&self) -> MutexGuard<'_, Arc<[i32]>> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_signal(&self) -> MutexGuard<'_, ()> {
        self.signal.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Load frames for playback: `Idle -> Playing`
    pub fn load(&self, frames: Arc<[i32]>) -> Result<()> {
        if self
            .phase
            .compare_exchange(IDLE, LOADING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SinkError::Busy);
        }
        *self.lock_frames() = frames;
        self.cursor.store(0, Ordering::Relaxed);
        self.completed.store(false, Ordering::Relaxed);
        self.phase.store(PLAYING, Ordering::Release);
        Ok(())
    }

    /// Hardware callback body
    ///
    /// Copies up to `out.len()` frames at the cursor and zero-fills the
    /// rest. Never waits; if the frame slot is momentarily held elsewhere
    /// the period is silence and the cursor stays put.
    pub fn fill(&self, out: &mut [i32]) -> FillStatus {
        match self.phase.load(Ordering::Acquire) {
            PLAYING => {
                let frames = match self.frames.try_lock() {
                    Ok(frames) => frames,
                    Err(TryLockError::Poisoned(e)) => e.into_inner(),
                    Err(TryLockError::WouldBlock) => {
                        out.fill(0);
                        return FillStatus::Playing;
                    }
                };
                let start = self.cursor.load(Ordering::Relaxed);
                let n = out.len().min(frames.len() - start);
                out[..n].copy_from_slice(&frames[start..start + n]);
                out[n..].fill(0);
                self.cursor.store(start + n, Ordering::Relaxed);
                if start + n == frames.len() {
                    self.phase.store(DRAINING, Ordering::Release);
                }
                FillStatus::Playing
            }
            DRAINING => {
                out.fill(0);
                if self
                    .completed
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    self.completions.fetch_add(1, Ordering::AcqRel);
                    let _signal = self.lock_signal();
                    self.finished.notify_all();
                }
                FillStatus::Exhausted
            }
            _ => {
                out.fill(0);
                FillStatus::Idle
            }
        }
    }

    /// Block until the callback signals completion
    pub fn wait(&self) {
        let guard = self.lock_signal();
        let _guard = self
            .finished
            .wait_while(guard, |_| !self.completed.load(Ordering::Acquire))
            .unwrap_or_else(|e| e.into_inner());
    }

    /// Return to `Idle` after the unit has been stopped
    pub fn finish(&self) {
        *self.lock_frames() = Arc::from(Vec::new());
        self.cursor.store(0, Ordering::Relaxed);
        self.phase.store(IDLE, Ordering::Release);
    }

    pub fn phase(&self) -> PlaybackPhase {
        match self.phase.load(Ordering::Acquire) {
            IDLE => PlaybackPhase::Idle,
            DRAINING => PlaybackPhase::Draining,
            _ => PlaybackPhase::Playing,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }

    /// Number of completion signals sent so far
    pub fn completions(&self) -> u64 {
        self.completions.load(Ordering::Acquire)
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}

/// Hardware output unit that calls back into a [`Playback`]
pub trait OutputUnit {
    /// Start invoking the callback
    fn start(&mut self) -> Result<()>;

    /// Stop invoking the callback
    fn stop(&mut self) -> Result<()>;

    /// Device description
    fn describe(&self) -> String {
        "output unit".to_string()
    }
}

/// Sink that plays through a callback-driven [`OutputUnit`]
pub struct PullSink<U: OutputUnit> {
    unit: U,
    playback: Arc<Playback>,
    layout: ChannelLayout,
}

impl<U: OutputUnit> PullSink<U> {
    /// `unit` must call back into `playback`
    pub fn new(unit: U, playback: Arc<Playback>, layout: ChannelLayout) -> Self {
        Self {
            unit,
            playback,
            layout,
        }
    }

    pub fn playback(&self) -> &Arc<Playback> {
        &self.playback
    }

    pub fn unit(&self) -> &U {
        &self.unit
    }
}

impl<U: OutputUnit> AudioSink for PullSink<U> {
    fn layout(&self) -> ChannelLayout {
        self.layout
    }

    fn start(&mut self, buffer: &PcmBuffer) -> Result<()> {
        self.playback.load(Arc::from(buffer.frames()))?;
        debug!(frames = buffer.len(), "pull playback started");

        if let Err(e) = self.unit.start() {
            self.playback.finish();
            return Err(e);
        }

        // No timeout: a unit that never calls back blocks here for good
        self.playback.wait();
        trace!("pull playback exhausted");

        let stopped = self.unit.stop();
        self.playback.finish();
        stopped
    }

    fn stop(&mut self) -> Result<()> {
        self.unit.stop()
    }

    fn describe(&self) -> String {
        format!("pull:{}", self.unit.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    /// Calls back from a separate thread in blocks of `block` frames
    struct ThreadUnit {
        playback: Arc<Playback>,
        block: usize,
        collected: Arc<Mutex<Vec<i32>>>,
        stops: Arc<AtomicUsize>,
        handle: Option<thread::JoinHandle<()>>,
    }

    impl ThreadUnit {
        fn new(playback: Arc<Playback>, block: usize) -> Self {
            Self {
                playback,
                block,
                collected: Arc::new(Mutex::new(Vec::new())),
                stops: Arc::new(AtomicUsize::new(0)),
                handle: None,
            }
        }
    }

    impl OutputUnit for ThreadUnit {
        fn start(&mut self) -> Result<()> {
            let playback = Arc::clone(&self.playback);
            let collected = Arc::clone(&self.collected);
            let block = self.block;
            self.handle = Some(thread::spawn(move || {
                let mut out = vec![0i32; block];
                loop {
                    let status = playback.fill(&mut out);
                    collected.lock().unwrap().extend_from_slice(&out);
                    if status == FillStatus::Exhausted {
                        break;
                    }
                }
            }));
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = self.handle.take() {
                handle.join().unwrap();
            }
            Ok(())
        }
    }

    /// Never calls back
    struct DeadUnit;

    impl OutputUnit for DeadUnit {
        fn start(&mut self) -> Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn buffer(len: usize) -> PcmBuffer {
        let mut buf = PcmBuffer::with_capacity(8000, len, ChannelLayout::Mono).unwrap();
        buf.extend_samples((1..=len as i16).collect::<Vec<_>>().into_iter()).unwrap();
        buf
    }

    #[test]
    fn test_fill_state_machine() {
        let playback = Playback::new();
        let mut out = [9i32; 4];
        assert_eq!(playback.fill(&mut out), FillStatus::Idle);
        assert_eq!(out, [0; 4]);

        playback.load(Arc::from(vec![1, 2, 3, 4, 5, 6])).unwrap();
        assert_eq!(playback.phase(), PlaybackPhase::Playing);
        assert_eq!(playback.fill(&mut out), FillStatus::Playing);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(playback.fill(&mut out), FillStatus::Playing);
        assert_eq!(out, [5, 6, 0, 0]);
        assert_eq!(playback.phase(), PlaybackPhase::Draining);
        assert_eq!(playback.completions(), 0);

        assert_eq!(playback.fill(&mut out), FillStatus::Exhausted);
        assert_eq!(out, [0; 4]);
        assert_eq!(playback.completions(), 1);

        // Extra callbacks before the unit stops do not signal again
        assert_eq!(playback.fill(&mut out), FillStatus::Exhausted);
        assert_eq!(playback.completions(), 1);

        playback.finish();
        assert_eq!(playback.phase(), PlaybackPhase::Idle);
    }

    #[test]
    fn test_fill_does_not_wait_for_frame_slot() {
        let playback = Playback::new();
        playback.load(Arc::from(vec![1, 2, 3])).unwrap();

        let held = playback.frames.lock().unwrap();
        let mut out = [9i32; 2];
        assert_eq!(playback.fill(&mut out), FillStatus::Playing);
        assert_eq!(out, [0, 0]);
        assert_eq!(playback.cursor(), 0);
        drop(held);

        assert_eq!(playback.fill(&mut out), FillStatus::Playing);
        assert_eq!(out, [1, 2]);
        assert_eq!(playback.cursor(), 2);
    }

    #[test]
    fn test_exact_block_multiple() {
        let playback = Playback::new();
        playback.load(Arc::from(vec![1, 2, 3, 4])).unwrap();
        let mut out = [0i32; 4];
        assert_eq!(playback.fill(&mut out), FillStatus::Playing);
        assert_eq!(playback.phase(), PlaybackPhase::Draining);
        assert_eq!(playback.fill(&mut out), FillStatus::Exhausted);
    }

    #[test]
    fn test_empty_buffer_still_completes() {
        let playback = Playback::new();
        playback.load(Arc::from(Vec::new())).unwrap();
        let mut out = [0i32; 2];
        assert_eq!(playback.fill(&mut out), FillStatus::Playing);
        assert_eq!(playback.fill(&mut out), FillStatus::Exhausted);
        assert_eq!(playback.completions(), 1);
    }

    #[test]
    fn test_load_while_playing_is_busy() {
        let playback = Playback::new();
        playback.load(Arc::from(vec![1])).unwrap();
        assert!(matches!(playback.load(Arc::from(vec![2])), Err(SinkError::Busy)));
    }

    #[test]
    fn test_pull_sink_plays_whole_buffer() {
        let playback = Playback::shared();
        let unit = ThreadUnit::new(Arc::clone(&playback), 7);
        let collected = Arc::clone(&unit.collected);
        let stops = Arc::clone(&unit.stops);
        let mut sink = PullSink::new(unit, playback, ChannelLayout::Mono);

        let buf = buffer(50);
        sink.start(&buf).unwrap();

        let played = collected.lock().unwrap().clone();
        assert_eq!(&played[..50], buf.frames());
        assert!(played[50..].iter().all(|&f| f == 0));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(sink.playback().completions(), 1);
        assert_eq!(sink.playback().phase(), PlaybackPhase::Idle);

        // Released once per buffer
        sink.start(&buf).unwrap();
        assert_eq!(sink.playback().completions(), 2);
    }

    #[test]
    fn test_start_blocks_without_callbacks() {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut sink = PullSink::new(DeadUnit, Playback::shared(), ChannelLayout::Mono);
            let result = sink.start(&buffer(10));
            let _ = tx.send(result.is_ok());
        });
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
