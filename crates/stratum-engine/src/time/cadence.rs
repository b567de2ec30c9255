use std::time::{Duration, Instant};

/// Fallback frame interval when the host has no display-refresh primitive (~60 Hz).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Paces a timer-driven loop.
///
/// The next frame starts no sooner than the previous frame's completion plus the
/// interval. Work time is not subtracted, so the effective rate is at most 60 Hz.
#[derive(Debug, Clone)]
pub struct FrameCadence {
    interval: Duration,
    last_done: Option<Instant>,
}

impl FrameCadence {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_done: None }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Records that a frame's work just finished.
    pub fn mark_done(&mut self) {
        self.last_done = Some(Instant::now());
    }

    /// Time left until the next frame may start.
    pub fn remaining(&self) -> Duration {
        match self.last_done {
            None => Duration::ZERO,
            Some(done) => self.interval.saturating_sub(done.elapsed()),
        }
    }

    /// Blocks the calling thread until the next frame may start.
    pub fn wait(&self) {
        let left = self.remaining();
        if !left.is_zero() {
            std::thread::sleep(left);
        }
    }
}

impl Default for FrameCadence {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}
