use std::time::Duration;

use log::{debug, trace};

use crate::time::{FrameCadence, DEFAULT_FRAME_INTERVAL};

use super::AnimationScheduler;

/// Drives [`AnimationScheduler::update`] from a sleeping timer, for hosts without a
/// display-refresh callback.
#[derive(Debug, Clone)]
pub struct TimerLoop {
    cadence: FrameCadence,
}

impl TimerLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            cadence: FrameCadence::new(interval),
        }
    }

    pub fn interval(&self) -> Duration {
        self.cadence.interval()
    }

    /// Ticks while the scheduler is running and `keep_going` agrees. Returns the number
    /// of frames run.
    ///
    /// `keep_going` sees the context after each frame; returning `false` ends the loop
    /// without stopping the scheduler.
    pub fn run<C>(
        &mut self,
        scheduler: &mut AnimationScheduler<C>,
        ctx: &mut C,
        mut keep_going: impl FnMut(&C) -> bool,
    ) -> u64 {
        let mut frames = 0;
        while scheduler.is_running() {
            self.cadence.wait();
            let frame = scheduler.update(ctx);
            trace!("frame {} after {:.1} ms", frame.frame_index, frame.dt_ms);
            self.cadence.mark_done();
            frames += 1;
            if !keep_going(ctx) {
                break;
            }
        }
        debug!("timer loop ran {frames} frames");
        frames
    }
}

impl Default for TimerLoop {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}
