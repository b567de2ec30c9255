use super::TimeSource;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the previous tick, clamped.
    pub dt_ms: f64,
    /// Timestamp of this tick in the source's time base.
    pub now_ms: f64,
    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing [`FrameTime`] snapshots from a [`TimeSource`].
///
/// Delta time is clamped so a debugger pause or a long stall does not surface as a
/// pathological frame delta.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    frame_index: u64,
    dt_min_ms: f64,
    dt_max_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(0.1, 250.0)
    }

    pub fn with_clamps(dt_min_ms: f64, dt_max_ms: f64) -> Self {
        debug_assert!(dt_min_ms <= dt_max_ms);
        Self { last_ms: None, frame_index: 0, dt_min_ms, dt_max_ms }
    }

    /// Forgets the previous tick; the next delta is reported as the minimum.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Advances the clock and returns a new [`FrameTime`].
    pub fn tick(&mut self, source: &dyn TimeSource) -> FrameTime {
        let now_ms = source.now_ms();
        let raw = self.last_ms.map_or(0.0, |last| now_ms - last);
        let dt_ms = raw.clamp(self.dt_min_ms, self.dt_max_ms);
        self.last_ms = Some(now_ms);

        let ft = FrameTime { dt_ms, now_ms, frame_index: self.frame_index };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
