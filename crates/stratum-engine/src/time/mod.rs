//! Time subsystem.
//!
//! - [`TimeSource`] gives the animation scheduler its millisecond timestamps;
//!   [`ManualClock`] makes ticks deterministic in tests.
//! - [`FrameClock`] produces per-frame delta snapshots.
//! - [`FrameCadence`] paces timer-driven frame loops.

mod cadence;
mod clock;
mod frame_clock;

pub use cadence::{FrameCadence, DEFAULT_FRAME_INTERVAL};
pub use clock::{ManualClock, MonotonicClock, TimeSource};
pub use frame_clock::{FrameClock, FrameTime};
