//! Keyframe animation.
//!
//! - [`AnimationBuilder`] collects per-property keyframe tracks for one target.
//! - [`AnimationScheduler`] owns the active controllers and runs the two-phase tick.
//! - [`Accessor`] is how controllers read and write a target inside the scheduler's
//!   context; [`RecordTarget`] reaches records of a `SceneStore`.
//! - [`TimerLoop`] drives ticks when the host has no display-refresh callback.

mod builder;
mod controller;
mod easing;
mod interpolate;
mod scheduler;
mod target;
mod timer_loop;

pub use builder::AnimationBuilder;
pub use easing::{Easing, UnknownEasing};
pub use interpolate::interpolate;
pub use scheduler::{AnimationScheduler, GroupId};
pub use target::{Accessor, MapTarget, RecordTarget};
pub use timer_loop::TimerLoop;
