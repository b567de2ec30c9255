use std::rc::Rc;

use crate::scene::Value;

use super::interpolate::interpolate;
use super::{Accessor, Easing, GroupId};

/// What one [`Controller::step`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// Still inside its delay.
    Pending,
    Frame,
    /// Reached the end and rescheduled itself.
    Restart,
    /// Reached the end for good.
    Done,
}

/// Interpolates one property between two adjacent keyframes.
///
/// Runs from `start + delay` for `life` ms. A looping controller is rescheduled
/// whole periods of `life + gap` later, so all segments of one track share the
/// track's period.
pub(crate) struct Controller<C> {
    pub(crate) group: GroupId,
    accessor: Rc<dyn Accessor<C>>,
    key: String,
    prev: Value,
    next: Value,

    start: f64,
    delay: f64,
    life: f64,
    gap: f64,
    looping: bool,
    easing: Easing,

    pub(crate) removed: bool,
    pub(crate) finished: bool,
}

pub(crate) struct Segment {
    pub key: String,
    pub prev: Value,
    pub next: Value,
    pub delay: f64,
    pub life: f64,
    pub gap: f64,
    pub easing: Easing,
}

impl<C> Controller<C> {
    pub(crate) fn new(
        group: GroupId,
        accessor: Rc<dyn Accessor<C>>,
        segment: Segment,
        start: f64,
        looping: bool,
    ) -> Self {
        Self {
            group,
            accessor,
            key: segment.key,
            prev: segment.prev,
            next: segment.next,
            start,
            delay: segment.delay,
            life: segment.life.max(0.0),
            gap: segment.gap.max(0.0),
            looping,
            easing: segment.easing,
            removed: false,
            finished: false,
        }
    }

    /// Advances to `now`, writing the interpolated value and running `during`
    /// callbacks with the eased progress.
    ///
    /// The final frame is applied at progress 1 before completion is reported.
    pub(crate) fn step(&mut self, ctx: &mut C, now: f64, during: &mut [Box<dyn FnMut(&mut C, f64)>]) -> Step {
        let elapsed = now - self.start - self.delay;
        if elapsed < 0.0 {
            return Step::Pending;
        }
        let progress = if self.life <= 0.0 { 1.0 } else { (elapsed / self.life).min(1.0) };
        let eased = self.easing.apply(progress);

        let current = self.accessor.get(ctx, &self.key);
        if let Some(value) = interpolate(&self.prev, &self.next, eased, current.as_ref()) {
            self.accessor.set(ctx, &self.key, value);
        }
        for f in during.iter_mut() {
            f(ctx, eased);
        }

        if progress < 1.0 {
            Step::Frame
        } else if self.looping {
            self.rephase(now);
            Step::Restart
        } else {
            self.finished = true;
            Step::Done
        }
    }

    /// Moves `start` forward by whole periods to the earliest window that has not
    /// yet ended at `now`. A stalled clock skips the missed cycles instead of
    /// replaying them one tick at a time.
    fn rephase(&mut self, now: f64) {
        let period = self.life + self.gap;
        if period <= 0.0 {
            self.start = now - self.delay;
            return;
        }
        let cycles = ((now - self.start - self.delay) / period).floor().max(0.0);
        self.start += cycles * period;
        if now - self.start - self.delay >= self.life {
            self.start += period;
        }
    }
}
