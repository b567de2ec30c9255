use std::fmt;

use log::{debug, info};
use slotmap::{new_key_type, SlotMap};

use crate::time::{FrameClock, FrameTime, TimeSource};

use super::controller::{Controller, Step};
use super::{Accessor, AnimationBuilder};

new_key_type! {
    /// Handle to the controllers spawned by one [`AnimationBuilder::start`].
    pub struct GroupId;
}

pub(crate) type DuringFn<C> = Box<dyn FnMut(&mut C, f64)>;
pub(crate) type DoneFn<C> = Box<dyn FnOnce(&mut AnimationScheduler<C>, &mut C)>;

pub(crate) struct Group<C> {
    pub(crate) remaining: usize,
    pub(crate) during: Vec<DuringFn<C>>,
    pub(crate) done: Vec<DoneFn<C>>,
}

/// Keyframe animation scheduler over a context `C`.
///
/// Each [`update`](Self::update) runs one tick in two phases: every controller writes its
/// interpolated value, then the stage callback runs once, then the pool is rebuilt and
/// the `done` callbacks of groups whose last controller finished are fired. A `done`
/// callback receives the scheduler and may start new animations.
pub struct AnimationScheduler<C> {
    clock: Box<dyn TimeSource>,
    frame_clock: FrameClock,

    pub(crate) pool: Vec<Controller<C>>,
    pub(crate) groups: SlotMap<GroupId, Group<C>>,
    /// Groups started without any controller; they complete on the next tick.
    pub(crate) pending_empty: Vec<GroupId>,

    stage: Option<Box<dyn FnMut(&mut C)>>,
    on_frame: Option<Box<dyn FnMut(&mut C)>>,
    running: bool,
}

impl<C> AnimationScheduler<C> {
    pub fn new(clock: Box<dyn TimeSource>) -> Self {
        Self {
            clock,
            frame_clock: FrameClock::new(),
            pool: Vec::new(),
            groups: SlotMap::with_key(),
            pending_empty: Vec::new(),
            stage: None,
            on_frame: None,
            running: false,
        }
    }

    /// Called once per tick, after all property writes, when any controller is active.
    pub fn set_stage(&mut self, stage: impl FnMut(&mut C) + 'static) -> &mut Self {
        self.stage = Some(Box::new(stage));
        self
    }

    /// Called at the very end of every tick.
    pub fn set_on_frame(&mut self, on_frame: impl FnMut(&mut C) + 'static) -> &mut Self {
        self.on_frame = Some(Box::new(on_frame));
        self
    }

    /// Starts a builder for `accessor`. Nothing is scheduled until
    /// [`AnimationBuilder::start`].
    pub fn animate(&self, accessor: impl Accessor<C> + 'static, looping: bool) -> AnimationBuilder<C> {
        AnimationBuilder::new(accessor, looping)
    }

    pub fn now(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn start(&mut self) {
        if !self.running {
            debug!("animation scheduler started");
            self.frame_clock.reset();
            self.running = true;
        }
    }

    /// Halts future ticks. Values already written stay as they are.
    pub fn stop(&mut self) {
        if self.running {
            debug!("animation scheduler stopped");
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Drops every controller and group without firing `done`.
    pub fn clear(&mut self) {
        if !self.pool.is_empty() || !self.groups.is_empty() {
            info!("clearing {} controllers in {} groups", self.pool.len(), self.groups.len());
        }
        self.pool.clear();
        self.groups.clear();
        self.pending_empty.clear();
    }

    /// Cancels one group. Its controllers leave the pool at the end of the current tick
    /// and its `done` callbacks never fire.
    pub fn stop_group(&mut self, group: GroupId) -> bool {
        if self.groups.remove(group).is_none() {
            return false;
        }
        for controller in self.pool.iter_mut().filter(|c| c.group == group) {
            controller.removed = true;
        }
        self.pending_empty.retain(|&g| g != group);
        true
    }

    pub fn has_group(&self, group: GroupId) -> bool {
        self.groups.contains_key(group)
    }

    /// Controllers still scheduled (cancelled ones excluded).
    pub fn active_len(&self) -> usize {
        self.pool.iter().filter(|c| !c.removed).count()
    }

    /// Runs one tick at the clock's current time.
    pub fn update(&mut self, ctx: &mut C) -> FrameTime {
        let frame = self.frame_clock.tick(self.clock.as_ref());
        self.update_at(ctx, frame.now_ms);
        frame
    }

    /// Runs one tick at `now` (milliseconds in the clock's time base).
    pub fn update_at(&mut self, ctx: &mut C, now: f64) {
        let had_active = self.pool.iter().any(|c| !c.removed);
        let mut completed = std::mem::take(&mut self.pending_empty);

        for controller in self.pool.iter_mut().filter(|c| !c.removed) {
            let Some(group) = self.groups.get_mut(controller.group) else {
                controller.removed = true;
                continue;
            };
            if controller.step(ctx, now, &mut group.during) == Step::Done {
                group.remaining = group.remaining.saturating_sub(1);
                if group.remaining == 0 {
                    completed.push(controller.group);
                }
            }
        }

        if had_active {
            if let Some(stage) = self.stage.as_mut() {
                stage(ctx);
            }
        }

        self.pool.retain(|c| !c.removed && !c.finished);

        for id in completed {
            let Some(group) = self.groups.remove(id) else {
                continue;
            };
            for done in group.done {
                done(self, ctx);
            }
        }

        if let Some(on_frame) = self.on_frame.as_mut() {
            on_frame(ctx);
        }
    }
}

impl<C> fmt::Debug for AnimationScheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("controllers", &self.pool.len())
            .field("groups", &self.groups.len())
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use indexmap::IndexMap;

    use super::*;
    use crate::animation::{Easing, MapTarget};
    use crate::scene::Value;
    use crate::time::ManualClock;

    type Ctx = IndexMap<String, Value>;

    fn scheduler() -> (AnimationScheduler<Ctx>, ManualClock) {
        let clock = ManualClock::new();
        (AnimationScheduler::new(Box::new(clock.clone())), clock)
    }

    fn ctx(pairs: &[(&str, Value)]) -> Ctx {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect()
    }

    fn number(ctx: &Ctx, key: &str) -> Option<f64> {
        ctx.get(key).and_then(Value::as_number)
    }

    // ── interpolation through ticks ─────────────────────────────────────

    #[test]
    fn position_halfway_through_segment() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("position", Value::from([0.0, 0.0]))]);

        s.animate(MapTarget, false)
            .when(1000.0, [("position", [200.0, 0.0])], Easing::Linear)
            .start(&mut s, &ctx);
        s.update_at(&mut ctx, 500.0);

        assert_eq!(ctx.get("position"), Some(&Value::from([100.0, 0.0])));
    }

    #[test]
    fn delayed_segment_waits_for_previous_keyframe() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);

        s.animate(MapTarget, false)
            .when(1000.0, [("r", 100.0)], Easing::Linear)
            .when(2000.0, [("r", 50.0)], Easing::Linear)
            .start(&mut s, &ctx);

        s.update_at(&mut ctx, 500.0);
        assert_eq!(number(&ctx, "r"), Some(50.0));
        s.update_at(&mut ctx, 1500.0);
        // first segment finished, second halfway
        assert_eq!(number(&ctx, "r"), Some(75.0));
    }

    #[test]
    fn final_frame_lands_on_last_keyframe() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);

        s.animate(MapTarget, false)
            .when(100.0, [("r", 10.0)], Easing::QuadraticOut)
            .start(&mut s, &ctx);
        s.update_at(&mut ctx, 250.0);

        assert_eq!(number(&ctx, "r"), Some(10.0));
        assert_eq!(s.active_len(), 0);
    }

    #[test]
    fn keyframes_pair_up_in_insertion_order() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);

        s.animate(MapTarget, false)
            .when(2000.0, [("r", 0.0)], Easing::Linear)
            .when(1000.0, [("r", 100.0)], Easing::Linear)
            .start(&mut s, &ctx);

        s.update_at(&mut ctx, 1000.0);
        assert_eq!(number(&ctx, "r"), Some(0.0));
        // the backwards keyframe is a zero-length jump after its predecessor
        s.update_at(&mut ctx, 2000.0);
        assert_eq!(number(&ctx, "r"), Some(100.0));
        assert_eq!(s.active_len(), 0);
    }

    // ── completion ──────────────────────────────────────────────────────

    #[test]
    fn done_fires_once_after_every_segment() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);
        let fired = Rc::new(Cell::new(0));

        let f = Rc::clone(&fired);
        s.animate(MapTarget, false)
            .when(1000.0, [("r", 100.0)], Easing::Linear)
            .when(2000.0, [("r", 50.0)], Easing::Linear)
            .done(move |_, _| f.set(f.get() + 1))
            .start(&mut s, &ctx);

        for now in [500.0, 1000.0, 1200.0, 1999.0] {
            s.update_at(&mut ctx, now);
            assert_eq!(fired.get(), 0, "fired early at {now}");
        }
        s.update_at(&mut ctx, 2100.0);
        s.update_at(&mut ctx, 2200.0);

        assert_eq!(fired.get(), 1);
        assert_eq!(number(&ctx, "r"), Some(50.0));
    }

    #[test]
    fn done_runs_after_stage() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);
        let log = Rc::new(RefCell::new(Vec::new()));

        let l = Rc::clone(&log);
        s.set_stage(move |_| l.borrow_mut().push("stage"));
        let l = Rc::clone(&log);
        s.set_on_frame(move |_| l.borrow_mut().push("frame"));
        let l = Rc::clone(&log);
        s.animate(MapTarget, false)
            .when(10.0, [("r", 1.0)], Easing::Linear)
            .done(move |_, _| l.borrow_mut().push("done"))
            .start(&mut s, &ctx);

        s.update_at(&mut ctx, 20.0);
        assert_eq!(*log.borrow(), ["stage", "done", "frame"]);
    }

    #[test]
    fn done_can_start_a_new_animation() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);

        s.animate(MapTarget, false)
            .when(100.0, [("r", 10.0)], Easing::Linear)
            .done(|s: &mut AnimationScheduler<Ctx>, ctx: &mut Ctx| {
                s.animate(MapTarget, false)
                    .when(100.0, [("r", 20.0)], Easing::Linear)
                    .start(s, ctx);
            })
            .start(&mut s, &ctx);

        s.update_at(&mut ctx, 100.0);
        assert_eq!(number(&ctx, "r"), Some(10.0));
        assert_eq!(s.active_len(), 1);
    }

    #[test]
    fn stage_runs_once_per_tick_while_active() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("a", Value::Number(0.0)), ("b", Value::Number(0.0))]);
        let calls = Rc::new(Cell::new(0));

        let c = Rc::clone(&calls);
        s.set_stage(move |_| c.set(c.get() + 1));
        s.animate(MapTarget, false)
            .when(100.0, [("a", 1.0), ("b", 2.0)], Easing::Linear)
            .start(&mut s, &ctx);

        s.update_at(&mut ctx, 50.0);
        assert_eq!(calls.get(), 1);
        s.update_at(&mut ctx, 100.0);
        assert_eq!(calls.get(), 2);
        // pool is empty now
        s.update_at(&mut ctx, 150.0);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn stopped_group_never_fires_done() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        let group = s
            .animate(MapTarget, false)
            .when(100.0, [("r", 10.0)], Easing::Linear)
            .done(move |_, _| f.set(true))
            .start(&mut s, &ctx);

        s.update_at(&mut ctx, 50.0);
        assert!(s.stop_group(group));
        assert!(!s.stop_group(group));
        s.update_at(&mut ctx, 200.0);

        assert!(!fired.get());
        assert_eq!(number(&ctx, "r"), Some(5.0));
        assert_eq!(s.active_len(), 0);
    }

    #[test]
    fn empty_group_completes_on_next_tick() {
        let (mut s, _clock) = scheduler();
        let mut ctx = Ctx::new();
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        let group = s.animate(MapTarget, false).done(move |_, _| f.set(true)).start(&mut s, &ctx);
        assert!(s.has_group(group));

        s.update_at(&mut ctx, 0.0);
        assert!(fired.get());
        assert!(!s.has_group(group));
    }

    #[test]
    fn clear_drops_everything_silently() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        s.animate(MapTarget, false)
            .when(100.0, [("r", 10.0)], Easing::Linear)
            .done(move |_, _| f.set(true))
            .start(&mut s, &ctx);
        s.clear();
        s.update_at(&mut ctx, 200.0);

        assert!(!fired.get());
        assert_eq!(number(&ctx, "r"), Some(0.0));
    }

    // ── looping ─────────────────────────────────────────────────────────

    #[test]
    fn single_segment_loop_repeats_every_life() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);
        let frames = Rc::new(RefCell::new(Vec::new()));

        let f = Rc::clone(&frames);
        s.animate(MapTarget, true)
            .when(1000.0, [("r", 100.0)], Easing::Linear)
            .during(move |_, p| f.borrow_mut().push(p))
            .start(&mut s, &ctx);

        for now in [250.0, 1000.0, 1250.0, 2000.0, 2250.0] {
            s.update_at(&mut ctx, now);
        }

        assert_eq!(*frames.borrow(), [0.25, 1.0, 0.25, 1.0, 0.25]);
        assert_eq!(s.active_len(), 1);
    }

    #[test]
    fn loop_skips_cycles_missed_during_a_stall() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);
        let frames = Rc::new(RefCell::new(Vec::new()));

        let f = Rc::clone(&frames);
        s.animate(MapTarget, true)
            .when(1000.0, [("r", 100.0)], Easing::Linear)
            .during(move |_, p| f.borrow_mut().push(p))
            .start(&mut s, &ctx);

        // five periods pass between the first two ticks
        for now in [250.0, 5250.0, 5300.0, 5350.0, 5400.0] {
            s.update_at(&mut ctx, now);
        }

        assert_eq!(*frames.borrow(), [0.25, 1.0, 0.3, 0.35, 0.4]);
        assert_eq!(number(&ctx, "r"), Some(40.0));
    }

    #[test]
    fn multi_segment_loop_period_is_track_length() {
        let (mut s, _clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        s.animate(MapTarget, true)
            .when(1000.0, [("r", 100.0)], Easing::Linear)
            .when(2000.0, [("r", 0.0)], Easing::Linear)
            .done(move |_, _| f.set(true))
            .start(&mut s, &ctx);

        for now in [1000.0, 2000.0] {
            s.update_at(&mut ctx, now);
        }
        s.update_at(&mut ctx, 2500.0);
        assert_eq!(number(&ctx, "r"), Some(50.0));
        s.update_at(&mut ctx, 3500.0);
        assert_eq!(number(&ctx, "r"), Some(50.0));
        assert!(!fired.get());
    }

    // ── clock & running state ───────────────────────────────────────────

    #[test]
    fn update_reads_the_clock() {
        let (mut s, clock) = scheduler();
        let mut ctx = ctx(&[("r", Value::Number(0.0))]);

        s.animate(MapTarget, false)
            .when(100.0, [("r", 10.0)], Easing::Linear)
            .start(&mut s, &ctx);
        clock.advance(40.0);
        let frame = s.update(&mut ctx);

        assert_eq!(frame.now_ms, 40.0);
        assert_eq!(number(&ctx, "r"), Some(4.0));
    }

    #[test]
    fn start_and_stop_toggle_running() {
        let (mut s, _clock) = scheduler();
        assert!(!s.is_running());
        s.start();
        assert!(s.is_running());
        s.stop();
        assert!(!s.is_running());
    }
}
