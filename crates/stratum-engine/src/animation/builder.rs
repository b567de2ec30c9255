use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use log::debug;

use crate::scene::{RecordId, Value};

use super::controller::{Controller, Segment};
use super::scheduler::{DoneFn, DuringFn, Group};
use super::{Accessor, AnimationScheduler, Easing, GroupId};

#[derive(Debug, Clone)]
struct Keyframe {
    time: f64,
    value: Value,
    easing: Easing,
}

/// Chainable description of one animation group on one target.
///
/// ```ignore
/// scheduler
///     .animate(RecordTarget::at("ball", "style"), false)
///     .when(1000.0, [("r", 100.0)], Easing::Linear)
///     .when(2000.0, [("r", 50.0)], Easing::BounceOut)
///     .done(|_, _| println!("settled"))
///     .start(&mut scheduler, &ctx);
/// ```
pub struct AnimationBuilder<C> {
    accessor: Rc<dyn Accessor<C>>,
    looping: bool,
    tracks: IndexMap<String, Vec<Keyframe>>,
    during: Vec<DuringFn<C>>,
    done: Vec<DoneFn<C>>,
}

impl<C> AnimationBuilder<C> {
    pub fn new(accessor: impl Accessor<C> + 'static, looping: bool) -> Self {
        Self {
            accessor: Rc::new(accessor),
            looping,
            tracks: IndexMap::new(),
            during: Vec::new(),
            done: Vec::new(),
        }
    }

    /// Adds a keyframe at `time_ms` for each property in `props`. `easing` shapes the
    /// segment that ends at this keyframe.
    ///
    /// Keyframes of one property must be added in non-decreasing time order; they are
    /// paired up as given. A keyframe earlier than its predecessor yields a zero-length
    /// segment that jumps straight to its value.
    pub fn when<I, K, V>(mut self, time_ms: f64, props: I, easing: Easing) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in props {
            self.tracks.entry(key.into()).or_default().push(Keyframe {
                time: time_ms,
                value: value.into(),
                easing,
            });
        }
        self
    }

    /// Called after every interpolated write with the eased progress.
    pub fn during(mut self, f: impl FnMut(&mut C, f64) + 'static) -> Self {
        self.during.push(Box::new(f));
        self
    }

    /// Called once every controller of the group has finished. Never fires for looping
    /// groups or stopped groups.
    pub fn done(mut self, f: impl FnOnce(&mut AnimationScheduler<C>, &mut C) + 'static) -> Self {
        self.done.push(Box::new(f));
        self
    }

    /// Record animated by this group, when the target is a scene record.
    pub fn record_id(&self) -> Option<&RecordId> {
        self.accessor.record_id()
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Property names in first-reference order.
    pub fn properties(&self) -> impl Iterator<Item = &str> + '_ {
        self.tracks.keys().map(String::as_str)
    }

    /// Schedules one controller per pair of adjacent keyframes, starting now.
    ///
    /// Each track opens with a keyframe at time 0 holding the property's live value
    /// read from `ctx`.
    pub fn start(self, scheduler: &mut AnimationScheduler<C>, ctx: &C) -> GroupId {
        let Self {
            accessor,
            looping,
            tracks,
            during,
            done,
        } = self;
        let now = scheduler.now();
        let group = scheduler.groups.insert(Group {
            remaining: 0,
            during,
            done,
        });

        let mut spawned = 0;
        for (key, frames) in tracks {
            let Some(last) = frames.last() else { continue };
            let total = last.time;

            let initial = accessor.get(ctx, &key).unwrap_or_else(|| {
                debug!("no live value for {key:?}, starting from its first keyframe");
                frames[0].value.clone()
            });
            let mut prev = Keyframe {
                time: 0.0,
                value: initial,
                easing: Easing::Linear,
            };

            for frame in frames {
                let life = frame.time - prev.time;
                let segment = Segment {
                    key: key.clone(),
                    prev: prev.value.clone(),
                    next: frame.value.clone(),
                    delay: prev.time,
                    life,
                    gap: total - life,
                    easing: frame.easing,
                };
                scheduler
                    .pool
                    .push(Controller::new(group, Rc::clone(&accessor), segment, now, looping));
                spawned += 1;
                prev = frame;
            }
        }

        if let Some(g) = scheduler.groups.get_mut(group) {
            g.remaining = spawned;
        }
        if spawned == 0 {
            scheduler.pending_empty.push(group);
        }
        debug!("animation group started with {spawned} controllers");
        group
    }
}

impl<C> fmt::Debug for AnimationBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationBuilder")
            .field("looping", &self.looping)
            .field("tracks", &self.tracks)
            .field("during", &self.during.len())
            .field("done", &self.done.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::animation::MapTarget;
    use crate::time::ManualClock;

    type Ctx = IndexMap<String, Value>;

    #[test]
    fn properties_keep_first_reference_order() {
        let b: AnimationBuilder<Ctx> = AnimationBuilder::new(MapTarget, false)
            .when(100.0, [("y", 1.0)], Easing::Linear)
            .when(200.0, [("x", 1.0), ("y", 2.0)], Easing::Linear);
        assert_eq!(b.properties().collect::<Vec<_>>(), ["y", "x"]);
    }

    #[test]
    fn record_id_comes_from_the_target() {
        let b: AnimationBuilder<crate::core::Stage> =
            AnimationBuilder::new(crate::animation::RecordTarget::at("ball", "style"), false);
        assert_eq!(b.record_id().map(RecordId::as_str), Some("ball"));

        let b: AnimationBuilder<Ctx> = AnimationBuilder::new(MapTarget, false);
        assert!(b.record_id().is_none());
    }

    #[test]
    fn one_controller_per_keyframe_pair() {
        let mut s = AnimationScheduler::new(Box::new(ManualClock::new()));
        let ctx: Ctx = [("x".to_owned(), Value::Number(0.0))].into_iter().collect();

        let group = AnimationBuilder::new(MapTarget, false)
            .when(100.0, [("x", 1.0), ("y", 1.0)], Easing::Linear)
            .when(200.0, [("x", 2.0)], Easing::Linear)
            .start(&mut s, &ctx);

        assert_eq!(s.active_len(), 3);
        assert_eq!(s.groups.get(group).map(|g| g.remaining), Some(3));
    }

    #[test]
    fn missing_live_value_starts_from_first_keyframe() {
        let clock = ManualClock::new();
        let mut s = AnimationScheduler::new(Box::new(clock.clone()));
        let mut ctx = Ctx::new();

        AnimationBuilder::new(MapTarget, false)
            .when(100.0, [("opacity", 0.5)], Easing::Linear)
            .start(&mut s, &ctx);
        s.update_at(&mut ctx, 50.0);

        assert_eq!(ctx.get("opacity"), Some(&Value::Number(0.5)));
    }
}
