use std::rc::Rc;
use std::time::Duration;

use log::{debug, error, info, warn};
use slotmap::SecondaryMap;

use crate::animation::{AnimationBuilder, AnimationScheduler, GroupId, RecordTarget, TimerLoop};
use crate::error::{RenderError, SceneError};
use crate::render::{ExportOptions, HostContainer, LayeredRenderer, RenderConfig};
use crate::scene::{Drawable, RecordId, RecordPatch, SceneStore, StoreConfig};
use crate::shape::ShapeRegistry;
use crate::time::{FrameTime, MonotonicClock, TimeSource, DEFAULT_FRAME_INTERVAL};

use super::Stage;

/// Engine-wide settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub render: RenderConfig,
    pub store: StoreConfig,
    /// Cadence of [`Engine::run_timer_loop`].
    pub frame_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            store: StoreConfig::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Top-level facade owning the store, the renderer and the animation scheduler.
///
/// The scheduler's stage callback repaints the records currently being animated and its
/// frame callback serves repaint requests raised by shapes, so a host only has to call
/// [`tick`](Self::tick) from its frame callback (or hand control to
/// [`run_timer_loop`](Self::run_timer_loop)).
pub struct Engine {
    stage: Stage,
    animation: AnimationScheduler<Stage>,
    /// Record each running group was started on.
    owners: SecondaryMap<GroupId, RecordId>,
    timer: TimerLoop,
    disposed: bool,
}

impl Engine {
    pub fn new(
        host: Box<dyn HostContainer>,
        registry: Rc<ShapeRegistry>,
        config: EngineConfig,
    ) -> Result<Self, RenderError> {
        Self::with_clock(host, registry, config, Box::new(MonotonicClock::new()))
    }

    /// Like [`new`](Self::new) with an explicit animation time source.
    pub fn with_clock(
        host: Box<dyn HostContainer>,
        registry: Rc<ShapeRegistry>,
        config: EngineConfig,
        clock: Box<dyn TimeSource>,
    ) -> Result<Self, RenderError> {
        let renderer = LayeredRenderer::new(host, Rc::clone(&registry), config.render)?;
        let store = SceneStore::new(registry, config.store);

        let mut animation = AnimationScheduler::new(clock);
        animation.set_stage(|stage: &mut Stage| {
            if let Err(e) = stage.repaint_animating() {
                error!("animation repaint failed: {e}");
            }
        });
        animation.set_on_frame(|stage: &mut Stage| {
            if let Err(e) = stage.serve_repaint_request() {
                error!("requested repaint failed: {e}");
            }
        });
        animation.start();

        info!(
            "engine created ({}x{})",
            renderer.viewport().width,
            renderer.viewport().height
        );
        Ok(Self {
            stage: Stage::new(store, renderer),
            animation,
            owners: SecondaryMap::new(),
            timer: TimerLoop::new(config.frame_interval),
            disposed: false,
        })
    }

    // ── scene ─────────────────────────────────────────────────────────────

    pub fn new_id(&mut self, prefix: Option<&str>) -> RecordId {
        self.stage.store.new_id(prefix)
    }

    pub fn add(&mut self, record: Drawable) -> &mut Self {
        self.stage.store.add(record);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Drawable> {
        self.stage.store.get(id)
    }

    pub fn modify(&mut self, id: &str, patch: RecordPatch) -> &mut Self {
        self.stage.store.modify(id, patch);
        self
    }

    /// Removes one record, or all of them when `id` is `None`.
    pub fn delete(&mut self, id: Option<&str>) -> &mut Self {
        self.stage.store.delete(id);
        self
    }

    pub fn drift(&mut self, id: &str, dx: f64, dy: f64) -> Result<&mut Self, SceneError> {
        self.stage.store.drift(id, dx, dy)?;
        Ok(self)
    }

    /// Queues a transient overlay entry, painted by [`refresh_hover`](Self::refresh_hover).
    pub fn add_hover(&mut self, entry: Drawable) -> &mut Self {
        self.stage.store.add_hover_entry(entry);
        self
    }

    pub fn clear_hover(&mut self) -> &mut Self {
        self.stage.store.clear_hover_entries();
        self.stage.renderer.clear_overlay();
        self
    }

    // ── painting ──────────────────────────────────────────────────────────

    /// Repaints every bucket.
    pub fn render(&mut self) -> Result<(), RenderError> {
        self.stage.renderer.render_full(&mut self.stage.store, None)
    }

    /// Repaints the dirty buckets.
    pub fn refresh(&mut self) -> Result<(), RenderError> {
        self.stage.renderer.render_incremental(&mut self.stage.store, None)
    }

    /// Applies `updates` through the store, then refreshes.
    pub fn update<I, K>(&mut self, updates: I) -> Result<(), RenderError>
    where
        I: IntoIterator<Item = (K, RecordPatch)>,
        K: AsRef<str>,
    {
        self.stage
            .renderer
            .apply_and_render(&mut self.stage.store, updates, None)
    }

    pub fn refresh_hover(&mut self) -> Result<(), RenderError> {
        self.stage.renderer.render_overlay(&mut self.stage.store)
    }

    pub fn resize(&mut self) -> Result<bool, RenderError> {
        self.stage.renderer.resize(&mut self.stage.store)
    }

    pub fn export_image(&mut self, mime: &str, options: &ExportOptions) -> Result<Option<Vec<u8>>, RenderError> {
        self.stage
            .renderer
            .export_image(&self.stage.store, mime, options)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.stage.renderer.width()
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.stage.renderer.height()
    }

    #[inline]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    #[inline]
    pub fn store(&self) -> &SceneStore {
        &self.stage.store
    }

    #[inline]
    pub fn renderer(&self) -> &LayeredRenderer {
        &self.stage.renderer
    }

    // ── animation ─────────────────────────────────────────────────────────

    /// Builder animating record `id`, or the (nested) map at dotted `path` inside it,
    /// e.g. `"style"`.
    ///
    /// Returns `None` (and logs) when the record is unknown or the path resolves to
    /// nothing. Once started, the record counts as animating until the group's `done`
    /// fires or the group is stopped.
    pub fn animate(&mut self, id: &str, path: Option<&str>, looping: bool) -> Option<AnimationBuilder<Stage>> {
        if !self.stage.store.contains(id) {
            warn!("animate: no record {id}");
            return None;
        }
        let target = RecordTarget::at(id, path.unwrap_or_default());
        if !target.path.is_empty() && !self.stage.store.resolves_path(id, &target.path) {
            warn!("animate: {id} has no property path {:?}", target.path.join("."));
            return None;
        }

        let owner = target.id.clone();
        Some(
            self.animation
                .animate(target, looping)
                .done(move |_, stage: &mut Stage| stage.release_animating(owner.as_str())),
        )
    }

    /// Schedules a builder obtained from [`animate`](Self::animate).
    pub fn start_animation(&mut self, builder: AnimationBuilder<Stage>) -> GroupId {
        let owner = builder.record_id().cloned();
        let group = builder.start(&mut self.animation, &self.stage);
        if let Some(id) = owner {
            self.stage.retain_animating(&id);
            self.owners.insert(group, id);
        }
        group
    }

    /// Cancels a running group and releases the record it animates. Values written so
    /// far stay. Returns `false` for groups that already finished or were stopped.
    pub fn stop_animation(&mut self, group: GroupId) -> bool {
        let owner = self.owners.remove(group);
        if !self.animation.stop_group(group) {
            return false;
        }
        if let Some(id) = owner {
            self.stage.release_animating(id.as_str());
        }
        true
    }

    /// Drops every running animation without firing `done`.
    pub fn clear_animation(&mut self) {
        self.animation.clear();
        self.owners.clear();
        self.stage.clear_animating();
    }

    /// Runs one animation tick at the clock's current time.
    pub fn tick(&mut self) -> FrameTime {
        self.animation.update(&mut self.stage)
    }

    pub fn tick_at(&mut self, now_ms: f64) {
        self.animation.update_at(&mut self.stage, now_ms);
    }

    pub fn animation(&self) -> &AnimationScheduler<Stage> {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut AnimationScheduler<Stage> {
        &mut self.animation
    }

    /// Blocks, ticking at the configured cadence until the scheduler is stopped or
    /// `keep_going` returns `false`.
    pub fn run_timer_loop(&mut self, keep_going: impl FnMut(&Stage) -> bool) -> u64 {
        self.timer.run(&mut self.animation, &mut self.stage, keep_going)
    }

    // ── teardown ──────────────────────────────────────────────────────────

    /// Removes every record and blanks the surfaces. Animations keep running.
    pub fn clear(&mut self) -> &mut Self {
        self.stage.store.delete(None);
        self.stage.renderer.clear().clear_overlay();
        self
    }

    /// Stops and clears the scheduler, then clears the store, then releases the
    /// surfaces. Runs at most once; also run on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.animation.stop();
        self.clear_animation();

        self.stage.store.delete(None);
        self.stage.renderer.release();
        debug!("engine disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("stage", &self.stage)
            .field("animation", &self.animation)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::animation::Easing;
    use crate::coords::Viewport;
    use crate::scene::{Style, Value};
    use crate::time::ManualClock;

    fn engine() -> (Engine, ManualClock) {
        let clock = ManualClock::new();
        let engine = Engine::with_clock(
            Box::new(Viewport::new(64.0, 64.0)),
            Rc::new(ShapeRegistry::with_builtins()),
            EngineConfig::default(),
            Box::new(clock.clone()),
        )
        .unwrap();
        (engine, clock)
    }

    fn ball(id: &str) -> Drawable {
        Drawable::new("circle")
            .with_id(id)
            .with_style(Style::new().with("x", 10.0).with("y", 10.0).with("r", 4.0).with("color", "blue"))
    }

    fn alpha_at(engine: &Engine, level: usize, x: u32, y: u32) -> u8 {
        engine
            .renderer()
            .surface(level)
            .and_then(|s| s.pixel(x, y))
            .map_or(0, |p| p.alpha())
    }

    // ── scene forwarding ────────────────────────────────────────────────

    #[test]
    fn add_then_refresh_paints() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        e.refresh().unwrap();
        assert_eq!(alpha_at(&e, 0, 10, 10), 255);
        assert!(e.store().dirty_buckets().is_empty());
    }

    #[test]
    fn update_moves_between_buckets() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        e.render().unwrap();

        e.update([("a", RecordPatch::new().zlevel(1))]).unwrap();
        assert_eq!(alpha_at(&e, 0, 10, 10), 0);
        assert_eq!(alpha_at(&e, 1, 10, 10), 255);
    }

    #[test]
    fn hover_entries_paint_once() {
        let (mut e, _) = engine();
        e.add_hover(ball("h"));
        e.refresh_hover().unwrap();
        assert!(!e.store().has_hover_entries());
        assert!(e.renderer().overlay().is_some_and(|o| !o.is_blank()));

        e.clear_hover();
        assert!(e.renderer().overlay().is_some_and(|o| o.is_blank()));
    }

    #[test]
    fn export_produces_png_bytes() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        let bytes = e.export_image("image/png", &ExportOptions::default()).unwrap().unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn tick_serves_repaint_requests() {
        let (mut e, _) = engine();
        let paints = Rc::new(Cell::new(0));
        let p = Rc::clone(&paints);
        e.add(ball("a").with_brush_hook(move |ctx, _, _| {
            p.set(p.get() + 1);
            if p.get() == 1 {
                ctx.request_repaint();
            }
            false
        }));
        e.render().unwrap();
        assert_eq!(paints.get(), 1);

        e.tick_at(16.0);
        assert_eq!(paints.get(), 2);
        assert_eq!(alpha_at(&e, 0, 10, 10), 255);

        // nothing asked for another pass
        e.tick_at(32.0);
        assert_eq!(paints.get(), 2);
    }

    // ── animation ───────────────────────────────────────────────────────

    #[test]
    fn animate_unknown_record_or_path_is_none() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        assert!(e.animate("ghost", None, false).is_none());
        assert!(e.animate("a", Some("nowhere"), false).is_none());
        assert!(!e.stage().is_animating("a"));
    }

    #[test]
    fn tick_writes_values_and_repaints() {
        let (mut e, clock) = engine();
        e.add(ball("a"));
        e.render().unwrap();

        let builder = e
            .animate("a", Some("style"), false)
            .unwrap()
            .when(1000.0, [("x", 50.0)], Easing::Linear);
        e.start_animation(builder);
        assert!(e.stage().is_animating("a"));

        clock.advance(500.0);
        e.tick();
        let x = e.get("a").and_then(|r| r.style.number("x"));
        assert_eq!(x, Some(30.0));
        assert_eq!(alpha_at(&e, 0, 30, 10), 255);
        assert_eq!(alpha_at(&e, 0, 10, 10), 0);

        clock.advance(600.0);
        e.tick();
        assert_eq!(e.get("a").and_then(|r| r.style.number("x")), Some(50.0));
        assert!(!e.stage().is_animating("a"));
    }

    #[test]
    fn position_animation_marks_transform() {
        let (mut e, _) = engine();
        e.add(ball("a"));

        let builder = e
            .animate("a", None, false)
            .unwrap()
            .when(1000.0, [("position", [200.0, 0.0])], Easing::Linear);
        e.start_animation(builder);
        e.tick_at(500.0);

        let record = e.get("a").unwrap();
        assert_eq!(record.position, [100.0, 0.0]);
        assert!(record.needs_transform());
    }

    #[test]
    fn user_done_runs_after_release() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        let builder = e
            .animate("a", Some("style"), false)
            .unwrap()
            .when(100.0, [("r", 8.0)], Easing::Linear)
            .done(move |_, stage: &mut Stage| f.set(!stage.is_animating("a")));
        e.start_animation(builder);
        e.tick_at(100.0);

        assert!(fired.get());
    }

    #[test]
    fn stop_animation_releases_record() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        let builder = e
            .animate("a", Some("style"), true)
            .unwrap()
            .when(100.0, [("r", 8.0)], Easing::Linear);
        let group = e.start_animation(builder);

        e.tick_at(50.0);
        assert!(e.stop_animation(group));
        assert!(!e.stage().is_animating("a"));
        assert_eq!(e.get("a").and_then(|r| r.style.number("r")), Some(6.0));
    }

    #[test]
    fn stop_animation_releases_only_its_own_record() {
        let (mut e, _) = engine();
        e.add(ball("a")).add(ball("b"));
        let short = e.animate("a", Some("style"), false).unwrap().when(10.0, [("r", 8.0)], Easing::Linear);
        let short = e.start_animation(short);
        let long = e.animate("b", Some("style"), true).unwrap().when(100.0, [("r", 8.0)], Easing::Linear);
        let long = e.start_animation(long);
        let other = e.animate("a", Some("style"), true).unwrap().when(100.0, [("r", 2.0)], Easing::Linear);
        e.start_animation(other);

        e.tick_at(20.0);
        // finished groups cannot be stopped, and release nothing
        assert!(!e.stop_animation(short));
        assert!(e.stage().is_animating("a"));

        assert!(e.stop_animation(long));
        assert!(!e.stage().is_animating("b"));
        assert!(e.stage().is_animating("a"));
        assert!(!e.stop_animation(long));
    }

    #[test]
    fn unstarted_builder_does_not_mark_record() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        let builder = e.animate("a", None, false);
        assert!(builder.is_some());
        drop(builder);
        assert!(!e.stage().is_animating("a"));
    }

    #[test]
    fn animated_zlevel_moves_bucket() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        let builder = e
            .animate("a", None, false)
            .unwrap()
            .when(10.0, [("zlevel", Value::Number(2.0))], Easing::Linear);
        e.start_animation(builder);
        e.tick_at(10.0);

        assert_eq!(e.get("a").map(|r| r.zlevel.index()), Some(2));
        assert_eq!(e.renderer().surface_count(), 3);
    }

    // ── teardown ────────────────────────────────────────────────────────

    #[test]
    fn dispose_tears_down_in_order_once() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        e.render().unwrap();
        let builder = e.animate("a", None, true).unwrap().when(100.0, [("rotation", [90.0, 0.0, 0.0])], Easing::Linear);
        e.start_animation(builder);

        e.dispose();
        assert!(e.is_disposed());
        assert!(!e.animation().is_running());
        assert_eq!(e.animation().active_len(), 0);
        assert!(e.store().is_empty());
        assert_eq!(e.renderer().surface_count(), 0);
        e.dispose();
    }

    #[test]
    fn clear_keeps_surfaces() {
        let (mut e, _) = engine();
        e.add(ball("a"));
        e.render().unwrap();
        e.clear();
        assert!(e.store().is_empty());
        assert_eq!(alpha_at(&e, 0, 10, 10), 0);
        assert_eq!(e.renderer().surface_count(), 1);
    }
}
