use std::fmt;
use std::rc::Rc;

use log::{debug, error, warn};
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::coords::Viewport;
use crate::error::RenderError;
use crate::scene::{DirtySet, DirtyTarget, Drawable, RecordPatch, SceneStore};
use crate::shape::{PaintCtx, ShapeRegistry};

use super::{ExportOptions, HostContainer, RenderConfig, RenderStats, Surface};

/// Invoked once a render pass has finished.
pub type DoneCallback<'a> = Box<dyn FnOnce() + 'a>;

/// Layered compositor: one surface per depth bucket plus one overlay surface.
///
/// Surfaces are allocated lazily as buckets appear and never shrink. Only buckets named
/// in the store's dirty set are cleared and repainted by [`render_incremental`].
///
/// [`render_incremental`]: LayeredRenderer::render_incremental
pub struct LayeredRenderer {
    host: Box<dyn HostContainer>,
    registry: Rc<ShapeRegistry>,
    config: RenderConfig,

    viewport: Viewport,
    pixel_ratio: f32,
    surfaces: Vec<Surface>,
    overlay: Option<Surface>,

    stats: RenderStats,
    repaint_requested: bool,
}

impl LayeredRenderer {
    /// Allocates bucket 0 and the overlay at the host's current size.
    pub fn new(
        host: Box<dyn HostContainer>,
        registry: Rc<ShapeRegistry>,
        config: RenderConfig,
    ) -> Result<Self, RenderError> {
        let viewport = host.viewport();
        let pixel_ratio = host.pixel_ratio();
        let mut renderer = Self {
            host,
            registry,
            config,
            viewport,
            pixel_ratio,
            surfaces: Vec::new(),
            overlay: None,
            stats: RenderStats::default(),
            repaint_requested: false,
        };
        renderer.allocate_up_to(0)?;
        Ok(renderer)
    }

    /// Allocates surfaces for buckets the store gained since the last call.
    pub fn resync(&mut self, store: &SceneStore) -> Result<(), RenderError> {
        self.allocate_up_to(store.max_bucket())
    }

    // ── render passes ─────────────────────────────────────────────────────

    /// Repaints every bucket from scratch and empties the dirty set.
    pub fn render_full(&mut self, store: &mut SceneStore, on_done: Option<DoneCallback<'_>>) -> Result<(), RenderError> {
        self.resync(store)?;
        for surface in &mut self.surfaces {
            surface.clear();
        }
        for level in 0..=store.max_bucket() {
            self.paint_bucket(store, level)?;
        }
        store.clear_dirty();
        self.stats.full_renders += 1;

        if let Some(done) = on_done {
            done();
        }
        Ok(())
    }

    /// Clears and repaints the dirty buckets only, then empties the dirty set.
    ///
    /// When a draw fails in strict mode the pass stops and the dirty set is kept.
    pub fn render_incremental(
        &mut self,
        store: &mut SceneStore,
        on_done: Option<DoneCallback<'_>>,
    ) -> Result<(), RenderError> {
        self.resync(store)?;
        let dirty = store.dirty_buckets().clone();
        match &dirty {
            DirtySet::All => self.surfaces.iter_mut().for_each(Surface::clear),
            DirtySet::Levels(levels) => {
                for &level in levels {
                    if let Some(surface) = self.surfaces.get_mut(level) {
                        surface.clear();
                    }
                }
            }
        }
        for level in (0..=store.max_bucket()).filter(|&l| dirty.contains(l)) {
            self.paint_bucket(store, level)?;
        }
        store.clear_dirty();
        self.stats.incremental_renders += 1;

        if let Some(done) = on_done {
            done();
        }
        Ok(())
    }

    /// Writes each patch back through [`SceneStore::modify`], then renders incrementally.
    pub fn apply_and_render<I, K>(
        &mut self,
        store: &mut SceneStore,
        updates: I,
        on_done: Option<DoneCallback<'_>>,
    ) -> Result<(), RenderError>
    where
        I: IntoIterator<Item = (K, RecordPatch)>,
        K: AsRef<str>,
    {
        for (id, patch) in updates {
            store.modify(id.as_ref(), patch);
        }
        self.render_incremental(store, on_done)
    }

    /// Paints the store's overlay entries onto a cleared overlay surface, then drops
    /// the entries.
    pub fn render_overlay(&mut self, store: &mut SceneStore) -> Result<(), RenderError> {
        self.resync(store)?;
        let Some(overlay) = self.overlay.as_mut() else {
            error!("overlay surface missing, overlay skipped");
            return Ok(());
        };
        overlay.clear();

        let lenient = self.config.catch_draw_errors;
        let mut ctx = overlay.paint_ctx();
        let mut result = Ok(());
        for entry in store.hover_entries() {
            result = brush_record(&self.registry, lenient, &mut self.stats, &mut ctx, entry, true);
            if result.is_err() {
                break;
            }
        }
        self.repaint_requested |= ctx.repaint_requested();
        // entries are one-shot even when painting them failed
        store.clear_hover_entries();
        result?;

        self.stats.overlay_renders += 1;
        Ok(())
    }

    /// Clears the overlay surface; queued overlay entries are kept.
    pub fn clear_overlay(&mut self) -> &mut Self {
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.clear();
        }
        self
    }

    /// Clears every bucket surface. The overlay is left alone.
    pub fn clear(&mut self) -> &mut Self {
        for surface in &mut self.surfaces {
            surface.clear();
        }
        self
    }

    /// Re-reads the host size. On change, reallocates every surface and repaints
    /// everything; returns whether anything changed.
    pub fn resize(&mut self, store: &mut SceneStore) -> Result<bool, RenderError> {
        let viewport = self.host.viewport();
        let pixel_ratio = self.host.pixel_ratio();
        if viewport == self.viewport && pixel_ratio == self.pixel_ratio {
            return Ok(false);
        }
        debug!(
            "resize {}x{} -> {}x{} (ratio {pixel_ratio})",
            self.viewport.width, self.viewport.height, viewport.width, viewport.height
        );
        self.viewport = viewport;
        self.pixel_ratio = pixel_ratio;

        for surface in self.surfaces.iter_mut().chain(self.overlay.iter_mut()) {
            surface.resize(viewport, pixel_ratio)?;
        }
        self.stats.resizes += 1;

        store.force_dirty(DirtyTarget::All);
        self.render_incremental(store, None)?;
        Ok(true)
    }

    /// Paints the whole scene onto a fresh offscreen surface and encodes it.
    ///
    /// Returns `Ok(None)` in legacy compatibility mode. Only PNG is supported.
    pub fn export_image(
        &mut self,
        store: &SceneStore,
        mime: &str,
        options: &ExportOptions,
    ) -> Result<Option<Vec<u8>>, RenderError> {
        if self.config.legacy_compat {
            debug!("image export unavailable in legacy mode");
            return Ok(None);
        }
        if !matches!(mime, "image/png" | "png") {
            return Err(RenderError::UnsupportedFormat(mime.to_owned()));
        }

        let mut target = Surface::new(self.viewport, self.pixel_ratio)?;
        if let Some(background) = options.background {
            target.fill(background);
        }

        let lenient = self.config.catch_draw_errors;
        let mut ctx = target.paint_ctx();
        for level in 0..=store.max_bucket() {
            for record in store.records_in(level) {
                brush_record(&self.registry, lenient, &mut self.stats, &mut ctx, record, false)?;
            }
        }

        target
            .pixmap()
            .encode_png()
            .map(Some)
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    /// Flattens the bucket surfaces (ascending) and the overlay into one pixmap.
    pub fn compose(&self) -> Option<Pixmap> {
        let first = self.surfaces.first().or(self.overlay.as_ref())?;
        let mut out = Pixmap::new(first.width(), first.height())?;
        for surface in self.surfaces.iter().chain(self.overlay.iter()) {
            out.draw_pixmap(
                0,
                0,
                surface.pixmap().as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Some(out)
    }

    /// Drops every surface. The next resync allocates them again.
    pub fn release(&mut self) {
        debug!("releasing {} surfaces", self.surfaces.len() + usize::from(self.overlay.is_some()));
        self.surfaces.clear();
        self.overlay = None;
    }

    /// True once if a shape asked for another refresh since the last call.
    pub fn take_repaint_request(&mut self) -> bool {
        std::mem::take(&mut self.repaint_requested)
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn surface(&self, level: usize) -> Option<&Surface> {
        self.surfaces.get(level)
    }

    #[inline]
    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn overlay(&self) -> Option<&Surface> {
        self.overlay.as_ref()
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.viewport.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.viewport.height
    }

    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    #[inline]
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[inline]
    pub fn registry(&self) -> &Rc<ShapeRegistry> {
        &self.registry
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn allocate_up_to(&mut self, max_bucket: usize) -> Result<(), RenderError> {
        while self.surfaces.len() <= max_bucket {
            let surface = Surface::new(self.viewport, self.pixel_ratio)?;
            debug!(
                "allocated surface for bucket {} ({}x{})",
                self.surfaces.len(),
                surface.width(),
                surface.height()
            );
            self.surfaces.push(surface);
            self.stats.surface_allocations += 1;
        }
        if self.overlay.is_none() {
            self.overlay = Some(Surface::new(self.viewport, self.pixel_ratio)?);
            debug!("allocated overlay surface");
            self.stats.surface_allocations += 1;
        }
        Ok(())
    }

    fn paint_bucket(&mut self, store: &SceneStore, level: usize) -> Result<(), RenderError> {
        let Some(surface) = self.surfaces.get_mut(level) else {
            if store.records_in(level).next().is_some() {
                error!("no surface for bucket {level}, bucket skipped");
            }
            return Ok(());
        };

        let lenient = self.config.catch_draw_errors;
        let mut ctx = surface.paint_ctx();
        let mut result = Ok(());
        for record in store.records_in(level) {
            result = brush_record(&self.registry, lenient, &mut self.stats, &mut ctx, record, false);
            if result.is_err() {
                break;
            }
        }
        self.repaint_requested |= ctx.repaint_requested();
        result
    }
}

/// Paints one record: skipped when invisible, brush hook first, then the shape.
fn brush_record(
    registry: &ShapeRegistry,
    lenient: bool,
    stats: &mut RenderStats,
    ctx: &mut PaintCtx<'_>,
    record: &Drawable,
    is_overlay: bool,
) -> Result<(), RenderError> {
    // overlay entries are painted as queued, visibility flag notwithstanding
    if record.invisible && !is_overlay {
        return Ok(());
    }
    if let Some(hook) = &record.on_brush {
        if hook(ctx, record, is_overlay) {
            return Ok(());
        }
    }

    let outcome = match registry.get(&record.shape) {
        Some(shape) => shape
            .brush(ctx, record, is_overlay)
            .map_err(|cause| RenderError::Draw {
                shape: record.shape.clone(),
                id: record.id.clone(),
                cause,
            }),
        None => Err(RenderError::UnknownShape {
            shape: record.shape.clone(),
            id: record.id.clone(),
        }),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err) => {
            stats.draw_failures += 1;
            if lenient {
                warn!("{err}");
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

impl fmt::Debug for LayeredRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredRenderer")
            .field("viewport", &self.viewport)
            .field("pixel_ratio", &self.pixel_ratio)
            .field("surfaces", &self.surfaces.len())
            .field("overlay", &self.overlay.is_some())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
