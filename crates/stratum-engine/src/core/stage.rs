use indexmap::IndexMap;
use log::debug;

use crate::error::RenderError;
use crate::render::LayeredRenderer;
use crate::scene::{DirtyTarget, RecordId, RecordPatch, SceneStore};

/// Everything an animation tick may touch: the store, its renderer and the set of
/// records currently being animated.
pub struct Stage {
    pub(crate) store: SceneStore,
    pub(crate) renderer: LayeredRenderer,
    /// Record id -> number of unfinished animation groups on it.
    animating: IndexMap<RecordId, usize>,
}

impl Stage {
    pub fn new(store: SceneStore, renderer: LayeredRenderer) -> Self {
        Self {
            store,
            renderer,
            animating: IndexMap::new(),
        }
    }

    #[inline]
    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }

    #[inline]
    pub fn renderer(&self) -> &LayeredRenderer {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut LayeredRenderer {
        &mut self.renderer
    }

    pub fn is_animating(&self, id: &str) -> bool {
        self.animating.contains_key(id)
    }

    pub fn animating(&self) -> impl Iterator<Item = &RecordId> + '_ {
        self.animating.keys()
    }

    pub(crate) fn retain_animating(&mut self, id: &RecordId) {
        *self.animating.entry(id.clone()).or_insert(0) += 1;
    }

    /// Drops one animation reference; the record leaves the set at zero.
    pub(crate) fn release_animating(&mut self, id: &str) {
        let Some(count) = self.animating.get_mut(id) else {
            return;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.animating.shift_remove(id);
            debug!("{id} no longer animating");
        }
    }

    pub(crate) fn clear_animating(&mut self) {
        self.animating.clear();
    }

    /// Marks every animating record's bucket dirty and repaints incrementally.
    pub fn repaint_animating(&mut self) -> Result<(), RenderError> {
        let ids: Vec<RecordId> = self.animating.keys().cloned().collect();
        self.renderer.apply_and_render(
            &mut self.store,
            ids.into_iter().map(|id| (id, RecordPatch::new())),
            None,
        )
    }

    /// Repaints every bucket if a shape asked for another pass during the last paint.
    /// Returns whether it did.
    pub fn serve_repaint_request(&mut self) -> Result<bool, RenderError> {
        if !self.renderer.take_repaint_request() {
            return Ok(false);
        }
        debug!("serving repaint request");
        self.store.force_dirty(DirtyTarget::All);
        self.renderer.render_incremental(&mut self.store, None)?;
        Ok(true)
    }
}

impl AsRef<SceneStore> for Stage {
    fn as_ref(&self) -> &SceneStore {
        &self.store
    }
}

impl AsMut<SceneStore> for Stage {
    fn as_mut(&mut self) -> &mut SceneStore {
        &mut self.store
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("store", &self.store)
            .field("animating", &self.animating)
            .finish_non_exhaustive()
    }
}
