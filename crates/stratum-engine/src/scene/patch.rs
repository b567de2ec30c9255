use std::rc::Rc;

use indexmap::IndexMap;

use crate::coords::Vec2;
use crate::shape::PaintCtx;

use super::drawable::{BrushHook, DriftHook, EventKind, Handlers};
use super::value::Value;
use super::ZLevel;

/// Partial update of a [`Drawable`](super::Drawable), merged deeply by
/// [`SceneStore::modify`](super::SceneStore::modify).
///
/// Array fields overwrite element by element from index 0, so `position(vec![5.0])`
/// moves only the x coordinate.
#[derive(Clone, Default)]
pub struct RecordPatch {
    pub shape: Option<String>,
    pub zlevel: Option<ZLevel>,
    pub invisible: Option<bool>,
    pub hoverable: Option<bool>,
    pub clickable: Option<bool>,
    pub draggable: Option<bool>,
    pub position: Option<Vec<f64>>,
    pub rotation: Option<Vec<f64>>,
    pub scale: Option<Vec<f64>>,
    pub style: IndexMap<String, Value>,
    pub highlight_style: IndexMap<String, Value>,
    pub handlers: Option<Handlers>,
    pub on_brush: Option<BrushHook>,
    pub on_drift: Option<DriftHook>,
    pub extra: IndexMap<String, Value>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    pub fn zlevel(mut self, z: usize) -> Self {
        self.zlevel = Some(ZLevel(z));
        self
    }

    pub fn invisible(mut self, v: bool) -> Self {
        self.invisible = Some(v);
        self
    }

    pub fn hoverable(mut self, v: bool) -> Self {
        self.hoverable = Some(v);
        self
    }

    pub fn clickable(mut self, v: bool) -> Self {
        self.clickable = Some(v);
        self
    }

    pub fn draggable(mut self, v: bool) -> Self {
        self.draggable = Some(v);
        self
    }

    pub fn position(mut self, v: Vec<f64>) -> Self {
        self.position = Some(v);
        self
    }

    pub fn rotation(mut self, v: Vec<f64>) -> Self {
        self.rotation = Some(v);
        self
    }

    pub fn scale(mut self, v: Vec<f64>) -> Self {
        self.scale = Some(v);
        self
    }

    pub fn style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn highlight_style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.highlight_style.insert(key.into(), value.into());
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn on(mut self, kind: EventKind, handler: impl Fn(&super::Drawable, Vec2) + 'static) -> Self {
        self.handlers.get_or_insert_with(Handlers::default).set(kind, Rc::new(handler));
        self
    }

    pub fn brush_hook(
        mut self,
        hook: impl Fn(&mut PaintCtx<'_>, &super::Drawable, bool) -> bool + 'static,
    ) -> Self {
        self.on_brush = Some(Rc::new(hook));
        self
    }

    pub fn drift_hook(mut self, hook: impl Fn(&mut super::Drawable, f64, f64) -> bool + 'static) -> Self {
        self.on_drift = Some(Rc::new(hook));
        self
    }

    /// Bucket this patch moves the record into, if any.
    #[inline]
    pub fn target_level(&self) -> Option<ZLevel> {
        self.zlevel
    }
}
