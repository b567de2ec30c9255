use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::coords::Vec2;
use crate::shape::PaintCtx;

use super::patch::RecordPatch;
use super::style::Style;
use super::value::Value;
use super::{RecordId, ZLevel};

/// Threshold below which a transform component counts as identity.
pub const TRANSFORM_EPSILON: f64 = 1e-4;

/// Interaction event a handler can be attached to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseMove,
    MouseOver,
    MouseOut,
    MouseDown,
    MouseUp,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
}

/// Interaction callback, invoked by the host's input layer with the pointer position.
pub type Handler = Rc<dyn Fn(&Drawable, Vec2)>;

/// Replaces the shape's own paint routine when it returns `true`.
/// Arguments: paint context, record, whether painting on the overlay.
pub type BrushHook = Rc<dyn Fn(&mut PaintCtx<'_>, &Drawable, bool) -> bool>;

/// Replaces the shape's own drift routine when it returns `true`.
pub type DriftHook = Rc<dyn Fn(&mut Drawable, f64, f64) -> bool>;

/// Event handlers of a drawable, keyed by [`EventKind`].
#[derive(Clone, Default)]
pub struct Handlers {
    map: IndexMap<EventKind, Handler>,
}

impl Handlers {
    pub fn set(&mut self, kind: EventKind, handler: Handler) {
        self.map.insert(kind, handler);
    }

    pub fn get(&self, kind: EventKind) -> Option<&Handler> {
        self.map.get(&kind)
    }

    pub fn remove(&mut self, kind: EventKind) -> Option<Handler> {
        self.map.shift_remove(&kind)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Overwrites handlers present in `other`, keeps the rest.
    pub fn merge(&mut self, other: Handlers) {
        self.map.extend(other.map);
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.map.keys()).finish()
    }
}

/// A drawable record held by the [`SceneStore`](super::SceneStore).
///
/// `needs_transform` and `silent` are caches derived from the other fields. They are
/// recomputed by the store on every add/modify and cannot be set from outside.
#[derive(Clone)]
pub struct Drawable {
    pub id: RecordId,
    /// Type tag resolved through the shape registry.
    pub shape: String,
    pub zlevel: ZLevel,
    pub invisible: bool,
    pub hoverable: bool,
    pub clickable: bool,
    pub draggable: bool,
    pub position: [f64; 2],
    /// Angle in radians, then rotation origin x, y.
    pub rotation: [f64; 3],
    /// Scale x, y, then scale origin x, y.
    pub scale: [f64; 4],
    pub style: Style,
    /// Style used when the record is painted on the overlay surface.
    pub highlight_style: Option<Style>,
    pub handlers: Handlers,
    pub on_brush: Option<BrushHook>,
    pub on_drift: Option<DriftHook>,
    /// Caller-defined properties; animatable like any other field.
    pub extra: IndexMap<String, Value>,

    needs_transform: bool,
    silent: bool,
}

impl Drawable {
    /// A visible, hoverable record of the given shape type with an identity transform.
    pub fn new(shape: impl Into<String>) -> Self {
        let mut d = Self {
            id: RecordId::default(),
            shape: shape.into(),
            zlevel: ZLevel::default(),
            invisible: false,
            hoverable: true,
            clickable: false,
            draggable: false,
            position: [0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 0.0, 0.0],
            style: Style::new(),
            highlight_style: None,
            handlers: Handlers::default(),
            on_brush: None,
            on_drift: None,
            extra: IndexMap::new(),
            needs_transform: false,
            silent: false,
        };
        d.refresh_derived();
        d
    }

    // ── builders ──────────────────────────────────────────────────────────

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_zlevel(mut self, z: usize) -> Self {
        self.zlevel = ZLevel(z);
        self
    }

    pub fn with_position(mut self, position: [f64; 2]) -> Self {
        self.position = position;
        self.refresh_derived();
        self
    }

    pub fn with_rotation(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = rotation;
        self.refresh_derived();
        self
    }

    pub fn with_scale(mut self, scale: [f64; 4]) -> Self {
        self.scale = scale;
        self.refresh_derived();
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = Some(style);
        self
    }

    pub fn with_invisible(mut self, invisible: bool) -> Self {
        self.invisible = invisible;
        self
    }

    pub fn with_hoverable(mut self, hoverable: bool) -> Self {
        self.hoverable = hoverable;
        self.refresh_derived();
        self
    }

    pub fn with_clickable(mut self, clickable: bool) -> Self {
        self.clickable = clickable;
        self.refresh_derived();
        self
    }

    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self.refresh_derived();
        self
    }

    pub fn on(mut self, kind: EventKind, handler: impl Fn(&Drawable, Vec2) + 'static) -> Self {
        self.handlers.set(kind, Rc::new(handler));
        self.refresh_derived();
        self
    }

    pub fn with_brush_hook(
        mut self,
        hook: impl Fn(&mut PaintCtx<'_>, &Drawable, bool) -> bool + 'static,
    ) -> Self {
        self.on_brush = Some(Rc::new(hook));
        self
    }

    pub fn with_drift_hook(mut self, hook: impl Fn(&mut Drawable, f64, f64) -> bool + 'static) -> Self {
        self.on_drift = Some(Rc::new(hook));
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    // ── derived caches ────────────────────────────────────────────────────

    /// True iff rotation, position or scale differ from identity beyond
    /// [`TRANSFORM_EPSILON`], or the record was drifted.
    #[inline]
    pub fn needs_transform(&self) -> bool {
        self.needs_transform
    }

    /// True iff no interaction flag or handler is set (hit-testing may skip it).
    #[inline]
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub(crate) fn refresh_derived(&mut self) {
        self.silent = !(self.hoverable || self.clickable || self.draggable) && self.handlers.is_empty();
        self.needs_transform = transform_differs(&self.position, &self.rotation, &self.scale);
    }

    pub(crate) fn mark_transformed(&mut self) {
        self.needs_transform = true;
    }

    // ── patches ───────────────────────────────────────────────────────────

    /// Deep-merges `patch` into this record. Does not touch the bucket index; the
    /// store handles moves between buckets.
    pub(crate) fn apply_patch(&mut self, patch: RecordPatch) {
        let RecordPatch {
            shape,
            zlevel,
            invisible,
            hoverable,
            clickable,
            draggable,
            position,
            rotation,
            scale,
            style,
            highlight_style,
            handlers,
            on_brush,
            on_drift,
            extra,
        } = patch;

        if let Some(shape) = shape {
            self.shape = shape;
        }
        if let Some(z) = zlevel {
            self.zlevel = z;
        }
        if let Some(v) = invisible {
            self.invisible = v;
        }
        if let Some(v) = hoverable {
            self.hoverable = v;
        }
        if let Some(v) = clickable {
            self.clickable = v;
        }
        if let Some(v) = draggable {
            self.draggable = v;
        }
        overwrite_prefix(&mut self.position, position.as_deref());
        overwrite_prefix(&mut self.rotation, rotation.as_deref());
        overwrite_prefix(&mut self.scale, scale.as_deref());
        self.style.merge(style);
        if !highlight_style.is_empty() {
            self.highlight_style.get_or_insert_with(Style::new).merge(highlight_style);
        }
        if let Some(handlers) = handlers {
            self.handlers.merge(handlers);
        }
        if on_brush.is_some() {
            self.on_brush = on_brush;
        }
        if on_drift.is_some() {
            self.on_drift = on_drift;
        }
        super::value::merge_maps(&mut self.extra, extra);

        self.style.invalidate_rect();
        self.refresh_derived();
    }

    // ── property access (animation) ───────────────────────────────────────

    /// Reads a top-level property by name. Unknown names fall back to `extra`.
    pub fn prop(&self, key: &str) -> Option<Value> {
        match key {
            "position" => Some(Value::from(self.position)),
            "rotation" => Some(Value::from(self.rotation)),
            "scale" => Some(Value::from(self.scale)),
            "zlevel" => Some(Value::Number(self.zlevel.index() as f64)),
            "invisible" => Some(Value::Bool(self.invisible)),
            "hoverable" => Some(Value::Bool(self.hoverable)),
            "clickable" => Some(Value::Bool(self.clickable)),
            "draggable" => Some(Value::Bool(self.draggable)),
            "shape" => Some(Value::Text(self.shape.clone())),
            "style" => Some(Value::Map(self.style.props().clone())),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// Writes a top-level property by name and refreshes the derived caches.
    ///
    /// Returns `false` when the value does not fit the field. `zlevel` is refused
    /// here because moving buckets is the store's job.
    pub fn set_prop(&mut self, key: &str, value: Value) -> bool {
        let accepted = match key {
            "position" => write_fixed(&mut self.position, &value),
            "rotation" => write_fixed(&mut self.rotation, &value),
            "scale" => write_fixed(&mut self.scale, &value),
            "zlevel" | "shape" => false,
            "invisible" | "hoverable" | "clickable" | "draggable" => {
                let Some(flag) = value.as_bool() else {
                    return false;
                };
                match key {
                    "invisible" => self.invisible = flag,
                    "hoverable" => self.hoverable = flag,
                    "clickable" => self.clickable = flag,
                    _ => self.draggable = flag,
                }
                true
            }
            "style" => match value {
                Value::Map(map) => {
                    *self.style.props_mut() = map;
                    true
                }
                _ => false,
            },
            _ => {
                self.extra.insert(key.to_owned(), value);
                true
            }
        };
        if accepted {
            self.style.invalidate_rect();
            self.refresh_derived();
        }
        accepted
    }

    /// Map reached by following `path` from this record.
    ///
    /// `"style"` and `"highlightStyle"` open the style maps; any other head opens a
    /// map-valued `extra` entry; further segments descend into nested maps.
    pub fn path_map(&self, path: &[String]) -> Option<&IndexMap<String, Value>> {
        let (head, rest) = path.split_first()?;
        let mut map = match head.as_str() {
            "style" => self.style.props(),
            "highlightStyle" => self.highlight_style.as_ref()?.props(),
            other => self.extra.get(other)?.as_map()?,
        };
        for seg in rest {
            map = map.get(seg)?.as_map()?;
        }
        Some(map)
    }

    pub(crate) fn path_map_mut(&mut self, path: &[String]) -> Option<&mut IndexMap<String, Value>> {
        let (head, rest) = path.split_first()?;
        let mut map = match head.as_str() {
            "style" => self.style.props_mut(),
            "highlightStyle" => self.highlight_style.as_mut()?.props_mut(),
            other => self.extra.get_mut(other)?.as_map_mut()?,
        };
        for seg in rest {
            map = map.get_mut(seg)?.as_map_mut()?;
        }
        Some(map)
    }
}

impl fmt::Debug for Drawable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drawable")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("zlevel", &self.zlevel)
            .field("invisible", &self.invisible)
            .field("position", &self.position)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("style", &self.style)
            .field("handlers", &self.handlers)
            .field("needs_transform", &self.needs_transform)
            .field("silent", &self.silent)
            .finish_non_exhaustive()
    }
}

pub(crate) fn transform_differs(position: &[f64], rotation: &[f64], scale: &[f64]) -> bool {
    let off = |v: f64, identity: f64| (v - identity).abs() > TRANSFORM_EPSILON;
    rotation.first().is_some_and(|&r| off(r, 0.0))
        || position.iter().take(2).any(|&p| off(p, 0.0))
        || scale.iter().take(2).any(|&s| off(s, 1.0))
}

fn overwrite_prefix<const N: usize>(dst: &mut [f64; N], src: Option<&[f64]>) {
    if let Some(src) = src {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = *s;
        }
    }
}

/// Element-wise write of a numeric array into a fixed field; non-numeric
/// elements leave their slot untouched.
fn write_fixed<const N: usize>(dst: &mut [f64; N], value: &Value) -> bool {
    let Some(items) = value.as_array() else {
        return false;
    };
    for (slot, item) in dst.iter_mut().zip(items) {
        if let Some(n) = item.as_number() {
            *slot = n;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_identity_and_interactive() {
        let d = Drawable::new("circle");
        assert!(!d.needs_transform());
        assert!(!d.is_silent(), "hoverable by default");
        assert_eq!(d.zlevel, ZLevel(0));
    }

    #[test]
    fn needs_transform_respects_epsilon() {
        assert!(!Drawable::new("circle").with_position([0.00005, 0.0]).needs_transform());
        assert!(Drawable::new("circle").with_position([0.001, 0.0]).needs_transform());
        assert!(Drawable::new("circle").with_rotation([0.5, 0.0, 0.0]).needs_transform());
        assert!(Drawable::new("circle").with_scale([1.0, 2.0, 0.0, 0.0]).needs_transform());
        // origins alone do not count
        assert!(!Drawable::new("circle").with_scale([1.0, 1.0, 40.0, 40.0]).needs_transform());
    }

    #[test]
    fn silent_when_nothing_interactive() {
        let d = Drawable::new("circle").with_hoverable(false);
        assert!(d.is_silent());
        let d = d.on(EventKind::Click, |_, _| {});
        assert!(!d.is_silent());
    }

    #[test]
    fn patch_overwrites_arrays_field_by_field() {
        let mut d = Drawable::new("circle")
            .with_position([10.0, 20.0])
            .with_style(Style::new().with("r", 5.0).with("color", "red"));
        let patch = RecordPatch::new().position(vec![99.0]).style("r", 7.0);
        d.apply_patch(patch);

        assert_eq!(d.position, [99.0, 20.0]);
        assert_eq!(d.style.number("r"), Some(7.0));
        assert_eq!(d.style.text("color"), Some("red"));
    }

    #[test]
    fn set_prop_refreshes_caches() {
        let mut d = Drawable::new("circle");
        assert!(d.set_prop("position", Value::from([5.0, 0.0])));
        assert!(d.needs_transform());
        assert!(!d.set_prop("zlevel", Value::Number(3.0)));
        assert!(d.set_prop("myName", Value::from("kener")));
        assert_eq!(d.prop("myName"), Some(Value::from("kener")));
    }

    #[test]
    fn path_map_descends_nested_maps() {
        let inner: IndexMap<String, Value> = [("w".to_string(), Value::from(5.0))].into_iter().collect();
        let d = Drawable::new("uav").with_style(Style::new().with("shadow", Value::Map(inner)));
        let path = vec!["style".to_string(), "shadow".to_string()];
        assert_eq!(d.path_map(&path).and_then(|m| m.get("w")), Some(&Value::from(5.0)));
        assert!(d.path_map(&["nothing".to_string()]).is_none());
    }
}
