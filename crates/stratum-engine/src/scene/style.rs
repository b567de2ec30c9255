use std::cell::Cell;

use indexmap::IndexMap;

use crate::coords::{Rect, Vec2};

use super::value::{merge_maps, Value};

/// Style mapping of a drawable: ordered `key -> Value` plus a cached bounding rect.
///
/// The cache is filled lazily by whoever asks the shape capability for the bounds and
/// is emptied by every mutation made through this type.
#[derive(Debug, Clone, Default)]
pub struct Style {
    props: IndexMap<String, Value>,
    rect: Cell<Option<Rect>>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.props.get(key).and_then(Value::as_number)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    /// Reads `key` as a list of `[x, y]` pairs; malformed entries are skipped.
    pub fn points(&self, key: &str) -> Vec<Vec2> {
        let Some(items) = self.props.get(key).and_then(Value::as_array) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|p| match p.as_array()? {
                [x, y, ..] => Some(Vec2::new(x.as_number()? as f32, y.as_number()? as f32)),
                _ => None,
            })
            .collect()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.invalidate_rect();
        self.props.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.invalidate_rect();
        self.props.shift_remove(key)
    }

    /// Deep merge of `patch` into this style.
    pub fn merge(&mut self, patch: IndexMap<String, Value>) {
        self.invalidate_rect();
        merge_maps(&mut self.props, patch);
    }

    #[inline]
    pub fn props(&self) -> &IndexMap<String, Value> {
        &self.props
    }

    /// Mutable access to the raw map. Empties the rect cache up front.
    pub fn props_mut(&mut self) -> &mut IndexMap<String, Value> {
        self.invalidate_rect();
        &mut self.props
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    // ── rect cache ────────────────────────────────────────────────────────

    #[inline]
    pub fn cached_rect(&self) -> Option<Rect> {
        self.rect.get()
    }

    #[inline]
    pub(crate) fn store_rect(&self, rect: Rect) {
        self.rect.set(Some(rect));
    }

    #[inline]
    pub fn invalidate_rect(&self) {
        self.rect.set(None);
    }
}

impl PartialEq for Style {
    fn eq(&self, other: &Self) -> bool {
        self.props == other.props
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let props = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { props, rect: Cell::new(None) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mutation_empties_rect_cache() {
        let mut style = Style::new().with("r", 10.0);
        style.store_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        style.set("r", 30.0);
        assert_eq!(style.cached_rect(), None);

        style.store_rect(Rect::new(0.0, 0.0, 60.0, 60.0));
        style.merge(IndexMap::from([("x".to_string(), Value::from(5.0))]));
        assert_eq!(style.cached_rect(), None);

        style.store_rect(Rect::new(0.0, 0.0, 60.0, 60.0));
        let _ = style.props_mut();
        assert_eq!(style.cached_rect(), None);
    }

    #[test]
    fn points_skip_malformed_entries() {
        let style = Style::new().with(
            "pointList",
            Value::Array(vec![
                Value::from([10.0, 10.0]),
                Value::from("nope"),
                Value::from([300.0, 20.0]),
            ]),
        );
        assert_eq!(style.points("pointList"), vec![Vec2::new(10.0, 10.0), Vec2::new(300.0, 20.0)]);
    }

    #[test]
    fn equality_ignores_cache() {
        let a = Style::new().with("r", 1.0);
        let b = a.clone();
        b.store_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(a, b);
    }
}
