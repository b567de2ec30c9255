use indexmap::IndexMap;
use log::debug;

use crate::scene::{RecordId, SceneStore, Value};

/// Read/write access to the animated properties of one target inside a context `C`.
pub trait Accessor<C> {
    fn get(&self, ctx: &C, key: &str) -> Option<Value>;
    fn set(&self, ctx: &mut C, key: &str, value: Value);

    /// The scene record this accessor writes to, if any.
    fn record_id(&self) -> Option<&RecordId> {
        None
    }
}

/// A record of a [`SceneStore`], or a map nested inside it.
///
/// An empty `path` targets the record's own fields (`position`, `scale`, custom
/// properties, ...). `["style"]` targets the style map; further segments descend
/// into nested maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTarget {
    pub id: RecordId,
    pub path: Vec<String>,
}

impl RecordTarget {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            path: Vec::new(),
        }
    }

    /// Target at a dotted path such as `"style"` or `"style.shadow"`. Empty segments
    /// are ignored.
    pub fn at(id: impl Into<RecordId>, dotted: &str) -> Self {
        Self {
            id: id.into(),
            path: dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl<C> Accessor<C> for RecordTarget
where
    C: AsRef<SceneStore> + AsMut<SceneStore>,
{
    fn get(&self, ctx: &C, key: &str) -> Option<Value> {
        ctx.as_ref().read_prop(self.id.as_str(), &self.path, key)
    }

    fn set(&self, ctx: &mut C, key: &str, value: Value) {
        if !ctx.as_mut().write_prop(self.id.as_str(), &self.path, key, value) {
            debug!("animation write to {}.{key} dropped", self.id);
        }
    }

    fn record_id(&self) -> Option<&RecordId> {
        Some(&self.id)
    }
}

/// The context itself is a flat property map.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapTarget;

impl Accessor<IndexMap<String, Value>> for MapTarget {
    fn get(&self, ctx: &IndexMap<String, Value>, key: &str) -> Option<Value> {
        ctx.get(key).cloned()
    }

    fn set(&self, ctx: &mut IndexMap<String, Value>, key: &str, value: Value) {
        ctx.insert(key.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Drawable, StoreConfig, Style};
    use crate::shape::ShapeRegistry;
    use std::rc::Rc;

    struct Ctx(SceneStore);

    impl AsRef<SceneStore> for Ctx {
        fn as_ref(&self) -> &SceneStore {
            &self.0
        }
    }

    impl AsMut<SceneStore> for Ctx {
        fn as_mut(&mut self) -> &mut SceneStore {
            &mut self.0
        }
    }

    fn ctx() -> Ctx {
        let mut store = SceneStore::new(Rc::new(ShapeRegistry::with_builtins()), StoreConfig::default());
        store.add(Drawable::new("circle").with_id("c").with_style(Style::new().with("r", 10.0)));
        Ctx(store)
    }

    #[test]
    fn dotted_paths_split() {
        assert_eq!(RecordTarget::at("c", "style.shadow").path, ["style", "shadow"]);
        assert!(RecordTarget::at("c", "").path.is_empty());
    }

    #[test]
    fn record_and_style_access() {
        let mut ctx = ctx();
        let record = RecordTarget::new("c");
        let style = RecordTarget::at("c", "style");

        assert_eq!(style.get(&ctx, "r"), Some(Value::Number(10.0)));
        style.set(&mut ctx, "r", Value::Number(20.0));
        assert_eq!(ctx.0.get("c").and_then(|r| r.style.number("r")), Some(20.0));

        record.set(&mut ctx, "position", Value::from([3.0, 4.0]));
        assert_eq!(ctx.0.get("c").map(|r| r.position), Some([3.0, 4.0]));
        assert!(ctx.0.get("c").is_some_and(Drawable::needs_transform));
    }

    #[test]
    fn missing_record_reads_nothing() {
        let mut ctx = ctx();
        let ghost = RecordTarget::new("ghost");
        assert_eq!(ghost.get(&ctx, "position"), None);
        ghost.set(&mut ctx, "position", Value::from([1.0, 1.0]));
        assert!(ctx.0.get("ghost").is_none());
    }
}
