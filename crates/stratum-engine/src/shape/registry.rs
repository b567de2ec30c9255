use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::{BrokenLine, Circle, Polygon, Rectangle, Shape};

/// Type tag → shape capability.
///
/// A registry may fall back to another (typically a shared one holding the built-ins);
/// local definitions shadow the fallback's.
#[derive(Default)]
pub struct ShapeRegistry {
    shapes: HashMap<String, Rc<dyn Shape>>,
    fallback: Option<Rc<ShapeRegistry>>,
}

impl ShapeRegistry {
    /// Empty registry without fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `circle`, `rectangle`, `polygon` and `brokenLine`.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.define(Rc::new(Circle))
            .define(Rc::new(Rectangle))
            .define(Rc::new(Polygon))
            .define(Rc::new(BrokenLine));
        reg
    }

    /// Empty registry resolving unknown names through `fallback`.
    pub fn layered(fallback: Rc<ShapeRegistry>) -> Self {
        Self {
            shapes: HashMap::new(),
            fallback: Some(fallback),
        }
    }

    /// Registers `shape` under its own name, replacing any previous local definition.
    pub fn define(&mut self, shape: Rc<dyn Shape>) -> &mut Self {
        self.shapes.insert(shape.name().to_owned(), shape);
        self
    }

    pub fn define_as(&mut self, name: impl Into<String>, shape: Rc<dyn Shape>) -> &mut Self {
        self.shapes.insert(name.into(), shape);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Shape> {
        match self.shapes.get(name) {
            Some(shape) => Some(&**shape),
            None => self.fallback.as_deref()?.get(name),
        }
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.shapes.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ShapeRegistry")
            .field("shapes", &names)
            .field("fallback", &self.fallback)
            .finish()
    }
}
