use std::cell::Cell;
use std::rc::Rc;

use crate::coords::Viewport;

/// Embedding side of the renderer: reports the drawable area and its pixel density.
pub trait HostContainer {
    /// Size in logical pixels.
    fn viewport(&self) -> Viewport;

    /// Device pixels per logical pixel.
    fn pixel_ratio(&self) -> f32 {
        1.0
    }
}

/// A fixed-size host at ratio 1.
impl HostContainer for Viewport {
    fn viewport(&self) -> Viewport {
        *self
    }
}

/// Host whose size is changed from outside (layout code, window events).
///
/// Clones share the same size.
#[derive(Debug, Clone)]
pub struct SharedHost {
    viewport: Rc<Cell<Viewport>>,
    pixel_ratio: f32,
}

impl SharedHost {
    pub fn new(viewport: Viewport, pixel_ratio: f32) -> Self {
        Self {
            viewport: Rc::new(Cell::new(viewport)),
            pixel_ratio,
        }
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        self.viewport.set(viewport);
    }
}

impl HostContainer for SharedHost {
    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }
}
