//! Shape capabilities.
//!
//! A shape type knows how to build its geometry from a style, how to paint a record
//! onto a surface and how to translate a record. Records refer to their type by name;
//! names are resolved through a [`ShapeRegistry`] at paint and drift time.

mod broken_line;
mod circle;
mod common;
mod polygon;
mod rect;
mod registry;

use tiny_skia::{Path, Pixmap, Transform};

use crate::coords::Rect;
use crate::scene::{Drawable, Style};

pub use broken_line::BrokenLine;
pub use circle::Circle;
pub use common::{effective_style, line_width, paint_path, record_transform};
pub use polygon::Polygon;
pub use rect::Rectangle;
pub use registry::ShapeRegistry;

/// How a path is painted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BrushType {
    #[default]
    Fill,
    Stroke,
    Both,
}

impl BrushType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fill" => Some(BrushType::Fill),
            "stroke" => Some(BrushType::Stroke),
            "both" => Some(BrushType::Both),
            _ => None,
        }
    }

    /// Reads `brushType` from a style, defaulting to fill.
    pub fn from_style(style: &Style) -> Self {
        style.text("brushType").and_then(Self::parse).unwrap_or_default()
    }

    #[inline]
    pub fn fills(self) -> bool {
        matches!(self, BrushType::Fill | BrushType::Both)
    }

    #[inline]
    pub fn strokes(self) -> bool {
        matches!(self, BrushType::Stroke | BrushType::Both)
    }
}

/// Paint target handed to shape capabilities and brush hooks.
pub struct PaintCtx<'a> {
    pixmap: &'a mut Pixmap,
    base: Transform,
    repaint: bool,
}

impl<'a> PaintCtx<'a> {
    /// `base` maps logical pixels to device pixels.
    pub fn new(pixmap: &'a mut Pixmap, base: Transform) -> Self {
        Self { pixmap, base, repaint: false }
    }

    #[inline]
    pub fn pixmap(&mut self) -> &mut Pixmap {
        self.pixmap
    }

    #[inline]
    pub fn base_transform(&self) -> Transform {
        self.base
    }

    /// Asks the host for another refresh, e.g. once an asynchronously loaded
    /// resource becomes available.
    pub fn request_repaint(&mut self) {
        self.repaint = true;
    }

    #[inline]
    pub fn repaint_requested(&self) -> bool {
        self.repaint
    }
}

/// Per-type geometry and paint routines.
///
/// Only `name` and `build_path` are required; the rest default to path-based painting,
/// path bounds and translation of `position`.
pub trait Shape {
    /// Type tag under which the shape registers.
    fn name(&self) -> &str;

    /// Geometry in the record's local coordinates. `None` paints nothing.
    fn build_path(&self, style: &Style) -> Option<Path>;

    /// Forces a brush type regardless of the style (lines can only be stroked).
    fn brush_type_only(&self) -> Option<BrushType> {
        None
    }

    /// Untransformed bounds, including half the line width when stroked.
    fn bounding_rect(&self, style: &Style) -> Rect {
        let Some(path) = self.build_path(style) else {
            return Rect::default();
        };
        let b = path.bounds();
        let rect = Rect::new(b.x(), b.y(), b.width(), b.height());
        let brush = self.brush_type_only().unwrap_or_else(|| BrushType::from_style(style));
        if brush.strokes() { rect.inflate(line_width(style) / 2.0) } else { rect }
    }

    fn brush(&self, ctx: &mut PaintCtx<'_>, record: &Drawable, is_overlay: bool) -> anyhow::Result<()> {
        let style = effective_style(record, is_overlay);
        paint_path(self, ctx, record, &style)
    }

    fn drift(&self, record: &mut Drawable, dx: f64, dy: f64) -> anyhow::Result<()> {
        record.position[0] += dx;
        record.position[1] += dy;
        Ok(())
    }
}
