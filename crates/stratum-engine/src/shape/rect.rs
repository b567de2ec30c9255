use tiny_skia::{Path, PathBuilder};

use crate::scene::Style;

use super::Shape;

/// `rectangle`: `x`, `y`, `width`, `height` and an optional corner `radius`.
#[derive(Debug, Default)]
pub struct Rectangle;

impl Shape for Rectangle {
    fn name(&self) -> &str {
        "rectangle"
    }

    fn build_path(&self, style: &Style) -> Option<Path> {
        let n = |k| style.number(k).unwrap_or(0.0) as f32;
        let (x, y, w, h) = (n("x"), n("y"), n("width"), n("height"));
        let rect = tiny_skia::Rect::from_xywh(x, y, w, h)?;

        let r = n("radius").clamp(0.0, w.min(h) / 2.0);
        if r <= 0.0 {
            return Some(PathBuilder::from_rect(rect));
        }

        let (r0, b0) = (x + w, y + h);
        let mut pb = PathBuilder::new();
        pb.move_to(x + r, y);
        pb.line_to(r0 - r, y);
        pb.quad_to(r0, y, r0, y + r);
        pb.line_to(r0, b0 - r);
        pb.quad_to(r0, b0, r0 - r, b0);
        pb.line_to(x + r, b0);
        pb.quad_to(x, b0, x, b0 - r);
        pb.line_to(x, y + r);
        pb.quad_to(x, y, x + r, y);
        pb.close();
        pb.finish()
    }
}
