use tiny_skia::{Path, PathBuilder};

use crate::coords::Rect;
use crate::scene::Style;

use super::{line_width, BrushType, Shape};

/// `circle`: center `x`, `y` and radius `r`.
#[derive(Debug, Default)]
pub struct Circle;

impl Shape for Circle {
    fn name(&self) -> &str {
        "circle"
    }

    fn build_path(&self, style: &Style) -> Option<Path> {
        let (x, y, r) = geometry(style);
        if r <= 0.0 {
            return None;
        }
        PathBuilder::from_circle(x, y, r)
    }

    fn bounding_rect(&self, style: &Style) -> Rect {
        let (x, y, r) = geometry(style);
        let r = r.max(0.0);
        let rect = Rect::new(x - r, y - r, 2.0 * r, 2.0 * r);
        if BrushType::from_style(style).strokes() {
            rect.inflate(line_width(style) / 2.0)
        } else {
            rect
        }
    }
}

fn geometry(style: &Style) -> (f32, f32, f32) {
    let n = |k| style.number(k).unwrap_or(0.0) as f32;
    (n("x"), n("y"), n("r"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_analytic() {
        let style = Style::new().with("x", 100.0).with("y", 50.0).with("r", 10.0);
        assert_eq!(Circle.bounding_rect(&style), Rect::new(90.0, 40.0, 20.0, 20.0));

        let stroked = style.with("brushType", "both").with("lineWidth", 4.0);
        assert_eq!(Circle.bounding_rect(&stroked), Rect::new(88.0, 38.0, 24.0, 24.0));
    }

    #[test]
    fn zero_radius_has_no_path() {
        assert!(Circle.build_path(&Style::new().with("x", 1.0)).is_none());
    }
}
