use tiny_skia::Path;

use crate::scene::Style;

use super::polygon::polyline;
use super::{BrushType, Shape};

/// `brokenLine`: open polyline through `pointList`, stroke only.
///
/// `lineType` `dashed`/`dotted` is honoured through the stroke's dash pattern.
#[derive(Debug, Default)]
pub struct BrokenLine;

impl Shape for BrokenLine {
    fn name(&self) -> &str {
        "brokenLine"
    }

    fn build_path(&self, style: &Style) -> Option<Path> {
        let points = style.points("pointList");
        if points.len() < 2 {
            return None;
        }
        polyline(&points).finish()
    }

    fn brush_type_only(&self) -> Option<BrushType> {
        Some(BrushType::Stroke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::scene::Value;

    fn style() -> Style {
        Style::new()
            .with(
                "pointList",
                Value::Array(vec![[10.0, 10.0].into(), [300.0, 20.0].into(), [50.0, 450.0].into()]),
            )
            .with("lineWidth", 20.0)
    }

    #[test]
    fn bounds_include_half_line_width() {
        // fill in the style is ignored for lines
        let style = style().with("brushType", "fill");
        assert_eq!(BrokenLine.bounding_rect(&style), Rect::new(0.0, 0.0, 310.0, 460.0));
    }

    #[test]
    fn fewer_than_two_points_draws_nothing() {
        let style = Style::new().with("pointList", Value::Array(vec![[1.0, 1.0].into()]));
        assert!(BrokenLine.build_path(&style).is_none());
    }
}
