use tiny_skia::{Path, PathBuilder};

use crate::coords::Vec2;
use crate::scene::Style;

use super::Shape;

/// `polygon`: closed outline through `pointList`.
#[derive(Debug, Default)]
pub struct Polygon;

impl Shape for Polygon {
    fn name(&self) -> &str {
        "polygon"
    }

    fn build_path(&self, style: &Style) -> Option<Path> {
        let points = style.points("pointList");
        if points.len() < 2 {
            return None;
        }
        let mut pb = polyline(&points);
        pb.close();
        pb.finish()
    }
}

pub(super) fn polyline(points: &[Vec2]) -> PathBuilder {
    let mut pb = PathBuilder::new();
    if let Some((first, rest)) = points.split_first() {
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::scene::Value;

    #[test]
    fn bounds_cover_points() {
        let style = Style::new().with(
            "pointList",
            Value::Array(vec![[10.0, 10.0].into(), [300.0, 20.0].into(), [50.0, 450.0].into()]),
        );
        assert_eq!(Polygon.bounding_rect(&style), Rect::new(10.0, 10.0, 290.0, 440.0));
    }

    #[test]
    fn single_point_has_no_path() {
        let style = Style::new().with("pointList", Value::Array(vec![[1.0, 1.0].into()]));
        assert!(Polygon.build_path(&style).is_none());
    }
}
