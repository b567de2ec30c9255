use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
///
/// Used as the cached bounding box of a drawable's style.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Smallest rect containing every point. Empty input yields a zero rect.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Rect::default();
        };
        let (lo, hi) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Rect::new(lo.x, lo.y, hi.x - lo.x, hi.y - lo.y)
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let (mut x, mut w) = (self.origin.x, self.size.x);
        let (mut y, mut h) = (self.origin.y, self.size.y);
        if w < 0.0 {
            x += w;
            w = -w;
        }
        if h < 0.0 {
            y += h;
            h = -h;
        }
        Rect::new(x, y, w, h)
    }

    /// Grows the rect by `d` on every side (stroke width allowance).
    #[inline]
    pub fn inflate(self, d: f32) -> Self {
        let r = self.normalized();
        Rect::new(r.origin.x - d, r.origin.y - d, r.size.x + 2.0 * d, r.size.y + 2.0 * d)
    }
}
