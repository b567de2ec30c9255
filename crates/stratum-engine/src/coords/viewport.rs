/// Viewport size in logical pixels.
///
/// Surfaces allocate `width * pixel_ratio` by `height * pixel_ratio` device pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Device pixel dimensions for the given ratio, at least 1x1.
    pub fn device_size(self, pixel_ratio: f32) -> (u32, u32) {
        let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        let w = (self.width.max(0.0) * ratio).round() as u32;
        let h = (self.height.max(0.0) * ratio).round() as u32;
        (w.max(1), h.max(1))
    }
}
