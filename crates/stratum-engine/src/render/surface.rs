use tiny_skia::{Pixmap, PremultipliedColorU8, Transform};

use crate::coords::Viewport;
use crate::error::RenderError;
use crate::paint::Color;
use crate::shape::PaintCtx;

/// One offscreen raster target, sized `viewport * pixel_ratio` device pixels.
pub struct Surface {
    pixmap: Pixmap,
    pixel_ratio: f32,
}

impl Surface {
    pub fn new(viewport: Viewport, pixel_ratio: f32) -> Result<Self, RenderError> {
        let (width, height) = viewport.device_size(pixel_ratio);
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            pixel_ratio: sanitize_ratio(pixel_ratio),
        })
    }

    /// Reallocates the backing store. Content is lost.
    pub fn resize(&mut self, viewport: Viewport, pixel_ratio: f32) -> Result<(), RenderError> {
        *self = Self::new(viewport, pixel_ratio)?;
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    #[inline]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    #[inline]
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Logical-to-device transform.
    #[inline]
    pub fn base_transform(&self) -> Transform {
        Transform::from_scale(self.pixel_ratio, self.pixel_ratio)
    }

    pub fn paint_ctx(&mut self) -> PaintCtx<'_> {
        let base = self.base_transform();
        PaintCtx::new(&mut self.pixmap, base)
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    pub fn fill(&mut self, color: Color) {
        self.pixmap.fill(color.to_skia());
    }

    /// Device pixel at (`x`, `y`).
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<PremultipliedColorU8> {
        self.pixmap.pixel(x, y)
    }

    pub fn is_blank(&self) -> bool {
        self.pixmap.data().iter().all(|&b| b == 0)
    }
}

fn sanitize_ratio(ratio: f32) -> f32 {
    if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 }
}
