use crate::paint::Color;

/// Renderer behaviour switches.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Log and skip records whose draw routine fails instead of aborting the frame.
    pub catch_draw_errors: bool,
    /// Vector-only compatibility mode: image export is unavailable.
    pub legacy_compat: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            catch_draw_errors: true,
            legacy_compat: false,
        }
    }
}

/// Parameters of [`LayeredRenderer::export_image`](super::LayeredRenderer::export_image).
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Painted under the scene; `None` keeps the image transparent.
    pub background: Option<Color>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            background: Some(Color::WHITE),
        }
    }
}
