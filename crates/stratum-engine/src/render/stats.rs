/// Counters kept by the renderer since construction.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub surface_allocations: u64,
    /// Effective resizes (dimension changes), not calls.
    pub resizes: u64,
    pub full_renders: u64,
    pub incremental_renders: u64,
    pub overlay_renders: u64,
    /// Failed draws, caught or not.
    pub draw_failures: u64,
}
