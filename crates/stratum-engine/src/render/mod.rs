//! Layered CPU rendering.
//!
//! Every depth bucket paints into its own [`Surface`]; transient highlight state paints
//! into a separate overlay surface. Hosts present the surfaces stacked in ascending
//! bucket order with the overlay on top (see [`LayeredRenderer::compose`]).
//!
//! Convention:
//! - geometry is in logical pixels (top-left origin, +Y down)
//! - surfaces are `logical size * pixel ratio` device pixels

mod config;
mod host;
mod renderer;
mod stats;
mod surface;

pub use config::{ExportOptions, RenderConfig};
pub use host::{HostContainer, SharedHost};
pub use renderer::{DoneCallback, LayeredRenderer};
pub use stats::RenderStats;
pub use surface::Surface;
