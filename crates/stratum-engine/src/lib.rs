//! Stratum engine crate.
//!
//! A retained-mode 2D scene renderer. Records live in a [`SceneStore`] grouped into
//! depth buckets; a [`LayeredRenderer`] keeps one raster surface per bucket and
//! repaints only the buckets marked dirty; an [`AnimationScheduler`] interpolates
//! keyframe tracks onto records and asks the renderer to repaint them. [`Engine`]
//! ties the three together.

pub mod animation;
pub mod coords;
pub mod core;
pub mod error;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
pub mod shape;
pub mod time;

pub use animation::{AnimationBuilder, AnimationScheduler, Easing, RecordTarget};
pub use crate::core::{Engine, EngineConfig, Stage};
pub use error::{RenderError, SceneError};
pub use render::{LayeredRenderer, RenderConfig};
pub use scene::{Drawable, RecordId, RecordPatch, SceneStore, Style, Value};
pub use shape::{Shape, ShapeRegistry};
