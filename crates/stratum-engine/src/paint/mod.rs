//! Paint model shared between styles and the rasterizer.
//!
//! Colors are stored premultiplied; style strings (`"#ff0000"`, `"rgba(...)"`)
//! are parsed at paint time.

pub mod color;

pub use color::Color;
