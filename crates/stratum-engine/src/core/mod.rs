//! Engine facade.
//!
//! [`Engine`] owns a [`Stage`] (store, renderer and the set of animating records) and
//! an animation scheduler ticking over it. Teardown runs in dependency order:
//! scheduler, then store, then surfaces.

mod engine;
mod stage;

pub use engine::{Engine, EngineConfig};
pub use stage::Stage;
