//! Retained scene model.
//!
//! Responsibilities:
//! - hold drawable records indexed by id and by depth bucket
//! - track which buckets changed since the last paint
//! - expose property paths so animations can write into records and nested styles

mod dirty;
mod drawable;
mod id;
mod patch;
mod store;
mod style;
mod value;
mod zlevel;

pub use dirty::{DirtySet, DirtyTarget};
pub use drawable::{BrushHook, Drawable, DriftHook, EventKind, Handler, Handlers, TRANSFORM_EPSILON};
pub use id::RecordId;
pub use patch::RecordPatch;
pub use store::{IterOptions, IterOrder, SceneStore, StoreConfig};
pub use style::Style;
pub use value::Value;
pub use zlevel::ZLevel;
