use std::fmt;
use std::ops::ControlFlow;
use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::coords::Rect;
use crate::error::SceneError;
use crate::shape::ShapeRegistry;

use super::dirty::{DirtySet, DirtyTarget};
use super::drawable::Drawable;
use super::id::IdGenerator;
use super::patch::RecordPatch;
use super::value::Value;
use super::RecordId;

/// Store behaviour switches.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Log and swallow failures raised by a shape's drift routine instead of returning them.
    pub catch_drift_errors: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { catch_drift_errors: true }
    }
}

/// Bucket walk order for [`SceneStore::iterate`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum IterOrder {
    /// Back to front (paint order).
    Ascending,
    /// Front to back (hit-test order): top bucket first, last-added record first.
    #[default]
    Descending,
    /// Id index order.
    Unordered,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct IterOptions {
    /// Visit overlay entries before regular records.
    pub overlay: bool,
    pub order: IterOrder,
}

impl IterOptions {
    pub fn ascending() -> Self {
        Self { overlay: false, order: IterOrder::Ascending }
    }

    pub fn descending() -> Self {
        Self { overlay: false, order: IterOrder::Descending }
    }

    pub fn unordered() -> Self {
        Self { overlay: false, order: IterOrder::Unordered }
    }

    pub fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }
}

/// Indexed collection of drawable records.
///
/// Records are reachable by id and by depth bucket. Every mutation marks the buckets it
/// touched in the dirty set; the renderer consumes and clears that set.
pub struct SceneStore {
    registry: Rc<ShapeRegistry>,
    config: StoreConfig,
    ids: IdGenerator,
    records: IndexMap<RecordId, Drawable>,
    buckets: Vec<Vec<RecordId>>,
    hover: Vec<Drawable>,
    max_bucket: usize,
    dirty: DirtySet,
}

impl SceneStore {
    pub fn new(registry: Rc<ShapeRegistry>, config: StoreConfig) -> Self {
        Self {
            registry,
            config,
            ids: IdGenerator::default(),
            records: IndexMap::new(),
            buckets: Vec::new(),
            hover: Vec::new(),
            max_bucket: 0,
            dirty: DirtySet::default(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &Rc<ShapeRegistry> {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Fresh id, `prefix` followed by a counter that is never reused.
    pub fn new_id(&mut self, prefix: Option<&str>) -> RecordId {
        self.ids.next(prefix)
    }

    // ── records ───────────────────────────────────────────────────────────

    /// Inserts `record`, generating an id when it has none.
    ///
    /// A record with an id already present replaces the previous one.
    pub fn add(&mut self, mut record: Drawable) -> &mut Self {
        if record.id.is_empty() {
            record.id = self.ids.next(None);
        }
        if self.remove_record(record.id.as_str()).is_some() {
            debug!("record {} replaced", record.id);
        }
        record.refresh_derived();

        let level = record.zlevel.index();
        self.bucket_mut(level).push(record.id.clone());
        self.max_bucket = self.max_bucket.max(level);
        self.dirty.mark(level);
        self.records.insert(record.id.clone(), record);
        self
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Drawable> {
        self.records.get(id)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Drawable> {
        self.records.get_mut(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Deep-merges `patch` into the record. Unknown ids are ignored.
    pub fn modify(&mut self, id: &str, patch: RecordPatch) -> &mut Self {
        let Some(record) = self.records.get_mut(id) else {
            return self;
        };
        let old = record.zlevel.index();
        record.apply_patch(patch);
        let new = record.zlevel.index();

        self.dirty.mark(old);
        self.dirty.mark(new);
        if old != new {
            if let Some(bucket) = self.buckets.get_mut(old) {
                bucket.retain(|b| b.as_str() != id);
            }
            self.bucket_mut(new).push(RecordId::from(id));
            self.max_bucket = self.max_bucket.max(new);
        }
        self
    }

    /// Removes one record, or everything (overlay included) when `id` is `None`.
    pub fn delete(&mut self, id: Option<&str>) -> &mut Self {
        match id {
            Some(id) => {
                self.remove_record(id);
            }
            None => {
                self.records.clear();
                self.buckets.clear();
                self.hover.clear();
                self.max_bucket = 0;
                self.dirty.mark_all();
            }
        }
        self
    }

    /// Translates a record through its drift hook or its shape's drift routine.
    ///
    /// Unknown ids are ignored. Failures are logged unless
    /// [`StoreConfig::catch_drift_errors`] is off, in which case they are returned after
    /// the bucket has been marked dirty.
    pub fn drift(&mut self, id: &str, dx: f64, dy: f64) -> Result<&mut Self, SceneError> {
        let registry = Rc::clone(&self.registry);
        let Some(record) = self.records.get_mut(id) else {
            return Ok(self);
        };

        let outcome = drift_record(&registry, record, dx, dy);
        record.mark_transformed();
        record.style.invalidate_rect();
        self.dirty.mark(record.zlevel.index());

        match outcome {
            Ok(()) => Ok(self),
            Err(err) if self.config.catch_drift_errors => {
                warn!("{err}");
                Ok(self)
            }
            Err(err) => Err(err),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bounding rect of a record's geometry, cached on its style until the next mutation.
    pub fn bounding_rect(&self, id: &str) -> Option<Rect> {
        let record = self.records.get(id)?;
        if let Some(rect) = record.style.cached_rect() {
            return Some(rect);
        }
        let shape = self.registry.get(&record.shape)?;
        let rect = shape.bounding_rect(&record.style);
        record.style.store_rect(rect);
        Some(rect)
    }

    // ── overlay entries ───────────────────────────────────────────────────

    /// Queues a transient entry for the next overlay paint. Not indexed by id.
    pub fn add_hover_entry(&mut self, mut entry: Drawable) -> &mut Self {
        entry.refresh_derived();
        self.hover.push(entry);
        self
    }

    pub fn clear_hover_entries(&mut self) -> &mut Self {
        self.hover.clear();
        self
    }

    #[inline]
    pub fn has_hover_entries(&self) -> bool {
        !self.hover.is_empty()
    }

    #[inline]
    pub fn hover_entries(&self) -> &[Drawable] {
        &self.hover
    }

    // ── iteration ─────────────────────────────────────────────────────────

    /// Visits records in the requested order until `f` breaks.
    ///
    /// Returns `Break` iff the walk was stopped early.
    pub fn iterate<F>(&self, options: IterOptions, mut f: F) -> ControlFlow<()>
    where
        F: FnMut(&Drawable) -> ControlFlow<()>,
    {
        if options.overlay {
            for entry in &self.hover {
                f(entry)?;
            }
        }
        match options.order {
            IterOrder::Ascending => {
                for level in 0..self.buckets.len() {
                    for record in self.records_in(level) {
                        f(record)?;
                    }
                }
            }
            IterOrder::Descending => {
                for bucket in self.buckets.iter().rev() {
                    for id in bucket.iter().rev() {
                        if let Some(record) = self.records.get(id.as_str()) {
                            f(record)?;
                        }
                    }
                }
            }
            IterOrder::Unordered => {
                for record in self.records.values() {
                    f(record)?;
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Records of one bucket in insertion order.
    pub fn records_in(&self, level: usize) -> impl Iterator<Item = &Drawable> + '_ {
        self.buckets
            .get(level)
            .into_iter()
            .flatten()
            .filter_map(|id| self.records.get(id.as_str()))
    }

    // ── bookkeeping ───────────────────────────────────────────────────────

    #[inline]
    pub fn max_bucket(&self) -> usize {
        self.max_bucket
    }

    #[inline]
    pub fn dirty_buckets(&self) -> &DirtySet {
        &self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn force_dirty(&mut self, target: DirtyTarget) {
        self.dirty.apply(target);
    }

    // ── property paths (animation) ────────────────────────────────────────

    /// True iff `path` leads to a map on the record (`[]` is the record itself).
    pub fn resolves_path(&self, id: &str, path: &[String]) -> bool {
        self.records
            .get(id)
            .is_some_and(|r| path.is_empty() || r.path_map(path).is_some())
    }

    pub(crate) fn read_prop(&self, id: &str, path: &[String], key: &str) -> Option<Value> {
        let record = self.records.get(id)?;
        if path.is_empty() {
            record.prop(key)
        } else {
            record.path_map(path)?.get(key).cloned()
        }
    }

    /// Writes one property without marking anything dirty. Bucket moves go through
    /// [`modify`](Self::modify) so the bucket index stays consistent.
    pub(crate) fn write_prop(&mut self, id: &str, path: &[String], key: &str, value: Value) -> bool {
        if path.is_empty() && key == "zlevel" {
            let Some(z) = value.as_number().filter(|z| *z >= 0.0) else {
                return false;
            };
            self.modify(id, RecordPatch::new().zlevel(z.round() as usize));
            return true;
        }
        let Some(record) = self.records.get_mut(id) else {
            return false;
        };
        if path.is_empty() {
            return record.set_prop(key, value);
        }
        match record.path_map_mut(path) {
            Some(map) => {
                map.insert(key.to_owned(), value);
                true
            }
            None => false,
        }
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn bucket_mut(&mut self, level: usize) -> &mut Vec<RecordId> {
        if self.buckets.len() <= level {
            self.buckets.resize_with(level + 1, Vec::new);
        }
        &mut self.buckets[level]
    }

    fn remove_record(&mut self, id: &str) -> Option<Drawable> {
        let record = self.records.shift_remove(id)?;
        let level = record.zlevel.index();
        if let Some(bucket) = self.buckets.get_mut(level) {
            bucket.retain(|b| b.as_str() != id);
        }
        self.dirty.mark(level);
        Some(record)
    }
}

fn drift_record(registry: &ShapeRegistry, record: &mut Drawable, dx: f64, dy: f64) -> Result<(), SceneError> {
    if let Some(hook) = record.on_drift.clone() {
        if hook(record, dx, dy) {
            return Ok(());
        }
    }
    let Some(shape) = registry.get(&record.shape) else {
        return Err(SceneError::UnknownShape {
            shape: record.shape.clone(),
            id: record.id.clone(),
        });
    };
    shape.drift(record, dx, dy).map_err(|cause| SceneError::Drift {
        shape: record.shape.clone(),
        id: record.id.clone(),
        cause,
    })
}

impl fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneStore")
            .field("records", &self.records.len())
            .field("buckets", &self.buckets)
            .field("hover", &self.hover.len())
            .field("max_bucket", &self.max_bucket)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
