use std::collections::BTreeSet;

/// Buckets changed since the last paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirtySet {
    /// Every bucket, including ones that do not exist yet.
    All,
    Levels(BTreeSet<usize>),
}

/// Argument of [`SceneStore::force_dirty`](super::SceneStore::force_dirty).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DirtyTarget {
    All,
    Level(usize),
}

impl DirtySet {
    pub fn mark(&mut self, level: usize) {
        if let DirtySet::Levels(levels) = self {
            levels.insert(level);
        }
    }

    #[inline]
    pub fn mark_all(&mut self) {
        *self = DirtySet::All;
    }

    pub fn apply(&mut self, target: DirtyTarget) {
        match target {
            DirtyTarget::All => self.mark_all(),
            DirtyTarget::Level(level) => self.mark(level),
        }
    }

    pub fn contains(&self, level: usize) -> bool {
        match self {
            DirtySet::All => true,
            DirtySet::Levels(levels) => levels.contains(&level),
        }
    }

    #[inline]
    pub fn is_all(&self) -> bool {
        matches!(self, DirtySet::All)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DirtySet::Levels(levels) if levels.is_empty())
    }

    pub fn clear(&mut self) {
        *self = DirtySet::default();
    }
}

impl Default for DirtySet {
    fn default() -> Self {
        DirtySet::Levels(BTreeSet::new())
    }
}
