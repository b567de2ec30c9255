use std::fmt;

/// Depth bucket of a drawable.
///
/// Bucket 0 is farthest back; higher buckets paint later (on top). Each bucket owns
/// one rendering surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ZLevel(pub usize);

impl ZLevel {
    #[inline]
    pub const fn new(v: usize) -> Self {
        Self(v)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ZLevel {
    #[inline]
    fn from(v: usize) -> Self {
        Self(v)
    }
}

impl fmt::Display for ZLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "z{}", self.0)
    }
}
