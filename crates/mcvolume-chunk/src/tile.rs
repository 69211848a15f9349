use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use fastnbt::Value;

/// Shared handle to a voxel's NBT payload.
///
/// Clones point at the same tree: an edit made through any handle, including
/// the one the caller kept after storing it in a chunk, is seen by every
/// later read.
#[derive(Clone, Debug)]
pub struct TileData(Arc<RwLock<Value>>);

impl TileData {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// An empty compound tag.
    pub fn empty_compound() -> Self {
        Self::new(Value::Compound(Default::default()))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when both handles share one payload.
    #[inline]
    pub fn ptr_eq(&self, other: &TileData) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Value> for TileData {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl PartialEq for TileData {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.read() == *other.read()
    }
}
