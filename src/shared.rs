use {
    crate::{
        IntervalVector,
        error::IntervalResult,
        interval::{Interval, Offset, Version},
        tree::AvlIntervalVector,
    },
    parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    std::sync::Arc,
};

/// Interval vector shared between threads.
///
/// The vector itself has no internal synchronization, this handle serializes
/// access to it with a read-write lock: queries run concurrently, writes are
/// exclusive. Clones refer to the same vector.
#[derive(Debug, Clone, Default)]
pub struct SharedIntervalVector(Arc<RwLock<AvlIntervalVector>>);

impl From<AvlIntervalVector> for SharedIntervalVector {
    fn from(vector: AvlIntervalVector) -> Self {
        Self(Arc::new(RwLock::new(vector)))
    }
}

impl SharedIntervalVector {
    /// Wraps the given vector.
    pub fn new(vector: AvlIntervalVector) -> Self {
        vector.into()
    }

    /// Locks the vector for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, AvlIntervalVector> {
        self.0.read()
    }

    /// Locks the vector for writing.
    ///
    /// Hold the guard to apply several changes atomically.
    pub fn write(&self) -> RwLockWriteGuard<'_, AvlIntervalVector> {
        self.0.write()
    }

    /// See [`AvlIntervalVector::insert()`].
    pub fn insert(&self, interval: Interval) -> IntervalResult<()> {
        self.write().insert(interval)
    }

    /// See [`AvlIntervalVector::truncate()`].
    pub fn truncate(&self, end: Offset) -> IntervalResult<()> {
        self.write().truncate(end)
    }

    /// Returns the overwrite counter and resets it, atomically.
    pub fn take_overwrites(&self) -> usize {
        let mut vector = self.write();
        let overwrites = vector.overwrites();
        vector.reset_overwrites();
        overwrites
    }
}

impl IntervalVector for SharedIntervalVector {
    fn end(&self) -> Offset {
        self.read().end()
    }

    fn max_version(&self) -> Version {
        self.read().max_version()
    }

    fn overlapping(&self, begin: Offset, end: Offset) -> IntervalResult<Vec<Interval>> {
        self.read().overlapping(begin, end)
    }

    fn slice(&self, begin: Offset, end: Offset) -> IntervalResult<Vec<Interval>> {
        self.read().slice(begin, end)
    }

    fn serialize(&self) -> IntervalResult<Vec<Interval>> {
        self.read().serialize()
    }
}
