//! Interval version vectors.
//!
//! An interval version vector partitions the byte range `[0..end)` of a
//! stored object into non-overlapping intervals, each tagged with the version
//! and identity of the write that last touched it. Replicas use it to find
//! out, for any offset, which write owns the data there: the basis for
//! reconstructing diverged replicas and checking consistency after partial
//! writes.
//!
//! ```
//! use interval_vector::{AvlIntervalVector, EMPTY, Interval, IntervalVector};
//!
//! let mut vector = AvlIntervalVector::new();
//! vector.insert(Interval::new(0, 2048, 1))?;
//! vector.insert(Interval::new(512, 1536, 2))?;
//!
//! assert_eq!(
//!     vector.overlapping(0, 4096)?,
//!     vec![
//!         Interval::new(0, 512, 1),
//!         Interval::new(512, 1536, 2),
//!         Interval::new(1536, 2048, 1),
//!         Interval::new(2048, 4096, EMPTY),
//!     ]
//! );
//! assert_eq!(vector.slice(100, 600)?, vec![
//!     Interval::new(100, 512, 1),
//!     Interval::new(512, 600, 2),
//! ]);
//! # Ok::<(), interval_vector::IntervalError>(())
//! ```

mod builder;
mod error;
mod hash;
mod interval;
mod list;
mod merge;
mod node;
mod shared;
mod tree;

#[cfg(test)]
mod proptests;

use auto_impl::auto_impl;

pub use {
    builder::IntervalVectorBuilder,
    error::{IntervalError, IntervalResult},
    hash::{VectorHasher, digest},
    interval::{EMPTY, Interval, Offset, Version, WriterId},
    list::ListIntervalVector,
    merge::OpRangePolicy,
    node::Iter,
    shared::SharedIntervalVector,
    tree::AvlIntervalVector,
};

/// Read access to an interval version vector.
///
/// Queries never return stored data as is: uncovered bytes are filled with
/// [`EMPTY`] intervals and adjacent intervals of the same write are merged.
/// Merging fails with [`IntervalError::ConsistencyViolation`] whenever two
/// such intervals disagree on the range of the write that produced them.
#[auto_impl(&, Box, Arc)]
pub trait IntervalVector {
    /// End of the represented range `[0..end)`.
    fn end(&self) -> Offset;

    /// Highest version written to the vector, [`EMPTY`] if none.
    fn max_version(&self) -> Version;

    /// Returns, in order, intervals overlapping `[begin..end)`.
    ///
    /// Stored intervals are returned whole, even if they stick out of the
    /// query range. Gaps within the range (including the part past
    /// [`end()`](Self::end)) are filled with empty intervals.
    fn overlapping(&self, begin: Offset, end: Offset) -> IntervalResult<Vec<Interval>>;

    /// Same as [`overlapping()`](Self::overlapping), but the result is
    /// clipped to exactly partition `[begin..end)`.
    fn slice(&self, begin: Offset, end: Offset) -> IntervalResult<Vec<Interval>>;

    /// Canonical, minimal partition of `[0..end)`.
    ///
    /// Re-inserting the returned intervals into a fresh vector yields a
    /// vector serializing to the same sequence.
    fn serialize(&self) -> IntervalResult<Vec<Interval>>;

    /// Digest of the canonical partition.
    ///
    /// Replicas holding the same partition produce equal digests.
    fn digest(&self) -> IntervalResult<u64> {
        Ok(digest(&self.serialize()?))
    }
}
