use {
    super::{AvlIntervalVector, Interval, IntervalError, IntervalResult, Offset, OpRangePolicy},
    tracing::trace,
};

/// Interval vector builder.
///
/// Restores a vector from seed intervals (typically the output of
/// [`serialize()`](crate::IntervalVector::serialize) read back from storage)
/// and configures how it treats fragments of the same write.
pub struct IntervalVectorBuilder {
    intervals: Vec<Interval>,
    end: Offset,
    policy: OpRangePolicy,
}

impl Default for IntervalVectorBuilder {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl IntervalVectorBuilder {
    /// Create new builder, seeded with the given intervals.
    ///
    /// Seed intervals are inserted in iteration order, so later ones overwrite
    /// earlier ones where they overlap.
    pub fn new<I: IntoIterator<Item = Interval>>(intervals: I) -> Self {
        Self {
            intervals: intervals.into_iter().collect(),
            end: 0,
            policy: OpRangePolicy::default(),
        }
    }

    /// Set the initial extent of the vector.
    ///
    /// The extent still grows to cover the seed intervals.
    pub fn with_end(self, end: Offset) -> Self {
        Self { end, ..self }
    }

    /// Set the rule for merging adjacent fragments of the same write.
    pub fn with_op_range_policy(self, policy: OpRangePolicy) -> Self {
        Self { policy, ..self }
    }

    /// Build the vector.
    ///
    /// Fails on the first invalid seed interval.
    pub fn build(self) -> IntervalResult<AvlIntervalVector> {
        if self.end < 0 {
            return Err(IntervalError::NegativeOffset(self.end));
        }

        let mut vector = AvlIntervalVector::with_policy(self.policy);
        vector.extend_to(self.end);
        let seeded = self.intervals.len();
        for interval in self.intervals {
            vector.insert(interval)?;
        }
        // Restoring is not a sequence of new writes.
        vector.reset_overwrites();

        trace!(seeded, end = self.end, policy = ?self.policy, "interval vector built");
        Ok(vector)
    }
}
