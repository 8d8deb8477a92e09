use crate::{
    IntervalVector,
    error::{IntervalError, IntervalResult},
    interval::{EMPTY, Interval, Offset, Version},
    merge::{self, OpRangePolicy},
};

/// Immutable interval vector backed by a sorted list.
///
/// Useful for vectors received in serialized form, e.g. from another replica:
/// such a vector is only ever queried, never written to, so building a tree
/// is unnecessary. Queries follow the same rules as for
/// [`AvlIntervalVector`](crate::AvlIntervalVector).
#[derive(Debug, Clone, Default)]
pub struct ListIntervalVector {
    intervals: Vec<Interval>,
    policy: OpRangePolicy,
}

impl ListIntervalVector {
    /// Creates a vector from intervals sorted by offset and pairwise disjoint.
    pub fn new(intervals: Vec<Interval>) -> IntervalResult<Self> {
        Self::with_policy(intervals, OpRangePolicy::default())
    }

    /// Creates a vector merging fragments according to `policy`.
    pub fn with_policy(intervals: Vec<Interval>, policy: OpRangePolicy) -> IntervalResult<Self> {
        for interval in &intervals {
            interval.validate()?;
        }
        if let Some(pair) = intervals.windows(2).find(|pair| pair[0].end() > pair[1].begin()) {
            return Err(IntervalError::Unordered {
                prev: pair[0],
                next: pair[1],
            });
        }

        Ok(Self { intervals, policy })
    }

    /// Stored intervals, as given on construction.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Stored intervals overlapping `[begin..end)`.
    fn stored_overlapping(&self, begin: Offset, end: Offset) -> &[Interval] {
        let first = self.intervals.partition_point(|i| i.end() <= begin);
        let last = self.intervals.partition_point(|i| i.begin() < end);
        &self.intervals[first..last.max(first)]
    }
}

impl IntervalVector for ListIntervalVector {
    fn end(&self) -> Offset {
        self.intervals.last().map_or(0, Interval::end)
    }

    fn max_version(&self) -> Version {
        self.intervals
            .iter()
            .map(Interval::version)
            .max()
            .unwrap_or(EMPTY)
    }

    fn overlapping(&self, begin: Offset, end: Offset) -> IntervalResult<Vec<Interval>> {
        if !merge::check_query(begin, end)? {
            return Ok(Vec::new());
        }
        let stored = self.stored_overlapping(begin, end).iter().copied();
        merge::cover(stored, begin, end, self.policy)
    }

    fn slice(&self, begin: Offset, end: Offset) -> IntervalResult<Vec<Interval>> {
        let intervals = self.overlapping(begin, end)?;
        Ok(merge::clip(intervals, begin, end))
    }

    fn serialize(&self) -> IntervalResult<Vec<Interval>> {
        merge::cover(self.intervals.iter().copied(), 0, self.end(), self.policy)
    }
}

impl TryFrom<Vec<Interval>> for ListIntervalVector {
    type Error = IntervalError;

    fn try_from(intervals: Vec<Interval>) -> IntervalResult<Self> {
        Self::new(intervals)
    }
}
