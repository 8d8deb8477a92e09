use {
    crate::{
        error::{IntervalError, IntervalResult},
        interval::{Interval, Offset},
    },
    tracing::error,
};

/// Rule deciding whether two adjacent fragments of the same write may merge.
///
/// Fragments with equal version and writer id are expected to come from one
/// write operation, so they must agree on the op-range. Disagreement is a
/// consistency violation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpRangePolicy {
    /// Op-ranges must be identical.
    #[default]
    Exact,

    /// Op-ranges must be identical or directly adjacent.
    ///
    /// Adjacent op-ranges occur when one writer issues back-to-back writes
    /// under a single version. The merged interval spans the union of both
    /// op-ranges.
    Contiguous,
}

impl OpRangePolicy {
    /// Merges `right` into `left`, the two being adjacent and written by the
    /// same version and writer.
    fn merge(self, left: &Interval, right: &Interval) -> IntervalResult<Interval> {
        debug_assert_eq!(left.end(), right.begin());

        if left.is_empty() {
            // Gaps have no originating write.
            return Ok(Interval::empty(left.begin(), right.end()));
        }

        let merged = left.respan(left.begin(), right.end());
        if left.op_range() == right.op_range() {
            return Ok(merged);
        }
        match self {
            OpRangePolicy::Contiguous if left.op_end() == right.op_begin() => {
                Ok(merged.with_op_range(left.op_begin(), right.op_end()))
            }
            _ => {
                error!(
                    version = left.version(),
                    id = left.id(),
                    left = %left,
                    left_op = ?left.op_range(),
                    right = %right,
                    right_op = ?right.op_range(),
                    "inconsistent op-ranges for the same write"
                );
                Err(IntervalError::ConsistencyViolation {
                    left: *left,
                    right: *right,
                })
            }
        }
    }
}

/// Accumulates an ordered run of intervals, collapsing adjacent intervals of
/// the same writer.
pub(crate) struct Coalescer {
    policy: OpRangePolicy,
    intervals: Vec<Interval>,
}

impl Coalescer {
    pub(crate) fn new(policy: OpRangePolicy) -> Self {
        Self {
            policy,
            intervals: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, interval: Interval) -> IntervalResult<()> {
        if let Some(last) = self.intervals.last_mut() {
            if last.end() == interval.begin() && last.same_writer(&interval) {
                *last = self.policy.merge(last, &interval)?;
                return Ok(());
            }
        }
        self.intervals.push(interval);
        Ok(())
    }

    pub(crate) fn finish(self) -> Vec<Interval> {
        self.intervals
    }
}

/// Covers `[begin..end)` with the given stored intervals.
///
/// `stored` must be sorted, pairwise disjoint and contain exactly the stored
/// intervals overlapping the range. They are kept verbatim (the first and the
/// last may overhang the range), uncovered parts are filled with empty
/// intervals and adjacent intervals of the same writer are merged.
pub(crate) fn cover<I>(
    stored: I,
    begin: Offset,
    end: Offset,
    policy: OpRangePolicy,
) -> IntervalResult<Vec<Interval>>
where
    I: IntoIterator<Item = Interval>,
{
    let mut acc = Coalescer::new(policy);
    let mut cursor = begin;

    for interval in stored {
        if interval.begin() > cursor {
            acc.push(Interval::empty(cursor, interval.begin()))?;
        }
        cursor = cursor.max(interval.end());
        acc.push(interval)?;
    }

    if cursor < end {
        acc.push(Interval::empty(cursor, end))?;
    }

    Ok(acc.finish())
}

/// Clips the first and the last interval to `[begin..end)`.
pub(crate) fn clip(mut intervals: Vec<Interval>, begin: Offset, end: Offset) -> Vec<Interval> {
    if let Some(first) = intervals.first_mut() {
        *first = first.clipped(begin, end);
    }
    if let Some(last) = intervals.last_mut() {
        *last = last.clipped(begin, end);
    }
    intervals
}

/// Validates a query range.
///
/// Returns `false` when the range is empty and there is nothing to query.
pub(crate) fn check_query(begin: Offset, end: Offset) -> IntervalResult<bool> {
    if begin < 0 {
        return Err(IntervalError::NegativeOffset(begin));
    }
    if begin > end {
        return Err(IntervalError::InvalidRange { begin, end });
    }
    Ok(begin < end)
}
