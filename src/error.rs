use crate::interval::{Interval, Offset, WriterId};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum IntervalError {
    /// Offsets are positions in a byte range and cannot be negative.
    #[error("Negative offset: {0}")]
    NegativeOffset(Offset),

    /// Interval or query range is empty or inverted.
    #[error("Invalid range: [{begin}, {end})")]
    InvalidRange { begin: Offset, end: Offset },

    /// Operation range does not cover the interval it was attached to.
    #[error("Operation range [{op_begin}, {op_end}) does not cover [{begin}, {end})")]
    OpRangeMismatch {
        begin: Offset,
        end: Offset,
        op_begin: Offset,
        op_end: Offset,
    },

    /// Interval marked as unwritten carries the id of a writer.
    #[error("Empty interval [{begin}, {end}) attributed to writer {id}")]
    EmptyWithWriter {
        begin: Offset,
        end: Offset,
        id: WriterId,
    },

    /// Intervals are not sorted by offset or overlap each other.
    #[error("Unordered intervals: {prev} followed by {next}")]
    Unordered { prev: Interval, next: Interval },

    /// Adjacent intervals of the same write disagree on the operation range.
    ///
    /// Stored data is contradictory, most likely two unrelated writes were
    /// issued with the same version and id.
    #[error("Inconsistent operation ranges for the same write: {left:?} and {right:?}")]
    ConsistencyViolation { left: Interval, right: Interval },
}

impl IntervalError {
    /// Whether the error signals corrupted state rather than a bad argument.
    pub fn is_fatal(&self) -> bool {
        matches!(self, IntervalError::ConsistencyViolation { .. })
    }
}

pub type IntervalResult<T> = Result<T, IntervalError>;
