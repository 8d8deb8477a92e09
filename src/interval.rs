use {
    crate::error::{IntervalError, IntervalResult},
    std::{
        fmt,
        hash::{Hash, Hasher},
        ops::Range,
    },
};

/// Position of a byte in the vector.
pub type Offset = i64;

/// Version of the write that owns a byte range.
pub type Version = i64;

/// Identity of the writer (operation) that produced an interval.
pub type WriterId = i64;

/// Version reserved for unwritten byte ranges.
pub const EMPTY: Version = -1;

/// A half-open byte range tagged with the write that produced it.
///
/// Range bounded inclusively below and exclusively above i.e.
/// `[begin..end)`. Besides the version and writer id, every interval remembers
/// the range the original write operation covered (the op-range), before any
/// clipping by later overlapping writes.
///
/// Equality and hashing consider the byte range, version and writer id only:
/// a clipped fragment of a write is equal to an unclipped interval over the
/// same bytes. The op-range is verified whenever fragments get merged.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    begin: Offset,
    end: Offset,
    version: Version,
    id: WriterId,
    op_begin: Offset,
    op_end: Offset,
}

impl Interval {
    /// Creates an interval written by the operation identified by `version`.
    ///
    /// The writer id defaults to the version and the op-range to the interval
    /// itself.
    pub fn new(begin: Offset, end: Offset, version: Version) -> Self {
        Self::with_id(begin, end, version, version)
    }

    /// Creates an interval with an explicit writer id.
    pub fn with_id(begin: Offset, end: Offset, version: Version, id: WriterId) -> Self {
        Self {
            begin,
            end,
            version,
            id,
            op_begin: begin,
            op_end: end,
        }
    }

    /// Creates an unwritten interval.
    pub fn empty(begin: Offset, end: Offset) -> Self {
        Self::new(begin, end, EMPTY)
    }

    /// Replaces the op-range, i.e. the full range of the originating write.
    pub fn with_op_range(self, op_begin: Offset, op_end: Offset) -> Self {
        Self {
            op_begin,
            op_end,
            ..self
        }
    }

    pub fn begin(&self) -> Offset {
        self.begin
    }

    pub fn end(&self) -> Offset {
        self.end
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn id(&self) -> WriterId {
        self.id
    }

    pub fn op_begin(&self) -> Offset {
        self.op_begin
    }

    pub fn op_end(&self) -> Offset {
        self.op_end
    }

    /// Byte range of the interval.
    pub fn range(&self) -> Range<Offset> {
        self.begin..self.end
    }

    /// Byte range of the write that produced the interval.
    pub fn op_range(&self) -> Range<Offset> {
        self.op_begin..self.op_end
    }

    /// Number of bytes covered.
    pub fn len(&self) -> Offset {
        self.end - self.begin
    }

    /// Whether the interval marks unwritten bytes.
    pub fn is_empty(&self) -> bool {
        self.version == EMPTY
    }

    /// Check if the given offset is in the interval.
    pub fn contains(&self, offset: Offset) -> bool {
        offset >= self.begin && offset < self.end
    }

    /// Check if the interval shares at least one byte with `[begin..end)`.
    pub fn overlaps(&self, begin: Offset, end: Offset) -> bool {
        begin < self.end && self.begin < end
    }

    /// Check if the interval lies entirely inside `[begin..end)`.
    pub fn is_within(&self, begin: Offset, end: Offset) -> bool {
        begin <= self.begin && self.end <= end
    }

    /// Whether both intervals were produced by the same version and writer.
    pub fn same_writer(&self, other: &Interval) -> bool {
        self.version == other.version && self.id == other.id
    }

    /// Checks that the interval may be stored.
    ///
    /// The range must be non-negative and non-empty, the op-range must cover
    /// it, and an empty interval must not name a writer.
    pub(crate) fn validate(&self) -> IntervalResult<()> {
        let (begin, end) = (self.begin, self.end);
        if begin < 0 {
            return Err(IntervalError::NegativeOffset(begin));
        }
        if begin >= end {
            return Err(IntervalError::InvalidRange { begin, end });
        }
        if self.op_begin > begin || self.op_end < end {
            return Err(IntervalError::OpRangeMismatch {
                begin,
                end,
                op_begin: self.op_begin,
                op_end: self.op_end,
            });
        }
        if self.version == EMPTY && self.id != EMPTY {
            return Err(IntervalError::EmptyWithWriter {
                begin,
                end,
                id: self.id,
            });
        }
        Ok(())
    }

    /// Returns the interval restricted to `[begin..end)`, op-range untouched.
    pub(crate) fn clipped(&self, begin: Offset, end: Offset) -> Self {
        Self {
            begin: self.begin.max(begin),
            end: self.end.min(end),
            ..*self
        }
    }

    /// Splits the interval into `[begin..at)` and `[at..end)`.
    ///
    /// `at` must lie strictly inside the interval.
    pub(crate) fn split_at(&self, at: Offset) -> (Self, Self) {
        debug_assert!(self.begin < at && at < self.end);
        (
            Self { end: at, ..*self },
            Self {
                begin: at,
                ..*self
            },
        )
    }

    /// Returns the same interval spanning a different byte range.
    pub(crate) fn respan(&self, begin: Offset, end: Offset) -> Self {
        Self {
            begin,
            end,
            ..*self
        }
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.begin == other.begin && self.end == other.end && self.same_writer(other)
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.begin.hash(state);
        self.end.hash(state);
        self.version.hash(state);
        self.id.hash(state);
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[{}, {}):empty", self.begin, self.end);
        }
        write!(f, "[{}, {}):v{}", self.begin, self.end, self.version)?;
        if self.id != self.version {
            write!(f, "#{}", self.id)?;
        }
        Ok(())
    }
}
