
use {
    crate::{
        IntervalVector,
        error::{IntervalError, IntervalResult},
        interval::{EMPTY, Interval, Offset, Version},
        merge::{self, OpRangePolicy},
        node::{self, IntervalNode, Iter, Link},
    },
    std::fmt,
    tracing::{debug, trace},
};

/// Interval vector backed by an AVL tree.
///
/// Partitions `[0..end)` into non-overlapping intervals, each tagged with the
/// write that last touched it. Bytes never written are not stored: queries
/// synthesize empty intervals for them.
///
/// The vector is a plain single-threaded value. Wrap it into
/// [`SharedIntervalVector`](crate::SharedIntervalVector) to share it between
/// threads.
#[derive(Debug, Clone)]
pub struct AvlIntervalVector {
    root: Link,
    end: Offset,

    /// Number of stored intervals.
    len: usize,

    /// Highest version ever inserted.
    max_version: Version,

    /// Number of stored intervals fully overwritten by inserts since the
    /// last reset.
    overwrites: usize,
    policy: OpRangePolicy,
}

impl Default for AvlIntervalVector {
    fn default() -> Self {
        Self::new()
    }
}

impl AvlIntervalVector {
    /// Creates an empty vector with the default op-range policy.
    pub fn new() -> Self {
        Self::with_policy(OpRangePolicy::default())
    }

    /// Creates an empty vector merging fragments according to `policy`.
    pub fn with_policy(policy: OpRangePolicy) -> Self {
        Self {
            root: None,
            end: 0,
            len: 0,
            max_version: EMPTY,
            overwrites: 0,
            policy,
        }
    }

    /// Raises the extent to at least `end`.
    pub(crate) fn extend_to(&mut self, end: Offset) {
        self.end = self.end.max(end);
    }

    /// Records `interval` as the latest write to its byte range.
    ///
    /// Stored intervals entirely inside the range are dropped (and counted as
    /// overwrites), intervals partially covered are clipped, an interval
    /// surrounding the range is split in two. The extent grows to cover the
    /// interval.
    ///
    /// Adjacent intervals of the same write are not merged here, merging
    /// happens at query time.
    pub fn insert(&mut self, interval: Interval) -> IntervalResult<()> {
        interval.validate()?;
        let (begin, end) = (interval.begin(), interval.end());

        let overwritten = node::count_within(&self.root, begin, end);
        let surrounding = node::find(&self.root, begin)
            .is_some_and(|stored| stored.begin() < begin && stored.end() > end);

        let (head, rest) = node::split(self.root.take(), begin);
        let (_, tail) = node::split(rest, end);
        self.root = Some(node::join(head, IntervalNode::new(interval), tail));

        self.len = self.len + 1 + usize::from(surrounding) - overwritten;
        self.overwrites += overwritten;
        self.end = self.end.max(end);
        self.max_version = self.max_version.max(interval.version());

        trace!(begin, end, version = interval.version(), overwritten, "insert");
        Ok(())
    }

    /// Marks `[begin..end)` as unwritten.
    pub fn insert_empty(&mut self, begin: Offset, end: Offset) -> IntervalResult<()> {
        self.insert(Interval::empty(begin, end))
    }

    /// Shrinks the vector to `[0..end)`.
    ///
    /// Intervals beginning at or after `end` are dropped, an interval
    /// straddling `end` is clipped. Truncating to the current extent or
    /// beyond has no effect.
    pub fn truncate(&mut self, end: Offset) -> IntervalResult<()> {
        if end < 0 {
            return Err(IntervalError::NegativeOffset(end));
        }
        trace!(from = self.end, to = end, "truncate");
        if end >= self.end {
            return Ok(());
        }

        let dropped = node::count_within(&self.root, end, Offset::MAX);
        let (head, _) = node::split(self.root.take(), end);
        self.root = head;
        self.len -= dropped;

        debug!(from = self.end, to = end, dropped, "vector truncated");
        self.end = end;
        Ok(())
    }

    /// Stored interval covering the byte at `offset`.
    ///
    /// Returns `None` for unwritten bytes, including any offset at or past
    /// the extent.
    pub fn get(&self, offset: Offset) -> Option<&Interval> {
        node::find(&self.root, offset)
    }

    /// Number of stored intervals fully overwritten since the vector was
    /// created or the counter last reset.
    ///
    /// The counter is a good indicator of version churn, e.g. to decide when
    /// a persisted log of the vector should be compacted.
    pub fn overwrites(&self) -> usize {
        self.overwrites
    }

    /// Resets the overwrite counter to 0.
    pub fn reset_overwrites(&mut self) {
        self.overwrites = 0;
    }

    /// Number of stored intervals (adjacent fragments are not merged).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Iterator over stored intervals in ascending order.
    ///
    /// Intervals are returned as stored: unmerged and without gaps.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.root)
    }

    /// Op-range policy applied when merging during queries.
    pub fn policy(&self) -> OpRangePolicy {
        self.policy
    }

    /// Height of the tree, `None` when nothing is stored.
    pub fn root_height(&self) -> Option<i32> {
        self.root.as_ref().map(|root| root.height)
    }

    /// Height of the root's right subtree minus the height of its left one.
    pub fn root_balance(&self) -> Option<i32> {
        self.root.as_ref().map(|root| root.balance())
    }

    /// Asserts ordering, disjointness, stored heights and the AVL invariant of
    /// the whole tree, as well as the cached length and extent.
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        fn check(link: &Link) -> i32 {
            let Some(node) = link else {
                return -1;
            };
            let lh = check(&node.left);
            let rh = check(&node.right);
            assert!((rh - lh).abs() <= 1, "unbalanced at {}", node.interval);
            assert_eq!(node.height, lh.max(rh) + 1, "stale height at {}", node.interval);
            node.height
        }
        check(&self.root);

        let stored: Vec<_> = self.iter().collect();
        assert_eq!(stored.len(), self.len);
        for pair in stored.windows(2) {
            assert!(pair[0].end() <= pair[1].begin(), "{} overlaps {}", pair[0], pair[1]);
        }
        for interval in stored {
            assert!(interval.begin() < interval.end());
            assert!(interval.end() <= self.end);
        }
    }

    /// Stored intervals overlapping `[begin..end)`, in order.
    fn stored_overlapping(&self, begin: Offset, end: Offset) -> Vec<Interval> {
        let mut acc = Vec::new();
        node::collect_overlapping(&self.root, begin, end, &mut acc);
        acc
    }
}

impl IntervalVector for AvlIntervalVector {
    fn end(&self) -> Offset {
        self.end
    }

    fn max_version(&self) -> Version {
        self.max_version
    }

    fn overlapping(&self, begin: Offset, end: Offset) -> IntervalResult<Vec<Interval>> {
        if !merge::check_query(begin, end)? {
            return Ok(Vec::new());
        }
        merge::cover(self.stored_overlapping(begin, end), begin, end, self.policy)
    }

    fn slice(&self, begin: Offset, end: Offset) -> IntervalResult<Vec<Interval>> {
        let intervals = self.overlapping(begin, end)?;
        Ok(merge::clip(intervals, begin, end))
    }

    fn serialize(&self) -> IntervalResult<Vec<Interval>> {
        merge::cover(self.iter().copied(), 0, self.end, self.policy)
    }
}

impl fmt::Display for AvlIntervalVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, interval) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{interval}")?;
        }
        Ok(())
    }
}
