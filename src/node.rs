//! AVL primitives over interval nodes.
//!
//! Nodes are ordered by `begin`. Since stored intervals never overlap, plain
//! BST ordering is enough for every range operation and no augmentation beyond
//! the subtree height is kept.
//!
//! Range overwrites and truncation are expressed through [`split`] and
//! [`join`]: both keep the tree balanced regardless of how many nodes get
//! dropped at once.

use crate::interval::{Interval, Offset};

/// Owning link to a subtree.
pub(crate) type Link = Option<Box<IntervalNode>>;

/// Tree node, exclusively owned by its parent.
#[derive(Debug, Clone)]
pub(crate) struct IntervalNode {
    pub(crate) interval: Interval,
    pub(crate) left: Link,
    pub(crate) right: Link,

    /// Height of the subtree rooted here, a leaf has height 0.
    pub(crate) height: i32,
}

impl IntervalNode {
    pub(crate) fn new(interval: Interval) -> Box<Self> {
        Box::new(Self {
            interval,
            left: None,
            right: None,
            height: 0,
        })
    }

    /// Creates a node owning the given subtrees.
    ///
    /// Does not rebalance, children are expected to be balanced against each
    /// other already.
    #[cfg(test)]
    pub(crate) fn with_children(interval: Interval, left: Link, right: Link) -> Box<Self> {
        let mut node = Self::new(interval);
        node.left = left;
        node.right = right;
        node.update_height();
        node
    }

    /// `height(right) - height(left)`.
    pub(crate) fn balance(&self) -> i32 {
        height(&self.right) - height(&self.left)
    }

    pub(crate) fn update_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }
}

/// Height of a subtree, `-1` for an empty one.
pub(crate) fn height(link: &Link) -> i32 {
    link.as_ref().map_or(-1, |node| node.height)
}

fn rotate_left(mut node: Box<IntervalNode>) -> Box<IntervalNode> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_right(mut node: Box<IntervalNode>) -> Box<IntervalNode> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

/// Restores the AVL invariant at `node`, whose children are balanced and
/// differ in height by at most two.
pub(crate) fn rebalance(mut node: Box<IntervalNode>) -> Box<IntervalNode> {
    node.update_height();
    let balance = node.balance();

    if balance > 1 {
        // Right-Left case
        if node.right.as_ref().is_some_and(|right| right.balance() < 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    if balance < -1 {
        // Left-Right case
        if node.left.as_ref().is_some_and(|left| left.balance() > 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    node
}

/// Joins two trees with `mid` in between.
///
/// Every interval in `left` must end at or before `mid` begins, and every
/// interval in `right` must begin at or after `mid` ends. The taller tree is
/// descended along its inner spine until heights match, so the cost is
/// proportional to the height difference.
pub(crate) fn join(left: Link, mut mid: Box<IntervalNode>, right: Link) -> Box<IntervalNode> {
    match (left, right) {
        (Some(mut left), right) if left.height > height(&right) + 1 => {
            left.right = Some(join(left.right.take(), mid, right));
            rebalance(left)
        }
        (left, Some(mut right)) if right.height > height(&left) + 1 => {
            right.left = Some(join(left, mid, right.left.take()));
            rebalance(right)
        }
        (left, right) => {
            mid.left = left;
            mid.right = right;
            mid.update_height();
            mid
        }
    }
}

/// Splits a tree at offset `at`.
///
/// The first tree holds everything below `at`, the second everything at or
/// above it. An interval straddling `at` is cut in two, both halves keeping
/// the original metadata.
pub(crate) fn split(link: Link, at: Offset) -> (Link, Link) {
    let Some(mut node) = link else {
        return (None, None);
    };
    let left = node.left.take();
    let right = node.right.take();

    if at <= node.interval.begin() {
        let (lo, hi) = split(left, at);
        (lo, Some(join(hi, node, right)))
    } else if at >= node.interval.end() {
        let (lo, hi) = split(right, at);
        (Some(join(left, node, lo)), hi)
    } else {
        let (head, tail) = node.interval.split_at(at);
        node.interval = head;
        (
            Some(join(left, node, None)),
            Some(join(None, IntervalNode::new(tail), right)),
        )
    }
}

/// Stored interval containing `offset`, if any.
pub(crate) fn find(link: &Link, offset: Offset) -> Option<&Interval> {
    let mut cur = link.as_deref();
    while let Some(node) = cur {
        if offset < node.interval.begin() {
            cur = node.left.as_deref();
        } else if offset >= node.interval.end() {
            cur = node.right.as_deref();
        } else {
            return Some(&node.interval);
        }
    }
    None
}

/// Number of stored intervals lying entirely inside `[begin..end)`.
pub(crate) fn count_within(link: &Link, begin: Offset, end: Offset) -> usize {
    let Some(node) = link else {
        return 0;
    };

    let mut count = 0;
    if begin < node.interval.begin() {
        count += count_within(&node.left, begin, end);
    }
    if node.interval.is_within(begin, end) {
        count += 1;
    }
    if end > node.interval.end() {
        count += count_within(&node.right, begin, end);
    }
    count
}

/// Collects, in order, stored intervals overlapping `[begin..end)`.
pub(crate) fn collect_overlapping(
    link: &Link,
    begin: Offset,
    end: Offset,
    acc: &mut Vec<Interval>,
) {
    let Some(node) = link else {
        return;
    };

    // Descend left if the lookup starts left of the current node.
    if begin < node.interval.begin() {
        collect_overlapping(&node.left, begin, end, acc);
    }

    if node.interval.overlaps(begin, end) {
        acc.push(node.interval);
    }

    // Descend right if the lookup ends right of the current node.
    if end > node.interval.end() {
        collect_overlapping(&node.right, begin, end, acc);
    }
}

/// In-order iterator over stored intervals.
pub struct Iter<'a> {
    stack: Vec<&'a IntervalNode>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(root: &'a Link) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left(root.as_deref());
        iter
    }

    fn push_left(&mut self, mut node: Option<&'a IntervalNode>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Interval;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.interval)
    }
}
