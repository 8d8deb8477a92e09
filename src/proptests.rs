use super::*;

use proptest::prelude::*;

/// Offsets touched by generated writes stay below this bound (plus the write
/// length).
const SPACE: Offset = 256;
const MAX_WRITE: Offset = 64;

/// Last write per byte, `None` for bytes never written.
///
/// The model keeps the unclipped interval of each write, so comparing a byte
/// also compares the op-range.
struct Model {
    bytes: Vec<Option<Interval>>,
    end: Offset,
}

impl Model {
    fn new() -> Self {
        Self {
            bytes: vec![None; (SPACE + MAX_WRITE) as usize],
            end: 0,
        }
    }

    fn insert(&mut self, interval: Interval) {
        for offset in interval.range() {
            self.bytes[offset as usize] = Some(interval);
        }
        self.end = self.end.max(interval.end());
    }

    fn truncate(&mut self, end: Offset) {
        if end >= self.end {
            return;
        }
        for offset in end..self.end {
            self.bytes[offset as usize] = None;
        }
        self.end = end;
    }

    /// Version and writer id of a byte, unwritten bytes reported as empty.
    fn owner(&self, offset: Offset) -> (Version, WriterId) {
        self.bytes
            .get(offset as usize)
            .copied()
            .flatten()
            .map_or((EMPTY, EMPTY), |i| (i.version(), i.id()))
    }
}

#[derive(Debug, Clone)]
enum Op {
    Write(Offset, Offset, Version),
    Erase(Offset, Offset),
    /// Empty interval naming a writer, always rejected.
    EmptyWithWriter(Offset, Offset, WriterId),
    Truncate(Offset),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        70 => (0..SPACE, 1..=MAX_WRITE, 0..8i64).prop_map(|(b, len, v)| Op::Write(b, len, v)),
        15 => (0..SPACE, 1..=MAX_WRITE).prop_map(|(b, len)| Op::Erase(b, len)),
        5 => (0..SPACE, 1..=MAX_WRITE, 0..8i64).prop_map(|(b, len, id)| Op::EmptyWithWriter(b, len, id)),
        10 => (0..SPACE + MAX_WRITE).prop_map(Op::Truncate),
    ];
    prop::collection::vec(op, 0..=200)
}

fn query_strategy() -> impl Strategy<Value = (Offset, Offset)> {
    (0..SPACE + 2 * MAX_WRITE, 0..SPACE + 2 * MAX_WRITE).prop_map(|(a, b)| (a.min(b), a.max(b)))
}

/// Applies `ops` to both a vector and the model.
///
/// Every write gets its own writer id, so fragments of one write always agree
/// on the op-range and queries never fail.
fn apply(ops: &[Op]) -> (AvlIntervalVector, Model) {
    let mut vector = AvlIntervalVector::new();
    let mut model = Model::new();

    for (id, op) in ops.iter().enumerate() {
        match *op {
            Op::Write(begin, len, version) => {
                let interval = Interval::with_id(begin, begin + len, version, id as WriterId);
                vector.insert(interval).unwrap();
                model.insert(interval);
            }
            Op::Erase(begin, len) => {
                vector.insert_empty(begin, begin + len).unwrap();
                model.insert(Interval::empty(begin, begin + len));
            }
            Op::EmptyWithWriter(begin, len, id) => {
                let before = vector.to_string();
                let err = vector
                    .insert(Interval::with_id(begin, begin + len, EMPTY, id))
                    .unwrap_err();
                assert_eq!(
                    err,
                    IntervalError::EmptyWithWriter {
                        begin,
                        end: begin + len,
                        id
                    }
                );
                assert_eq!(vector.to_string(), before);
            }
            Op::Truncate(end) => {
                vector.truncate(end).unwrap();
                model.truncate(end);
            }
        }
        vector.validate();
    }
    (vector, model)
}

/// Checks that `intervals` tile `[begin..end)` exactly, agree with the model
/// byte by byte and contain no mergeable neighbours.
fn check_tiling(
    intervals: &[Interval],
    model: &Model,
    begin: Offset,
    end: Offset,
) -> Result<(), TestCaseError> {
    if begin == end {
        prop_assert!(intervals.is_empty());
        return Ok(());
    }
    prop_assert_eq!(intervals.first().map(Interval::begin), Some(begin));
    prop_assert_eq!(intervals.last().map(Interval::end), Some(end));

    for pair in intervals.windows(2) {
        prop_assert_eq!(pair[0].end(), pair[1].begin());
        prop_assert!(!pair[0].same_writer(&pair[1]), "unmerged {} {}", pair[0], pair[1]);
    }
    for interval in intervals {
        prop_assert!(interval.begin() < interval.end());
        for offset in interval.range() {
            prop_assert_eq!((interval.version(), interval.id()), model.owner(offset));
        }
    }
    Ok(())
}

/// Writes reusing a small set of writers, each with its own op-range.
fn reused_writers_strategy() -> impl Strategy<Value = Vec<(Offset, Offset, WriterId)>> {
    prop::collection::vec((0..SPACE, 1..=MAX_WRITE, 0..3i64), 0..=60)
}

/// Whether two adjacent bytes belong to the same writer but to writes with
/// different op-ranges.
fn has_conflict(model: &Model) -> bool {
    model.bytes[..model.end as usize].windows(2).any(|pair| match pair {
        [Some(left), Some(right)] => {
            left.same_writer(right) && !left.is_empty() && left.op_range() != right.op_range()
        }
        _ => false,
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in ops_strategy()) {
        let (vector, model) = apply(&ops);
        prop_assert_eq!(vector.end(), model.end);

        for offset in 0..SPACE + MAX_WRITE {
            let stored = vector.get(offset).map(|i| (i.version(), i.id(), i.op_range()));
            let expected = model.bytes[offset as usize].map(|i| (i.version(), i.id(), i.op_range()));
            prop_assert_eq!(stored, expected, "offset {}", offset);
        }

        let serialized = vector.serialize().unwrap();
        check_tiling(&serialized, &model, 0, model.end)?;
    }

    #[test]
    fn prop_queries(ops in ops_strategy(), (begin, end) in query_strategy()) {
        let (vector, model) = apply(&ops);

        let sliced = vector.slice(begin, end).unwrap();
        check_tiling(&sliced, &model, begin, end)?;

        let overlapping = vector.overlapping(begin, end).unwrap();
        prop_assert_eq!(overlapping.len(), sliced.len());
        if begin < end {
            prop_assert!(overlapping[0].begin() <= begin);
            prop_assert!(overlapping[overlapping.len() - 1].end() >= end);
        }
        for (whole, part) in overlapping.iter().zip(&sliced) {
            prop_assert!(part.is_within(whole.begin(), whole.end()));
            prop_assert!(whole.same_writer(part));
        }

        let list = ListIntervalVector::new(vector.serialize().unwrap()).unwrap();
        prop_assert_eq!(list.slice(begin, end).unwrap(), sliced);
    }

    #[test]
    fn prop_restore_from_serialized(ops in ops_strategy()) {
        let (vector, _) = apply(&ops);
        let serialized = vector.serialize().unwrap();

        let restored = IntervalVectorBuilder::new(serialized.clone())
            .with_end(vector.end())
            .build()
            .unwrap();
        restored.validate();
        prop_assert_eq!(restored.end(), vector.end());
        prop_assert_eq!(restored.serialize().unwrap(), serialized);
        prop_assert_eq!(restored.digest().unwrap(), vector.digest().unwrap());
    }

    #[test]
    fn prop_insert_then_slice(
        ops in ops_strategy(),
        begin in 0..SPACE,
        len in 1..=MAX_WRITE,
    ) {
        let (mut vector, _) = apply(&ops);
        let interval = Interval::with_id(begin, begin + len, 100, -2);
        vector.insert(interval).unwrap();
        vector.validate();

        let sliced = vector.slice(begin, begin + len).unwrap();
        prop_assert_eq!(sliced.len(), 1);
        prop_assert_eq!(sliced[0], interval);
        prop_assert_eq!(sliced[0].op_range(), interval.op_range());
        prop_assert_eq!(vector.max_version(), 100);
    }

    #[test]
    fn prop_reused_writers(writes in reused_writers_strategy(), (begin, end) in query_strategy()) {
        let mut vector = AvlIntervalVector::new();
        let mut model = Model::new();
        for (b, len, writer) in writes {
            let interval = Interval::new(b, b + len, writer);
            vector.insert(interval).unwrap();
            model.insert(interval);
        }
        vector.validate();

        // Queries either keep every writer id or fail loudly, never merge
        // inconsistent fragments.
        match vector.slice(begin, end) {
            Ok(sliced) => check_tiling(&sliced, &model, begin, end)?,
            Err(err) => {
                prop_assert!(err.is_fatal());
                prop_assert!(
                    matches!(err, IntervalError::ConsistencyViolation { .. }),
                    "expected ConsistencyViolation, got {:?}",
                    err
                );
                prop_assert!(has_conflict(&model));
            }
        }
        match vector.serialize() {
            Ok(serialized) => {
                prop_assert!(!has_conflict(&model));
                check_tiling(&serialized, &model, 0, model.end)?;
            }
            Err(err) => {
                prop_assert!(
                    matches!(err, IntervalError::ConsistencyViolation { .. }),
                    "expected ConsistencyViolation, got {:?}",
                    err
                );
                prop_assert!(has_conflict(&model));
            }
        }
    }

    #[test]
    fn prop_truncate_idempotent(ops in ops_strategy(), end in 0..SPACE + MAX_WRITE) {
        let (mut vector, _) = apply(&ops);
        let before = vector.end();

        vector.truncate(end).unwrap();
        vector.validate();
        let once = vector.serialize().unwrap();
        prop_assert_eq!(vector.end(), before.min(end));

        vector.truncate(end).unwrap();
        prop_assert_eq!(vector.serialize().unwrap(), once);
        prop_assert!(vector.iter().all(|i| i.end() <= end));
    }
}
