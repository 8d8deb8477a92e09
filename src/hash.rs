use {
    crate::interval::Interval,
    rapidhash::rapidhash,
    std::hash::Hasher,
};

/// Hasher used for vector digests.
///
/// Buffers the written bytes and hashes them with rapidhash on
/// [`finish()`](Hasher::finish). Feed it through [`digest()`] (or the
/// little-endian `write_*` calls) to get output that is portable across
/// platforms.
#[derive(Default)]
pub struct VectorHasher(Vec<u8>);

impl Hasher for VectorHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        rapidhash(&self.0)
    }
}

/// Digest of a sequence of intervals.
///
/// Every interval contributes its byte range, version, writer id and op-range.
/// Two replicas that serialize to the same sequence produce the same digest,
/// so comparing digests is a cheap first check before exchanging whole
/// vectors.
pub fn digest(intervals: &[Interval]) -> u64 {
    let mut hasher = VectorHasher::default();
    for interval in intervals {
        for value in [
            interval.begin(),
            interval.end(),
            interval.version(),
            interval.id(),
            interval.op_begin(),
            interval.op_end(),
        ] {
            hasher.write(&value.to_le_bytes());
        }
    }
    hasher.finish()
}
