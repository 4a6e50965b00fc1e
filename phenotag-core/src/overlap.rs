//! Inclusive genomic interval overlap.
//!
//! Two spans overlap when they share an assembly build and sequence and
//! their coordinate ranges intersect with inclusive boundaries, so touching
//! endpoints (`a.end == b.start`) count as overlapping. The same predicate
//! is expressed twice: as the single intersection test used everywhere, and
//! as the three-case decomposition used by the nested range-overlap query
//! shape. The test suite pins their equivalence at the boundaries.

use crate::models::GenomicSpan;

/// True when the closed ranges `[s1, e1]` and `[s2, e2]` intersect.
#[inline]
pub fn ranges_intersect(s1: u32, e1: u32, s2: u32, e2: u32) -> bool {
    s1 <= e2 && e1 >= s2
}

/// Inclusive overlap between two spans, build- and seqid-aware.
pub fn overlaps(a: &GenomicSpan, b: &GenomicSpan) -> bool {
    a.build == b.build && a.seqid == b.seqid && ranges_intersect(a.start, a.end, b.start, b.end)
}

/// The three-case form: `b` contains `a`'s start, `b` contains `a`'s end,
/// or `a` contains the whole of `b`. Equivalent to [`overlaps`].
pub fn overlaps_piecewise(a: &GenomicSpan, b: &GenomicSpan) -> bool {
    if a.build != b.build || a.seqid != b.seqid {
        return false;
    }
    let start_within = b.start <= a.start && a.start <= b.end;
    let end_within = b.start <= a.end && a.end <= b.end;
    let contains = a.start <= b.start && b.end <= a.end;
    start_within || end_within || contains
}
