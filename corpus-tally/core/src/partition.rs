//! Range arithmetic for the static scheduling model.

use std::ops::Range;

/// Data-line range owned by one worker.
///
/// With `n = length / worker_count`, rank `r` owns `[n * r, n * (r + 1))`,
/// except the last rank whose end is `length` unconditionally, absorbing
/// the division remainder. For every `length >= 0` and `worker_count >= 1`
/// the ranges are contiguous, mutually disjoint, and cover `[0, length)`
/// exactly.
pub fn range_for(length: usize, worker_count: usize, rank: usize) -> Range<usize> {
    debug_assert!(worker_count >= 1);
    debug_assert!(rank < worker_count);
    let n = length / worker_count;
    let start = n * rank;
    let end = if rank == worker_count - 1 {
        length
    } else {
        n * (rank + 1)
    };
    start..end
}
