//! All-pairs row matching between two decoded row sets.

use crate::decode::Row;

/// Count all `(a, b)` pairs whose rows are field-wise equal.
///
/// This is deliberately an all-pairs count, not a distinct-intersection
/// size: a row duplicated k times on one side matching a row duplicated
/// m times on the other contributes k*m. NULL equals NULL. O(|a|*|b|)
/// with no indexing and no early exit; commutative in value.
pub fn count_matches(a: &[Row], b: &[Row]) -> u64 {
    let mut count = 0u64;
    for left in a {
        for right in b {
            if left == right {
                count += 1;
            }
        }
    }
    count
}
