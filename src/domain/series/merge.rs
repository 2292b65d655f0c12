use super::entities::Point;
use crate::domain::logging::LogComponent;
use crate::log_trace;

/// Deduplicating union of two batches, ascending by `t`.
///
/// First-seen wins: on equal timestamps the point from `left` is kept, and
/// within one batch the earlier point is kept. The resulting set of
/// timestamps does not depend on argument order.
pub fn merge_by_time(left: &[Point], right: &[Point]) -> Vec<Point> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    merged.extend_from_slice(left);
    merged.extend_from_slice(right);

    // stable: equal keys stay in concatenation order, so dedup keeps the first seen
    merged.sort_by_key(|p| p.t);
    merged.dedup_by_key(|p| p.t);

    log_trace!(
        LogComponent::Domain("Merge"),
        "merged {} + {} points into {}",
        left.len(),
        right.len(),
        merged.len()
    );
    merged
}
