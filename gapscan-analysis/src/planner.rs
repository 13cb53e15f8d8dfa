//! Batch planning: fixed-size, contiguous, order-preserving slices.

/// Partition `items` into at most `batch_size`-long contiguous slices whose
/// concatenation reconstructs the input exactly. A zero `batch_size` is
/// treated as one.
///
/// ```
/// use gapscan_analysis::planner::plan_batches;
///
/// let items: Vec<u32> = (0..23).collect();
/// let batches = plan_batches(&items, 10);
/// assert_eq!(batches.len(), 3);
/// assert_eq!(batches[2].len(), 3);
/// ```
pub fn plan_batches<T>(items: &[T], batch_size: usize) -> Vec<&[T]> {
    items.chunks(batch_size.max(1)).collect()
}
