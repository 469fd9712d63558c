//! Dropping derived data after a topology change.

/// Implemented by structures that memoize something computed from their
/// shape, such as [`Dag`](crate::topology::Dag) and its strata.
///
/// Every shape-changing mutator calls [`invalidate_cache`](Self::invalidate_cache)
/// itself; payload edits do not.
pub trait InvalidateCache {
    /// Forgets every memoized result; the next query recomputes it.
    fn invalidate_cache(&mut self);
}
