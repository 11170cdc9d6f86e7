// Shared capacity error for fixed-size storage.

/// A fixed-capacity structure ran out of room.
///
/// All per-eojeol working storage (trie node pools, lattice positions,
/// chart edges) is sized once at construction and reused across calls.
/// Hitting a limit is reported through this error instead of growing the
/// storage or faulting; the current eojeol fails, the structure stays
/// usable for the next one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("capacity exceeded: {what} (limit {limit})")]
pub struct CapacityError {
    /// Which storage overflowed.
    pub what: &'static str,
    /// The configured limit that was hit.
    pub limit: usize,
}

impl CapacityError {
    pub fn new(what: &'static str, limit: usize) -> Self {
        Self { what, limit }
    }
}
