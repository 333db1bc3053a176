//! Port definition for the resolution cache.

use std::time::Duration;

use crate::domain::entities::{CaseId, ResolvedImage};

/// Port for memoizing resolution outcomes per case.
/// Implementations must be thread-safe; expired entries read as absent.
pub trait ResolutionCachePort: Send + Sync {
    /// Returns the live outcome for a case, if any.
    fn get(&self, case_id: &CaseId) -> Option<ResolvedImage>;

    /// Stores an outcome, successful or not, for `ttl`.
    /// Replaces any existing entry for the case.
    fn put(&self, case_id: CaseId, result: ResolvedImage, ttl: Duration);

    /// Removes the entry for a case.
    fn evict(&self, case_id: &CaseId);

    /// Returns the number of stored entries, expired ones included.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all entries.
    fn clear(&self);
}
