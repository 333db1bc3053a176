//! In-memory resolution cache with TTL expiry and LRU bound.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::domain::entities::{CaseId, ResolvedImage};
use crate::domain::ports::ResolutionCachePort;

/// Default maximum number of case ids to cache.
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Stored outcome for one case.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Case the outcome belongs to.
    pub case_id: CaseId,
    /// Outcome, successful or not.
    pub result: ResolvedImage,
    /// Instant after which the entry reads as absent.
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Returns true while the entry is live at `now`.
    #[must_use]
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Process-wide cache of resolution outcomes keyed by case id.
///
/// At most one entry exists per case; the least recently used entry is
/// evicted once capacity is reached.
pub struct MemoryResolutionCache {
    cache: Mutex<LruCache<CaseId, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryResolutionCache {
    /// Creates a new cache with the specified capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Creates a new cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            hit_rate,
            size: self.len(),
        }
    }

    /// Drops every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut cache = self.cache.lock();
        let expired: Vec<CaseId> = cache
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            cache.pop(id);
        }
        if !expired.is_empty() {
            debug!(count = expired.len(), "Purged expired resolutions");
        }
        expired.len()
    }

    fn lookup(&self, case_id: &CaseId, now: Instant) -> Option<ResolvedImage> {
        let mut cache = self.cache.lock();
        let live = match cache.get(case_id) {
            Some(entry) if entry.is_live(now) => Some(entry.result.clone()),
            Some(_) => {
                cache.pop(case_id);
                trace!(case_id = %case_id, "Resolution cache entry expired");
                None
            }
            None => None,
        };

        if live.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(case_id = %case_id, "Resolution cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!(case_id = %case_id, "Resolution cache miss");
        }
        live
    }
}

impl Default for MemoryResolutionCache {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of stored entries.
    pub size: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} cases, {:.1}% hit rate ({} hits, {} misses)",
            self.size, self.hit_rate, self.hits, self.misses
        )
    }
}

impl ResolutionCachePort for MemoryResolutionCache {
    fn get(&self, case_id: &CaseId) -> Option<ResolvedImage> {
        self.lookup(case_id, Instant::now())
    }

    fn put(&self, case_id: CaseId, result: ResolvedImage, ttl: Duration) {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now);
        debug!(
            case_id = %case_id,
            resolved = result.is_resolved(),
            ttl_secs = ttl.as_secs(),
            "Storing resolution in cache"
        );
        let entry = CacheEntry {
            case_id: case_id.clone(),
            result,
            expires_at,
        };
        self.cache.lock().put(case_id, entry);
    }

    fn evict(&self, case_id: &CaseId) {
        if self.cache.lock().pop(case_id).is_some() {
            debug!(case_id = %case_id, "Evicted resolution from cache");
        }
    }

    fn len(&self) -> usize {
        self.cache.lock().len()
    }

    fn clear(&self) {
        self.cache.lock().clear();
        debug!("Cleared resolution cache");
    }
}
