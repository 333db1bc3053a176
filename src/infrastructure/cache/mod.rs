//! Resolution outcome caching.

pub mod memory_cache;

pub use memory_cache::{CacheEntry, CacheStats, MemoryResolutionCache};
