//! Infrastructure layer with external service adapters.

/// In-memory resolution cache.
pub mod cache;
/// Application configuration.
pub mod config;
/// Form portal HTTP adapter.
pub mod portal;

pub use cache::{CacheStats, MemoryResolutionCache};
pub use config::{AppConfig, CliArgs, ConfigError, ConfigStore, LogLevel, PortalConfig, ResolverConfig};
pub use portal::PortalHttpClient;
