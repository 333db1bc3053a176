//! Domain layer with core entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{CaseId, CaseReference, ResolvedImage, SessionContext, UnresolvedReason};
pub use errors::{PortalError, ResolveError};
pub use ports::{PortalPort, ResolutionCachePort};
