//! Domain error types.

mod portal_error;
mod resolve_error;

pub use portal_error::PortalError;
pub use resolve_error::{ErrorKind, ResolveError};
