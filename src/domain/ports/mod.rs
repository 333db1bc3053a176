mod portal_port;
mod resolution_cache_port;

pub use portal_port::{PortalMethod, PortalPort, PortalRequest, PortalResponse};
pub use resolution_cache_port::ResolutionCachePort;

#[cfg(test)]
pub use portal_port::MockPortalPort;

/// Test doubles for the portal port.
#[cfg(test)]
pub mod mocks {
    pub use super::portal_port::mock::{RecordingPortal, json_response, response};
}
