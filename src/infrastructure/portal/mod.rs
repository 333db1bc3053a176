//! Form portal HTTP adapter.

mod client;
/// Request bodies sent to the portal.
pub mod dto;

pub use client::PortalHttpClient;
