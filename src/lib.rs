//! Portal Resolver - turns protected case attachment links into image bytes.
//!
//! Case records from the city's 311 feed often carry attachment URLs that
//! point at an authenticated form portal instead of an image. This crate
//! performs the portal's session handshake, lists the case's attachments,
//! downloads the most relevant photo and hands back validated bytes, caching
//! every outcome per case id.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing resolution services and use cases.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "portal-resolver";
