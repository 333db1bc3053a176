//! Application layer with resolution services and use cases.

/// Stateless resolution helpers.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use use_cases::{BatchReport, ResolutionState, ResolveAttachmentUseCase, ResolveBatchUseCase};
