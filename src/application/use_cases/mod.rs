//! Use case implementations.

mod download_attachment_use_case;
mod handshake_use_case;
mod list_attachments_use_case;
mod portal_requests;
mod resolve_attachment_use_case;
mod resolve_batch_use_case;

pub use download_attachment_use_case::DownloadAttachmentUseCase;
pub use handshake_use_case::{Handshake, HandshakeUseCase};
pub use list_attachments_use_case::ListAttachmentsUseCase;
pub use resolve_attachment_use_case::{ResolutionState, ResolveAttachmentUseCase};
pub use resolve_batch_use_case::{BatchReport, ResolveBatchUseCase};
