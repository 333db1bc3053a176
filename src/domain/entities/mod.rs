//! Domain entity definitions.

mod case_reference;
mod manifest;
mod media;
mod resolved_image;
mod session;

pub use case_reference::{CaseId, CaseReference, FormRef};
pub use manifest::{AttachmentManifest, SelectedAttachment};
pub use media::{DisplayImage, MediaItem, is_direct_image_url};
pub use resolved_image::{ResolvedImage, UnresolvedReason};
pub use session::{SessionContext, SessionSecret};
