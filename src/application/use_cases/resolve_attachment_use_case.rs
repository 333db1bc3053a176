//! Resolves a wrapper URL to image bytes.
//!
//! Resolution runs as an explicit state machine. Each step moves forward
//! exactly once; any failure jumps straight to [`ResolutionState::Unresolved`].

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::application::services::{WrapperUrlParser, select_attachment, validate_image_blocking};
use crate::domain::entities::{
    AttachmentManifest, CaseId, CaseReference, DisplayImage, MediaItem, ResolvedImage,
    SelectedAttachment, UnresolvedReason,
};
use crate::domain::errors::ResolveError;
use crate::domain::ports::{PortalPort, ResolutionCachePort};
use crate::infrastructure::config::PortalConfig;

use super::download_attachment_use_case::DownloadAttachmentUseCase;
use super::handshake_use_case::{Handshake, HandshakeUseCase};
use super::list_attachments_use_case::ListAttachmentsUseCase;

/// Position of one resolution attempt.
#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum ResolutionState {
    /// Raw input not yet classified.
    Parsing(String),
    /// Input is not a wrapper URL. Terminal.
    NotAWrapper,
    /// Wrapper URL parsed; cache not yet consulted.
    CacheCheck(CaseReference),
    /// Cached outcome found. Terminal.
    CacheHit(ResolvedImage),
    /// Session handshake pending.
    Handshaking(CaseReference),
    /// Session established; manifest not yet fetched.
    Listing(Handshake),
    /// Manifest fetched; attachment not yet chosen.
    Selecting(Handshake, AttachmentManifest),
    /// Attachment chosen; content not yet fetched.
    Downloading(Handshake, SelectedAttachment),
    /// Content decoded; image not yet verified.
    Validating {
        /// Case being resolved.
        case_id: CaseId,
        /// Decoded attachment bytes.
        bytes: Bytes,
    },
    /// Validated image bytes. Terminal.
    Resolved {
        /// Case that was resolved.
        case_id: CaseId,
        /// Image bytes, unchanged from the portal.
        bytes: Bytes,
    },
    /// A step failed. Terminal.
    Unresolved {
        /// Case that failed.
        case_id: CaseId,
        /// Diagnostic reason.
        reason: UnresolvedReason,
    },
}

impl ResolutionState {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Parsing(_) => "parsing",
            Self::NotAWrapper => "not_a_wrapper",
            Self::CacheCheck(_) => "cache_check",
            Self::CacheHit(_) => "cache_hit",
            Self::Handshaking(_) => "handshaking",
            Self::Listing(_) => "listing",
            Self::Selecting(..) => "selecting",
            Self::Downloading(..) => "downloading",
            Self::Validating { .. } => "validating",
            Self::Resolved { .. } => "resolved",
            Self::Unresolved { .. } => "unresolved",
        }
    }

    /// Returns true once no further step applies.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotAWrapper | Self::CacheHit(_) | Self::Resolved { .. } | Self::Unresolved { .. }
        )
    }
}

/// Facade turning wrapper URLs into [`ResolvedImage`] values.
///
/// Never fails: every error ends as [`ResolvedImage::Unresolved`]. Outcomes
/// of network attempts, failures included, are cached per case id.
pub struct ResolveAttachmentUseCase {
    parser: WrapperUrlParser,
    handshake: HandshakeUseCase,
    listing: ListAttachmentsUseCase,
    download: DownloadAttachmentUseCase,
    cache: Arc<dyn ResolutionCachePort>,
    cache_ttl: Duration,
}

impl ResolveAttachmentUseCase {
    /// Creates new use case.
    ///
    /// # Errors
    /// Returns error if the configured token keys produce invalid patterns.
    pub fn new(
        portal: Arc<dyn PortalPort>,
        cache: Arc<dyn ResolutionCachePort>,
        config: Arc<PortalConfig>,
        cache_ttl: Duration,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            parser: WrapperUrlParser::new(&config),
            handshake: HandshakeUseCase::new(portal.clone(), config.clone())?,
            listing: ListAttachmentsUseCase::new(portal.clone(), config.clone()),
            download: DownloadAttachmentUseCase::new(portal, config),
            cache,
            cache_ttl,
        })
    }

    /// Wrapper URL classifier used by this resolver.
    #[must_use]
    pub const fn parser(&self) -> &WrapperUrlParser {
        &self.parser
    }

    /// Resolves `raw` to image bytes or an unresolved reason.
    pub async fn resolve(&self, raw: &str) -> ResolvedImage {
        let mut state = ResolutionState::Parsing(raw.to_string());
        loop {
            state = match self.step(state).await {
                ResolutionState::NotAWrapper => {
                    return ResolvedImage::Unresolved(UnresolvedReason::NotAWrapper);
                }
                ResolutionState::CacheHit(hit) => return hit,
                ResolutionState::Resolved { case_id, bytes } => {
                    let result = ResolvedImage::Bytes(bytes);
                    self.cache.put(case_id, result.clone(), self.cache_ttl);
                    return result;
                }
                ResolutionState::Unresolved { case_id, reason } => {
                    let result = ResolvedImage::Unresolved(reason);
                    self.cache.put(case_id, result.clone(), self.cache_ttl);
                    return result;
                }
                next => next,
            };
        }
    }

    /// Advances `state` by one transition. Terminal states are returned
    /// unchanged.
    pub async fn step(&self, state: ResolutionState) -> ResolutionState {
        let from = state.name();
        let next = match state {
            ResolutionState::Parsing(raw) => match self.parser.parse(&raw) {
                Some(case) => ResolutionState::CacheCheck(case),
                None => ResolutionState::NotAWrapper,
            },
            ResolutionState::CacheCheck(case) => match self.cache.get(&case.case_id) {
                Some(hit) => ResolutionState::CacheHit(hit.as_cache_hit()),
                None => ResolutionState::Handshaking(case),
            },
            ResolutionState::Handshaking(case) => {
                let case_id = case.case_id.clone();
                match self.handshake.execute(case).await {
                    Ok(handshake) => ResolutionState::Listing(handshake),
                    Err(e) => failed(case_id, &e),
                }
            }
            ResolutionState::Listing(handshake) => {
                let manifest = self.listing.execute(&handshake).await;
                ResolutionState::Selecting(handshake, manifest)
            }
            ResolutionState::Selecting(handshake, manifest) => match select_attachment(&manifest) {
                Some(attachment) => ResolutionState::Downloading(handshake, attachment),
                None => failed(handshake.case_id, &ResolveError::EmptyManifest),
            },
            ResolutionState::Downloading(handshake, attachment) => {
                match self.download.execute(&handshake, &attachment).await {
                    Ok(bytes) => ResolutionState::Validating {
                        case_id: handshake.case_id,
                        bytes,
                    },
                    Err(e) => failed(handshake.case_id, &e),
                }
            }
            ResolutionState::Validating { case_id, bytes } => {
                match validate_image_blocking(bytes).await {
                    Ok(bytes) => ResolutionState::Resolved { case_id, bytes },
                    Err(e) => failed(case_id, &e),
                }
            }
            terminal => terminal,
        };
        debug!(from, to = next.name(), "Resolution transition");
        next
    }

    /// What to render for a raw media URL.
    ///
    /// Anything that is not a wrapper URL passes through unchanged; wrapper
    /// URLs are resolved to bytes. Blank input and unresolvable wrappers
    /// yield `None`.
    pub async fn resolve_for_display(&self, raw: &str) -> Option<DisplayImage> {
        if raw.trim().is_empty() {
            return None;
        }
        if !self.parser.is_wrapper(raw) {
            return Some(DisplayImage::Url(raw.to_string()));
        }
        match self.resolve(raw).await {
            ResolvedImage::Bytes(bytes) => Some(DisplayImage::Bytes(bytes)),
            ResolvedImage::Unresolved(reason) => {
                debug!(reason = %reason, "Omitting media item");
                None
            }
        }
    }

    /// [`Self::resolve_for_display`] for a record's media field.
    pub async fn resolve_media(&self, item: &MediaItem) -> Option<DisplayImage> {
        match item.url() {
            Some(url) => self.resolve_for_display(url).await,
            None => None,
        }
    }
}

fn failed(case_id: CaseId, error: &ResolveError) -> ResolutionState {
    warn!(case_id = %case_id, kind = ?error.kind(), error = %error, "Resolution failed");
    ResolutionState::Unresolved {
        case_id,
        reason: error.reason(),
    }
}
