//! Downloads and decodes one attachment of a case.

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::services::decode_payload;
use crate::domain::entities::SelectedAttachment;
use crate::domain::errors::ResolveError;
use crate::domain::ports::PortalPort;
use crate::infrastructure::config::PortalConfig;

use super::handshake_use_case::Handshake;
use super::portal_requests::custom_action;

/// Fetches an attachment's base64 payload and decodes it.
pub struct DownloadAttachmentUseCase {
    portal: Arc<dyn PortalPort>,
    config: Arc<PortalConfig>,
}

impl DownloadAttachmentUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(portal: Arc<dyn PortalPort>, config: Arc<PortalConfig>) -> Self {
        Self { portal, config }
    }

    /// Returns the attachment's raw bytes.
    ///
    /// # Errors
    /// Returns `Download` on transport failure, non-2xx status or a non-JSON
    /// body, `PayloadMissing` when the payload field is absent and
    /// `PayloadDecode` for malformed base64.
    pub async fn execute(
        &self,
        handshake: &Handshake,
        attachment: &SelectedAttachment,
    ) -> Result<Bytes, ResolveError> {
        let case_id = &handshake.case_id;
        let request = custom_action(
            &self.config,
            handshake,
            &self.config.download_action,
            Some(&attachment.filename),
        )
        .map_err(ResolveError::download)?;

        debug!(case_id = %case_id, filename = %attachment.filename, "Downloading attachment");

        let response = self.portal.send(&request).await.map_err(|e| {
            warn!(case_id = %case_id, error = %e, "Download request failed");
            ResolveError::download(e.to_string())
        })?;

        if !response.is_success() {
            warn!(case_id = %case_id, status = response.status, "Download returned error status");
            return Err(ResolveError::download(format!("HTTP {}", response.status)));
        }

        let json: Value = response
            .json()
            .map_err(|e| ResolveError::download(format!("failed to parse response: {e}")))?;

        let payload = json
            .pointer(&self.config.payload_pointer)
            .and_then(Value::as_str)
            .ok_or(ResolveError::PayloadMissing)?;

        let bytes = decode_payload(payload)?;
        debug!(case_id = %case_id, size = bytes.len(), "Decoded attachment payload");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{CaseId, FormRef, SessionContext};
    use crate::domain::errors::PortalError;
    use crate::domain::ports::mocks::{RecordingPortal, json_response, response};
    use base64::{Engine as _, engine::general_purpose};
    use serde_json::json;

    fn handshake() -> Handshake {
        let form_ref = FormRef::new("ABC123").unwrap();
        Handshake {
            case_id: CaseId::new("12345").unwrap(),
            form_ref,
            session: SessionContext::new("https://p.example", "https://p.example/f?caseid=12345"),
        }
    }

    async fn run(portal: Arc<RecordingPortal>) -> Result<Bytes, ResolveError> {
        DownloadAttachmentUseCase::new(portal, Arc::new(PortalConfig::default()))
            .execute(&handshake(), &SelectedAttachment::new("photo1.jpg"))
            .await
    }

    #[tokio::test]
    async fn test_downloads_and_decodes() {
        let encoded = general_purpose::STANDARD.encode(b"raw-bytes");
        let portal = Arc::new(RecordingPortal::new(move |req| {
            Ok(json_response(
                &req.url,
                &json!({"data": {"txt_file": format!("data:image/jpeg;base64,{encoded}")}}),
            ))
        }));

        let bytes = run(portal.clone()).await.unwrap();
        assert_eq!(bytes.as_ref(), b"raw-bytes");

        let requests = portal.requests();
        assert!(requests[0].url.contains("action=download_attachment"));
        let body = requests[0].json_body.as_ref().unwrap();
        assert_eq!(body["data"]["filename"], "photo1.jpg");
        assert_eq!(body["data"]["formref"], "ABC123");
    }

    #[tokio::test]
    async fn test_missing_payload() {
        let portal = Arc::new(RecordingPortal::new(|req| {
            Ok(json_response(&req.url, &json!({"data": {"other": 1}})))
        }));
        let err = run(portal).await.unwrap_err();
        assert!(matches!(err, ResolveError::PayloadMissing));
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let portal = Arc::new(RecordingPortal::new(|req| {
            Ok(json_response(&req.url, &json!({"data": {"txt_file": "%%%"}})))
        }));
        let err = run(portal).await.unwrap_err();
        assert!(matches!(err, ResolveError::PayloadDecode { .. }));
    }

    #[tokio::test]
    async fn test_error_status() {
        let portal = Arc::new(RecordingPortal::new(|req| Ok(response(403, &req.url, ""))));
        let err = run(portal).await.unwrap_err();
        assert!(matches!(err, ResolveError::Download { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let portal = Arc::new(RecordingPortal::new(|_| Err(PortalError::Timeout)));
        let err = run(portal).await.unwrap_err();
        assert!(matches!(err, ResolveError::Download { .. }));
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let portal = Arc::new(RecordingPortal::new(|req| {
            Ok(response(200, &req.url, "<html>error</html>"))
        }));
        let err = run(portal).await.unwrap_err();
        assert!(matches!(err, ResolveError::Download { .. }));
    }
}
