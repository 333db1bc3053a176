//! Lists the attachment filenames of a case.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::entities::AttachmentManifest;
use crate::domain::ports::PortalPort;
use crate::infrastructure::config::PortalConfig;

use super::handshake_use_case::Handshake;
use super::portal_requests::custom_action;

/// Requests the manifest for a case through the custom-action endpoint.
pub struct ListAttachmentsUseCase {
    portal: Arc<dyn PortalPort>,
    config: Arc<PortalConfig>,
}

impl ListAttachmentsUseCase {
    /// Creates new use case.
    #[must_use]
    pub const fn new(portal: Arc<dyn PortalPort>, config: Arc<PortalConfig>) -> Self {
        Self { portal, config }
    }

    /// Returns the case's manifest. Transport failures and a missing
    /// manifest field both produce an empty manifest.
    pub async fn execute(&self, handshake: &Handshake) -> AttachmentManifest {
        let case_id = &handshake.case_id;
        let request = match custom_action(&self.config, handshake, &self.config.list_action, None)
        {
            Ok(request) => request,
            Err(e) => {
                warn!(case_id = %case_id, error = %e, "Could not build listing request");
                return AttachmentManifest::default();
            }
        };

        let response = match self.portal.send(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(case_id = %case_id, error = %e, "Listing request failed");
                return AttachmentManifest::default();
            }
        };

        if !response.is_success() {
            warn!(case_id = %case_id, status = response.status, "Listing returned error status");
            return AttachmentManifest::default();
        }

        let manifest = match response.json::<Value>() {
            Ok(json) => manifest_from_json(&json, &self.config.manifest_pointer),
            Err(e) => {
                warn!(case_id = %case_id, error = %e, "Listing response is not JSON");
                AttachmentManifest::default()
            }
        };

        debug!(case_id = %case_id, count = manifest.len(), "Listed attachments");
        manifest
    }
}

/// Reads the filename list at `pointer`: a semicolon-joined string, or an
/// array of strings.
fn manifest_from_json(json: &Value, pointer: &str) -> AttachmentManifest {
    match json.pointer(pointer) {
        Some(Value::String(joined)) => AttachmentManifest::from_joined(joined),
        Some(Value::Array(items)) => AttachmentManifest::new(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect(),
        ),
        _ => AttachmentManifest::default(),
    }
}
