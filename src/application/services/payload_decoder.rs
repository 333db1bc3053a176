//! Decodes base64 attachment payloads returned by the custom-action endpoint.

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose},
};
use bytes::Bytes;

use crate::domain::errors::ResolveError;

const DATA_URI_MARKER: &str = ";base64,";

const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Strips an optional `<mime>;base64,` prefix from a payload.
#[must_use]
pub fn strip_data_uri(payload: &str) -> &str {
    let lower = payload.to_ascii_lowercase();
    match lower.find(DATA_URI_MARKER) {
        Some(idx) => &payload[idx + DATA_URI_MARKER.len()..],
        None => payload,
    }
}

/// Decodes a payload to raw bytes.
///
/// Whitespace is ignored and padding is optional.
///
/// # Errors
/// Returns `PayloadDecode` for empty or malformed payloads.
pub fn decode_payload(payload: &str) -> Result<Bytes, ResolveError> {
    let encoded: String = strip_data_uri(payload)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if encoded.is_empty() {
        return Err(ResolveError::payload_decode("payload is empty"));
    }

    general_purpose::STANDARD
        .decode(&encoded)
        .or_else(|_| LENIENT.decode(&encoded))
        .map(Bytes::from)
        .map_err(|e| ResolveError::payload_decode(e.to_string()))
}
