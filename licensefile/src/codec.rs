//! Signature text encoding.
//!
//! Raw signature bytes are stored in `LicenseFile::signature` as standard
//! base64 with padding.

use crate::error::{LicenseError, LicenseResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Encodes raw signature bytes for the `Signature` field.
#[must_use]
pub fn encode_signature(raw: &[u8]) -> String {
    BASE64.encode(raw)
}

/// Decodes the `Signature` field.
///
/// An empty field is the normal state of an unsigned document and yields
/// [`LicenseError::NotSigned`], distinct from malformed text.
pub fn decode_signature(text: &str) -> LicenseResult<Vec<u8>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LicenseError::NotSigned);
    }
    BASE64
        .decode(text)
        .map_err(|e| LicenseError::Decode(format!("invalid signature base64: {e}")))
}
