//! Script body codec.
//!
//! Scripts travel base64-encoded. On disk they are kept as a JSON array of
//! source lines so diffs stay readable. Lines are split on `\n` only; a `\r`
//! before the break stays part of its line, so joining restores the exact
//! bytes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{SyncError, SyncResult};

/// Decode a base64 script body into its source text.
pub fn decode_text(encoded: &str) -> SyncResult<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SyncError::Encoding(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| SyncError::Encoding(e.to_string()))
}

/// Encode source text as a base64 script body.
pub fn encode_text(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Decode a base64 script body into its source lines.
pub fn decode_to_lines(encoded: &str) -> SyncResult<Vec<String>> {
    let text = decode_text(encoded)?;
    Ok(text.split('\n').map(str::to_string).collect())
}

/// Join source lines and encode them as a base64 script body.
pub fn encode_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let joined = lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");
    encode_text(&joined)
}
