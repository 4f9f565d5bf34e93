//! Share-link codec: the three buffer texts as base64 of compact JSON, the
//! exact token format carried in a playground link's `code` query parameter.
//! Backward link compatibility depends on this shape staying put.

use crate::buffers::BufferSnapshot;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    InvalidBase64(String),
    InvalidUtf8(String),
    InvalidJson(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBase64(message) => write!(f, "token is not valid base64: {message}"),
            Self::InvalidUtf8(message) => write!(f, "token payload is not UTF-8: {message}"),
            Self::InvalidJson(message) => write!(f, "token payload is not a project: {message}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Serializes `{markup, style, behavior}` (no timestamp) to a reversible
/// token. Total: every snapshot encodes.
pub fn encode_for_sharing(snapshot: &BufferSnapshot) -> String {
    let json = serde_json::json!({
        "markup": snapshot.markup,
        "style": snapshot.style,
        "behavior": snapshot.behavior,
    })
    .to_string();
    STANDARD.encode(json)
}

/// All-or-nothing: either every field decodes or the whole operation fails.
pub fn decode_from_sharing(token: &str) -> Result<BufferSnapshot, DecodeError> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|err| DecodeError::InvalidBase64(err.to_string()))?;
    let json =
        String::from_utf8(bytes).map_err(|err| DecodeError::InvalidUtf8(err.to_string()))?;
    serde_json::from_str(&json).map_err(|err| DecodeError::InvalidJson(err.to_string()))
}

/// Accepts either a bare token or a full playground link carrying it as the
/// `code` query parameter.
pub fn token_from_link(raw: &str) -> &str {
    let raw = raw.trim();
    let Some(start) = raw.find("code=") else {
        return raw;
    };
    let token = &raw[start + "code=".len()..];
    match token.find('&') {
        Some(end) => &token[..end],
        None => token,
    }
}
