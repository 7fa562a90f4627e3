//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding messages.
///
/// When you see a `ProtocolError` the problem is in serialization, not in
/// networking or room state.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing required fields,
    /// wrong data types, or an unknown event name.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
