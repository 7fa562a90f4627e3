//! Codec trait and implementations for serializing messages.
//!
//! A codec converts between Rust types and raw bytes. The gateway doesn't
//! care HOW messages are serialized — it just needs something implementing
//! [`Codec`]. [`JsonCodec`] is the default; a binary codec could be swapped
//! in without touching any other layer.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust types to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the codec is shared across connection
/// handler tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T)
    -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON via `serde_json`.
///
/// Human-readable on the wire, which is what the browser client expects
/// and what you want while debugging in DevTools.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientEvent, RoomId};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let event = ClientEvent::StartGame {
            room_id: RoomId::new("alice-1A2B3C4D"),
        };
        let bytes = codec.encode(&event).unwrap();
        let back: ClientEvent = codec.decode(&bytes).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_json_codec_decode_garbage_fails() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
