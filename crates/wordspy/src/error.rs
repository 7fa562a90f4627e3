//! Unified error type for the gateway.

use wordspy_protocol::ProtocolError;
use wordspy_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, wrong phase, not authorized).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A socket-level I/O error (bind, accept).
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// A WebSocket framing error (handshake, send, recv).
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordspy_protocol::RoomId;

    #[test]
    fn test_from_protocol_error() {
        let cause = serde_json::from_slice::<wordspy_protocol::ClientEvent>(
            b"not json",
        )
        .unwrap_err();
        let gateway_err: GatewayError = ProtocolError::Decode(cause).into();
        assert!(matches!(gateway_err, GatewayError::Protocol(_)));
        assert!(gateway_err.to_string().contains("decode failed"));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(RoomId::new("u1-00000000"));
        let gateway_err: GatewayError = err.into();
        assert!(matches!(gateway_err, GatewayError::Room(_)));
    }

    #[test]
    fn test_from_io_error() {
        let err = std::io::Error::new(
            std::io::ErrorKind::AddrInUse,
            "taken",
        );
        let gateway_err: GatewayError = err.into();
        assert!(matches!(gateway_err, GatewayError::Io(_)));
    }
}
