//! Error types for the room core.
//!
//! Every rejected operation maps to exactly one of these variants, and a
//! rejected operation never mutates room state. The gateway renders the
//! Display form as a private `room-error` notification to the caller.

use wordspy_protocol::{ConnectionId, GamePhase, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// A required field is missing or empty.
    #[error("{0}")]
    Validation(String),

    /// The referenced room does not exist.
    #[error("room {0} does not exist")]
    NotFound(RoomId),

    /// The caller is not the host (host-only operations) or not a player
    /// in the room (player-only operations).
    #[error("{0}")]
    Authorization(String),

    /// The operation is not legal in the room's current phase.
    #[error("cannot {action} while the room is in {phase}")]
    InvalidPhase {
        /// What the caller tried to do.
        action: &'static str,
        /// The phase the room was in.
        phase: GamePhase,
    },

    /// The caller is already a player in this room.
    #[error("connection {connection_id} already joined room {room_id}")]
    Duplicate {
        connection_id: ConnectionId,
        room_id: RoomId,
    },

    /// A registry-level failure, e.g. the room's task went away while a
    /// command was in flight. Reported, not retried.
    #[error("internal error: {0}")]
    Internal(String),
}
