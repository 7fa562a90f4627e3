//! Wire protocol for Wordspy.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerNotification`], [`GamePhase`],
//!   identity newtypes, snapshot shapes) — the structures that travel on
//!   the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits between the transport (raw bytes) and the room
//! core (game state). It doesn't know about connections or rooms — it only
//! knows how to describe and serialize messages.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, ConnectionId, GamePhase, PlayerInfo, Recipient, Role,
    RoomId, RoomSnapshot, ServerNotification,
};
