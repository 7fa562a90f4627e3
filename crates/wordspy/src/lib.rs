//! # Wordspy
//!
//! WebSocket gateway for the wordspy social deduction game.
//!
//! This crate ties the layers together: it accepts WebSocket
//! connections, decodes [`ClientEvent`]s, dispatches them to the
//! shared [`RoomRegistry`], and streams [`ServerNotification`]s back
//! to each client as JSON text frames.
//!
//! ```rust,no_run
//! use wordspy::GatewayServer;
//!
//! # async fn run() -> Result<(), wordspy::GatewayError> {
//! let server = GatewayServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! [`ClientEvent`]: wordspy_protocol::ClientEvent
//! [`ServerNotification`]: wordspy_protocol::ServerNotification
//! [`RoomRegistry`]: wordspy_room::RoomRegistry

mod error;
mod handler;
mod server;

pub use error::GatewayError;
pub use server::{GatewayServer, GatewayServerBuilder};
