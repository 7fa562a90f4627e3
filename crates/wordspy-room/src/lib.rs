//! Room core for Wordspy: the game state machine and its concurrency
//! discipline.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! room's state outright. Events from any number of connections funnel
//! through the room's command channel, so at most one mutation is in
//! flight per room while unrelated rooms proceed in parallel.
//!
//! # Key types
//!
//! - [`Room`] — the pure state machine: one method per operation,
//!   validate-then-commit, returns the notifications to deliver
//! - [`RoomRegistry`] — owns the room table; creates rooms, routes events,
//!   garbage-collects drained rooms
//! - [`RoomError`] — why an operation was rejected
//! - [`tally_votes`] — the vote tally used at reveal time

mod actor;
mod error;
mod registry;
mod room;

pub use actor::NotificationSender;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{Departure, Outbound, Player, Room, VoteTally, tally_votes};
