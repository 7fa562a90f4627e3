//! Room registry: owns the room table, creates and destroys rooms, and
//! routes events to the right room task.
//!
//! The registry's own lock guards only the table — lookups, inserts,
//! removals. It is never held across a room operation, so contention on
//! one room cannot stall another.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;
use wordspy_corpus::WordCorpus;
use wordspy_protocol::{ConnectionId, RoomId, RoomSnapshot};

use crate::actor::{
    DisconnectOutcome, NotificationSender, RoomAction, RoomHandle,
    spawn_room,
};
use crate::RoomError;

/// Default command channel size for room tasks.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Length of the random room id suffix, in hex digits.
const ROOM_SUFFIX_LEN: usize = 8;

struct Inner {
    /// Active rooms, keyed by room id.
    rooms: HashMap<RoomId, RoomHandle>,

    /// The rooms each connection currently belongs to, so a disconnect
    /// doesn't have to scan the whole table.
    members: HashMap<ConnectionId, HashSet<RoomId>>,
}

/// Process-wide room table and lifecycle owner.
///
/// Constructed once at startup and injected into the gateway — there is
/// no module-level singleton. All methods take `&self`; the registry is
/// meant to live in an `Arc` shared across connection handler tasks.
pub struct RoomRegistry {
    inner: Mutex<Inner>,
    corpus: Arc<WordCorpus>,
    /// When set, room RNGs derive from this seed instead of OS entropy,
    /// making spy and word selection reproducible in tests.
    rng_seed: Option<u64>,
    rooms_created: AtomicU64,
}

impl RoomRegistry {
    /// Creates a registry over the given corpus, using OS entropy for all
    /// random decisions.
    pub fn new(corpus: WordCorpus) -> Self {
        Self {
            inner: Mutex::new(Inner {
                rooms: HashMap::new(),
                members: HashMap::new(),
            }),
            corpus: Arc::new(corpus),
            rng_seed: None,
            rooms_created: AtomicU64::new(0),
        }
    }

    /// Like [`new`](Self::new), but every room's RNG derives from `seed`
    /// (offset by creation order), so test runs are reproducible.
    pub fn with_seed(corpus: WordCorpus, seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Self::new(corpus)
        }
    }

    fn room_rng(&self) -> StdRng {
        let nth = self.rooms_created.fetch_add(1, Ordering::Relaxed);
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(nth)),
            None => StdRng::from_os_rng(),
        }
    }

    // -- lifecycle ---------------------------------------------------------

    /// Creates a room with the caller as host and sole player, and
    /// returns the new room's id.
    ///
    /// Id allocation happens under the table lock, so a fresh id cannot
    /// race with anything.
    pub async fn create_room(
        &self,
        connection_id: ConnectionId,
        username: String,
        sender: NotificationSender,
    ) -> Result<RoomId, RoomError> {
        if username.is_empty() {
            return Err(RoomError::Validation("username is required".into()));
        }

        let rng = self.room_rng();
        let mut inner = self.inner.lock().await;

        let room_id = loop {
            let candidate = generate_room_id(&username);
            if !inner.rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let handle = spawn_room(
            room_id.clone(),
            connection_id.clone(),
            username,
            sender,
            Arc::clone(&self.corpus),
            rng,
            DEFAULT_CHANNEL_SIZE,
        );
        inner.rooms.insert(room_id.clone(), handle);
        inner
            .members
            .entry(connection_id)
            .or_default()
            .insert(room_id.clone());

        tracing::info!(room_id = %room_id, "room created");
        Ok(room_id)
    }

    /// Adds a connection to an existing room.
    pub async fn join_room(
        &self,
        connection_id: ConnectionId,
        room_id: &RoomId,
        username: String,
        sender: NotificationSender,
    ) -> Result<(), RoomError> {
        if room_id.as_str().is_empty() || username.is_empty() {
            return Err(RoomError::Validation(
                "all fields are required".into(),
            ));
        }

        let handle = self.handle(room_id).await?;
        handle
            .join(connection_id.clone(), username, sender)
            .await?;

        let mut inner = self.inner.lock().await;
        inner
            .members
            .entry(connection_id)
            .or_default()
            .insert(room_id.clone());
        Ok(())
    }

    /// Host-initiated room termination. Broadcasts the farewell, then
    /// drops the room.
    pub async fn end_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        if room_id.as_str().is_empty() {
            return Err(RoomError::Validation("roomId is required".into()));
        }

        let handle = self.handle(room_id).await?;
        handle.end(connection_id.clone()).await?;

        let mut inner = self.inner.lock().await;
        inner.rooms.remove(room_id);
        for rooms in inner.members.values_mut() {
            rooms.remove(room_id);
        }
        inner.members.retain(|_, rooms| !rooms.is_empty());

        tracing::info!(room_id = %room_id, "room removed from registry");
        Ok(())
    }

    /// Removes a departed connection from every room it was in.
    ///
    /// Idempotent: a second call for the same connection finds no
    /// memberships and does nothing. Rooms left empty are dropped.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        let room_ids: Vec<RoomId> = {
            let mut inner = self.inner.lock().await;
            inner
                .members
                .remove(connection_id)
                .map(|rooms| rooms.into_iter().collect())
                .unwrap_or_default()
        };

        for room_id in room_ids {
            let handle = {
                let inner = self.inner.lock().await;
                inner.rooms.get(&room_id).cloned()
            };
            let Some(handle) = handle else {
                continue;
            };

            match handle.disconnect(connection_id.clone()).await {
                Ok(DisconnectOutcome::Drained) => {
                    let mut inner = self.inner.lock().await;
                    inner.rooms.remove(&room_id);
                    tracing::info!(
                        room_id = %room_id,
                        "drained room removed from registry"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    // Room task already gone; nothing left to clean up.
                    tracing::debug!(
                        room_id = %room_id,
                        %connection_id,
                        error = %e,
                        "disconnect delivery failed"
                    );
                }
            }
        }
    }

    // -- round operations --------------------------------------------------

    /// Host only: start a round (LOBBY or RESULT → DISCUSSION).
    pub async fn start_game(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        self.act(connection_id, room_id, RoomAction::StartGame).await
    }

    /// Host only: open the ballot (DISCUSSION → VOTING).
    pub async fn begin_voting(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        self.act(connection_id, room_id, RoomAction::BeginVoting)
            .await
    }

    /// Record the caller's vote during VOTING.
    pub async fn cast_vote(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        candidate_username: String,
    ) -> Result<(), RoomError> {
        if candidate_username.is_empty() {
            return Err(RoomError::Validation(
                "all fields are required".into(),
            ));
        }
        self.act(
            connection_id,
            room_id,
            RoomAction::CastVote { candidate_username },
        )
        .await
    }

    /// Host only: tally, score, and reveal (VOTING → RESULT).
    pub async fn reveal_results(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RoomError> {
        self.act(connection_id, room_id, RoomAction::RevealResults)
            .await
    }

    async fn act(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
        action: RoomAction,
    ) -> Result<(), RoomError> {
        if room_id.as_str().is_empty() {
            return Err(RoomError::Validation("roomId is required".into()));
        }
        let handle = self.handle(room_id).await?;
        handle.act(connection_id.clone(), action).await
    }

    // -- introspection -----------------------------------------------------

    /// Returns the room's public snapshot.
    pub async fn snapshot(
        &self,
        room_id: &RoomId,
    ) -> Result<RoomSnapshot, RoomError> {
        let handle = self.handle(room_id).await?;
        handle.snapshot().await
    }

    /// Number of rooms currently in the table.
    pub async fn room_count(&self) -> usize {
        self.inner.lock().await.rooms.len()
    }

    /// Returns `true` if the room id is currently allocated.
    pub async fn contains(&self, room_id: &RoomId) -> bool {
        self.inner.lock().await.rooms.contains_key(room_id)
    }

    async fn handle(
        &self,
        room_id: &RoomId,
    ) -> Result<RoomHandle, RoomError> {
        self.inner
            .lock()
            .await
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }
}

/// Generates a human-readable room id: the creator's name plus an
/// uppercase hex suffix, e.g. `alice-1A2B3C4D`.
fn generate_room_id(username: &str) -> RoomId {
    let suffix: u32 = rand::rng().random();
    RoomId::new(format!("{username}-{suffix:0width$X}", width = ROOM_SUFFIX_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_has_username_prefix_and_hex_suffix() {
        let id = generate_room_id("alice");
        let id = id.as_str();
        let suffix = id.strip_prefix("alice-").expect("prefix");
        assert_eq!(suffix.len(), ROOM_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(
            suffix.chars().all(|c| !c.is_ascii_lowercase()),
            "suffix is uppercased"
        );
    }
}
