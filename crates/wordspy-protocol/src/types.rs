//! Core protocol types for Wordspy's wire format.
//!
//! Every type here either travels on the wire as JSON or describes where a
//! message should be delivered. Wire field names are camelCase and event
//! names are kebab-case (`"create-room"`, `"room-updated"`, ...) so that a
//! browser client can consume them directly — except `submit_vote` and
//! `reveal_results`, which the existing client sends in snake_case.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Opaque, stable identifier of a client connection.
///
/// Assigned by the gateway when a connection is accepted, and used
/// everywhere below it: host identity, spy identity, vote deltas. It is a
/// newtype over `String` so a `ConnectionId` can never be confused with a
/// username or a `RoomId`.
///
/// `#[serde(transparent)]` serializes it as the bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Creates a `ConnectionId` from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of one room (one isolated game session).
///
/// Generated at room creation as `{username}-{random suffix}`, immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a `RoomId` from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ---------------------------------------------------------------------------
// Game phase
// ---------------------------------------------------------------------------

/// The room's position in the round lifecycle.
///
/// Transitions are strictly ordered:
///
/// ```text
/// LOBBY → DISCUSSION → VOTING → RESULT
///              ↑                   │
///              └─── next round ────┘
/// ```
///
/// plus room destruction from any phase via explicit termination. No phase
/// may be skipped or reversed otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    Discussion,
    Voting,
    Result,
}

impl GamePhase {
    /// Returns `true` if new players may join.
    ///
    /// RESULT is joinable so a new player can enter before the next round
    /// starts.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby | Self::Result)
    }

    /// Returns `true` if the host may start a (new) round.
    pub fn can_start_round(&self) -> bool {
        matches!(self, Self::Lobby | Self::Result)
    }

    /// Returns `true` if a round is underway and the secret roles/words
    /// are assigned.
    pub fn round_active(&self) -> bool {
        matches!(self, Self::Discussion | Self::Voting | Self::Result)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "LOBBY"),
            Self::Discussion => write!(f, "DISCUSSION"),
            Self::Voting => write!(f, "VOTING"),
            Self::Result => write!(f, "RESULT"),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The secret role a player holds for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Holds the alternate word; wins by evading majority suspicion.
    Spy,
    /// Holds the shared secret word.
    Player,
}

// ---------------------------------------------------------------------------
// Recipient — who should receive a notification?
// ---------------------------------------------------------------------------

/// Specifies who should receive a server notification.
///
/// The room engine returns `(Recipient, ServerNotification)` pairs; the
/// delivery layer decides WHERE each one goes without the engine knowing
/// anything about sockets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every connection currently in the room.
    All,
    /// One specific connection (private messages: roles, errors).
    Connection(ConnectionId),
}

// ---------------------------------------------------------------------------
// Snapshot shapes
// ---------------------------------------------------------------------------

/// Public view of one player, as broadcast in room snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    /// The connection holding this player.
    pub connection_id: ConnectionId,
    /// Display name. Unique within a room only by convention.
    pub username: String,
    /// Round wins accumulated within this room.
    pub score: u32,
    /// Empty string, or the username this player voted for.
    pub vote: String,
}

/// Public snapshot of a room, broadcast on every `room-updated`.
///
/// Deliberately excludes `spyId`, `secretWord` and `spyWord`: the words
/// reach each player privately via `role-assigned` and are revealed to the
/// whole room only in the final `results` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// The room's unique ID.
    pub room_id: RoomId,
    /// Connection id of the current host.
    pub host_id: ConnectionId,
    /// Players in join order.
    pub players: Vec<PlayerInfo>,
    /// Current phase.
    pub phase: GamePhase,
}

// ---------------------------------------------------------------------------
// ClientEvent — inbound
// ---------------------------------------------------------------------------

/// An inbound event from a client.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.:
///
/// ```json
/// { "type": "join-room", "roomId": "alice-1A2B3C4D", "username": "bob" }
/// ```
///
/// Required-field presence is enforced by deserialization; emptiness is
/// validated by the registry before the event reaches a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Create a new room with the caller as host and sole player.
    #[serde(rename_all = "camelCase")]
    CreateRoom { username: String },

    /// Join an existing room.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId, username: String },

    /// Host only: start a round (LOBBY or RESULT → DISCUSSION).
    #[serde(rename_all = "camelCase")]
    StartGame { room_id: RoomId },

    /// Host only: open the ballot (DISCUSSION → VOTING).
    ///
    /// The browser client emits this one (and `reveal_results`) in
    /// snake_case, unlike every other event. Kept verbatim so existing
    /// clients work unchanged.
    #[serde(rename = "submit_vote", rename_all = "camelCase")]
    SubmitVote { room_id: RoomId },

    /// Cast or change the caller's vote during VOTING.
    #[serde(rename_all = "camelCase")]
    CastVote {
        room_id: RoomId,
        candidate_username: String,
    },

    /// Host only: tally, score, and reveal (VOTING → RESULT).
    #[serde(rename = "reveal_results", rename_all = "camelCase")]
    RevealResults { room_id: RoomId },

    /// Host only: delete the room.
    #[serde(rename_all = "camelCase")]
    EndRoom { room_id: RoomId },
}

// ---------------------------------------------------------------------------
// ServerNotification — outbound
// ---------------------------------------------------------------------------

/// An outbound notification from the server.
///
/// Same tagging scheme as [`ClientEvent`]: `{ "type": "room-updated", ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerNotification {
    /// Broadcast: the room's public state changed.
    #[serde(rename_all = "camelCase")]
    RoomUpdated { room: RoomSnapshot },

    /// Private: the caller's secret role and word for this round.
    #[serde(rename_all = "camelCase")]
    RoleAssigned { role: Role, word: String },

    /// Broadcast: one player's vote changed. A per-vote delta rather than
    /// a full snapshot, so votes don't rebroadcast the whole player list.
    #[serde(rename_all = "camelCase")]
    VoteUpdated {
        connection_id: ConnectionId,
        vote: String,
    },

    /// Broadcast: the round's tally, scoring outcome, and the words.
    #[serde(rename_all = "camelCase")]
    Results {
        /// Votes received per candidate username. Only candidates with at
        /// least one vote appear.
        vote_counts: HashMap<String, u32>,
        /// Whether the spy was among the top-voted candidates.
        spy_caught: bool,
        /// Username of the spy, if one was assigned this round.
        spy_username: Option<String>,
        /// The spy's word, revealed to everyone.
        spy_word: String,
        /// The shared secret word, revealed to everyone.
        secret_word: String,
        /// Final player list with updated scores.
        players: Vec<PlayerInfo>,
    },

    /// Broadcast: the room no longer exists.
    RoomDeleted,

    /// Private: an operation failed; the room is unchanged.
    #[serde(rename_all = "camelCase")]
    RoomError { message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(all(test, feature = "json"))]
mod tests {
    //! Wire-shape tests. The JSON here is what a browser client sees, so a
    //! serde attribute regression breaks every client — these pin the exact
    //! format.

    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_connection_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ConnectionId::new("conn-7")).unwrap();
        assert_eq!(json, "\"conn-7\"");
    }

    #[test]
    fn test_room_id_round_trip() {
        let id = RoomId::new("alice-1A2B3C4D");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice-1A2B3C4D\"");
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_connection_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new("a"), 1);
        map.insert(ConnectionId::new("b"), 2);
        assert_eq!(map[&ConnectionId::new("a")], 1);
    }

    // =====================================================================
    // GamePhase
    // =====================================================================

    #[test]
    fn test_phase_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&GamePhase::Lobby).unwrap(),
            "\"LOBBY\""
        );
        assert_eq!(
            serde_json::to_string(&GamePhase::Discussion).unwrap(),
            "\"DISCUSSION\""
        );
        assert_eq!(
            serde_json::to_string(&GamePhase::Voting).unwrap(),
            "\"VOTING\""
        );
        assert_eq!(
            serde_json::to_string(&GamePhase::Result).unwrap(),
            "\"RESULT\""
        );
    }

    #[test]
    fn test_phase_joinable() {
        assert!(GamePhase::Lobby.is_joinable());
        assert!(GamePhase::Result.is_joinable());
        assert!(!GamePhase::Discussion.is_joinable());
        assert!(!GamePhase::Voting.is_joinable());
    }

    #[test]
    fn test_phase_round_active() {
        assert!(!GamePhase::Lobby.round_active());
        assert!(GamePhase::Discussion.round_active());
        assert!(GamePhase::Voting.round_active());
        assert!(GamePhase::Result.round_active());
    }

    #[test]
    fn test_phase_display_matches_wire() {
        assert_eq!(GamePhase::Discussion.to_string(), "DISCUSSION");
    }

    // =====================================================================
    // Role
    // =====================================================================

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Spy).unwrap(), "\"spy\"");
        assert_eq!(
            serde_json::to_string(&Role::Player).unwrap(),
            "\"player\""
        );
    }

    // =====================================================================
    // ClientEvent — one shape test per event name
    // =====================================================================

    #[test]
    fn test_create_room_event_json_format() {
        let event: ClientEvent = serde_json::from_str(
            r#"{ "type": "create-room", "username": "alice" }"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::CreateRoom {
                username: "alice".into()
            }
        );
    }

    #[test]
    fn test_join_room_event_json_format() {
        let event: ClientEvent = serde_json::from_str(
            r#"{ "type": "join-room", "roomId": "alice-1A2B3C4D", "username": "bob" }"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                room_id: RoomId::new("alice-1A2B3C4D"),
                username: "bob".into()
            }
        );
    }

    #[test]
    fn test_cast_vote_event_uses_camel_case_fields() {
        let event = ClientEvent::CastVote {
            room_id: RoomId::new("r"),
            candidate_username: "bob".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "cast-vote");
        assert_eq!(json["roomId"], "r");
        assert_eq!(json["candidateUsername"], "bob");
    }

    #[test]
    fn test_host_event_names() {
        for (event, name) in [
            (ClientEvent::StartGame { room_id: "r".into() }, "start-game"),
            (ClientEvent::SubmitVote { room_id: "r".into() }, "submit_vote"),
            (
                ClientEvent::RevealResults { room_id: "r".into() },
                "reveal_results",
            ),
            (ClientEvent::EndRoom { room_id: "r".into() }, "end-room"),
        ] {
            let json: serde_json::Value =
                serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], name);
        }
    }

    #[test]
    fn test_vote_flow_events_use_snake_case_names() {
        // These two event names are snake_case on the wire, unlike the
        // rest; the browser client sends them exactly like this.
        let open: ClientEvent = serde_json::from_str(
            r#"{ "type": "submit_vote", "roomId": "r" }"#,
        )
        .unwrap();
        assert_eq!(open, ClientEvent::SubmitVote { room_id: "r".into() });

        let reveal: ClientEvent = serde_json::from_str(
            r#"{ "type": "reveal_results", "roomId": "r" }"#,
        )
        .unwrap();
        assert_eq!(
            reveal,
            ClientEvent::RevealResults { room_id: "r".into() }
        );

        // The kebab-case spellings are not part of the protocol.
        assert!(
            serde_json::from_str::<ClientEvent>(
                r#"{ "type": "submit-vote", "roomId": "r" }"#
            )
            .is_err()
        );
    }

    #[test]
    fn test_event_missing_required_field_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{ "type": "join-room", "username": "bob" }"#);
        assert!(result.is_err(), "roomId is required");
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result: Result<ClientEvent, _> =
            serde_json::from_str(r#"{ "type": "fly-to-moon" }"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerNotification
    // =====================================================================

    fn sample_snapshot() -> RoomSnapshot {
        RoomSnapshot {
            room_id: RoomId::new("alice-1A2B3C4D"),
            host_id: ConnectionId::new("conn-1"),
            players: vec![PlayerInfo {
                connection_id: ConnectionId::new("conn-1"),
                username: "alice".into(),
                score: 0,
                vote: String::new(),
            }],
            phase: GamePhase::Lobby,
        }
    }

    #[test]
    fn test_room_updated_json_format() {
        let note = ServerNotification::RoomUpdated {
            room: sample_snapshot(),
        };
        let json: serde_json::Value = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "room-updated");
        assert_eq!(json["room"]["roomId"], "alice-1A2B3C4D");
        assert_eq!(json["room"]["hostId"], "conn-1");
        assert_eq!(json["room"]["phase"], "LOBBY");
        assert_eq!(json["room"]["players"][0]["username"], "alice");
        // The secret state never appears in a public snapshot.
        assert!(json["room"].get("spyId").is_none());
        assert!(json["room"].get("secretWord").is_none());
        assert!(json["room"].get("spyWord").is_none());
    }

    #[test]
    fn test_role_assigned_json_format() {
        let note = ServerNotification::RoleAssigned {
            role: Role::Spy,
            word: "Banana".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "role-assigned");
        assert_eq!(json["role"], "spy");
        assert_eq!(json["word"], "Banana");
    }

    #[test]
    fn test_vote_updated_json_format() {
        let note = ServerNotification::VoteUpdated {
            connection_id: ConnectionId::new("conn-2"),
            vote: "alice".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "vote-updated");
        assert_eq!(json["connectionId"], "conn-2");
        assert_eq!(json["vote"], "alice");
    }

    #[test]
    fn test_results_json_format() {
        let note = ServerNotification::Results {
            vote_counts: HashMap::from([("alice".to_string(), 2)]),
            spy_caught: true,
            spy_username: Some("alice".into()),
            spy_word: "Banana".into(),
            secret_word: "Apple".into(),
            players: vec![],
        };
        let json: serde_json::Value = serde_json::to_value(&note).unwrap();
        assert_eq!(json["type"], "results");
        assert_eq!(json["voteCounts"]["alice"], 2);
        assert_eq!(json["spyCaught"], true);
        assert_eq!(json["spyUsername"], "alice");
        assert_eq!(json["spyWord"], "Banana");
        assert_eq!(json["secretWord"], "Apple");
    }

    #[test]
    fn test_room_deleted_has_no_payload() {
        let json = serde_json::to_string(&ServerNotification::RoomDeleted)
            .unwrap();
        assert_eq!(json, r#"{"type":"room-deleted"}"#);
    }

    #[test]
    fn test_room_error_round_trip() {
        let note = ServerNotification::RoomError {
            message: "room alice-1A2B3C4D not found".into(),
        };
        let bytes = serde_json::to_vec(&note).unwrap();
        let back: ServerNotification =
            serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, note);
    }
}
