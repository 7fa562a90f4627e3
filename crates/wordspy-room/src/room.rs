//! The room state machine: data model, phase transitions, tally and
//! scoring.
//!
//! Everything in this module is pure and synchronous — no channels, no
//! sockets, no global state. Each operation validates against the current
//! phase and caller identity, then either commits and returns the
//! notifications to deliver, or fails without mutating anything. The actor
//! in [`crate::actor`] owns a `Room` and serializes access to it.

use std::collections::HashMap;

use rand::Rng;
use wordspy_corpus::WordCorpus;
use wordspy_protocol::{
    ConnectionId, GamePhase, PlayerInfo, Recipient, Role, RoomId,
    RoomSnapshot, ServerNotification,
};

use crate::RoomError;

/// A notification paired with who should receive it.
pub type Outbound = (Recipient, ServerNotification);

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One player in a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// The connection holding this player. Stable for the player's
    /// lifetime; removing the connection removes the player.
    pub connection_id: ConnectionId,
    /// Display name. Unique within a room only by convention.
    pub username: String,
    /// Round wins. Persists across rounds, reset only with the room.
    pub score: u32,
    /// Empty string, or the username this player voted for. Votes are
    /// only written during VOTING and cleared on entry to DISCUSSION and
    /// VOTING.
    pub vote: String,
}

impl Player {
    fn new(connection_id: ConnectionId, username: String) -> Self {
        Self {
            connection_id,
            username,
            score: 0,
            vote: String::new(),
        }
    }

    fn info(&self) -> PlayerInfo {
        PlayerInfo {
            connection_id: self.connection_id.clone(),
            username: self.username.clone(),
            score: self.score,
            vote: self.vote.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tally
// ---------------------------------------------------------------------------

/// The outcome of counting votes at reveal time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    /// Votes received per candidate username. Candidates with zero votes
    /// do not appear.
    pub counts: HashMap<String, u32>,
    /// The largest count present, 0 if no votes were cast.
    pub max: u32,
    /// Every username whose count equals `max`. Empty when no votes were
    /// cast — NOT "everyone".
    pub top_voted: Vec<String>,
}

/// Counts all non-empty votes.
///
/// A vote for a username that no longer matches any player still counts;
/// there is no reconciliation pass for players who left mid-vote.
pub fn tally_votes(players: &[Player]) -> VoteTally {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for player in players {
        if !player.vote.is_empty() {
            *counts.entry(player.vote.clone()).or_insert(0) += 1;
        }
    }

    let max = counts.values().copied().max().unwrap_or(0);
    let top_voted = if max == 0 {
        Vec::new()
    } else {
        counts
            .iter()
            .filter(|(_, count)| **count == max)
            .map(|(username, _)| username.clone())
            .collect()
    };

    VoteTally {
        counts,
        max,
        top_voted,
    }
}

// ---------------------------------------------------------------------------
// Departure
// ---------------------------------------------------------------------------

/// What happened when a connection was removed from a room.
#[derive(Debug)]
pub enum Departure {
    /// The connection wasn't a player here; nothing changed.
    NotMember,
    /// The player was removed; the room lives on (host possibly
    /// reassigned).
    Removed { notifications: Vec<Outbound> },
    /// The last player left; the room must be destroyed.
    Drained { notifications: Vec<Outbound> },
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

/// One isolated game session.
///
/// Invariants held between operations:
/// - `players` is non-empty (a drained room is destroyed by its owner)
/// - `host_id` is always the `connection_id` of some player
/// - `spy_id`, `secret_word`, `spy_word` are all `None` in LOBBY and all
///   `Some` in DISCUSSION/VOTING/RESULT
#[derive(Debug, Clone)]
pub struct Room {
    room_id: RoomId,
    host_id: ConnectionId,
    players: Vec<Player>,
    phase: GamePhase,
    spy_id: Option<ConnectionId>,
    secret_word: Option<String>,
    spy_word: Option<String>,
    /// Vote counts snapshot, populated at reveal. Not live state.
    results: HashMap<String, u32>,
}

impl Room {
    /// Creates a room in LOBBY with the creator as host and sole player.
    pub fn new(
        room_id: RoomId,
        creator: ConnectionId,
        username: String,
    ) -> Self {
        Self {
            room_id,
            host_id: creator.clone(),
            players: vec![Player::new(creator, username)],
            phase: GamePhase::Lobby,
            spy_id: None,
            secret_word: None,
            spy_word: None,
            results: HashMap::new(),
        }
    }

    // -- accessors ---------------------------------------------------------

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn host_id(&self) -> &ConnectionId {
        &self.host_id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn spy_id(&self) -> Option<&ConnectionId> {
        self.spy_id.as_ref()
    }

    pub fn secret_word(&self) -> Option<&str> {
        self.secret_word.as_deref()
    }

    pub fn spy_word(&self) -> Option<&str> {
        self.spy_word.as_deref()
    }

    /// Vote counts from the most recent reveal.
    pub fn results(&self) -> &HashMap<String, u32> {
        &self.results
    }

    /// Public view of the room. Excludes the secret round state.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_id.clone(),
            host_id: self.host_id.clone(),
            players: self.players.iter().map(Player::info).collect(),
            phase: self.phase,
        }
    }

    pub(crate) fn room_updated(&self) -> Outbound {
        (
            Recipient::All,
            ServerNotification::RoomUpdated {
                room: self.snapshot(),
            },
        )
    }

    fn require_host(
        &self,
        actor: &ConnectionId,
        action: &str,
    ) -> Result<(), RoomError> {
        if self.host_id != *actor {
            return Err(RoomError::Authorization(format!(
                "only the host can {action}"
            )));
        }
        Ok(())
    }

    fn is_member(&self, connection_id: &ConnectionId) -> bool {
        self.players
            .iter()
            .any(|p| p.connection_id == *connection_id)
    }

    // -- operations --------------------------------------------------------

    /// Adds a player. Allowed in LOBBY, and in RESULT so newcomers can
    /// enter before the next round starts.
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        username: String,
    ) -> Result<Vec<Outbound>, RoomError> {
        if !self.phase.is_joinable() {
            return Err(RoomError::InvalidPhase {
                action: "join",
                phase: self.phase,
            });
        }
        if self.is_member(&connection_id) {
            return Err(RoomError::Duplicate {
                connection_id,
                room_id: self.room_id.clone(),
            });
        }

        self.players.push(Player::new(connection_id, username));
        Ok(vec![self.room_updated()])
    }

    /// Host only: starts a round (LOBBY or RESULT → DISCUSSION).
    ///
    /// Atomically: clears the previous round's spy/words/results, picks a
    /// spy uniformly at random, draws one word pair from the corpus,
    /// clears every vote, and moves to DISCUSSION. Emits a room-wide
    /// update plus one private role assignment per player.
    pub fn start_round(
        &mut self,
        actor: &ConnectionId,
        corpus: &WordCorpus,
        rng: &mut impl Rng,
    ) -> Result<Vec<Outbound>, RoomError> {
        self.require_host(actor, "start the game")?;
        if !self.phase.can_start_round() {
            return Err(RoomError::InvalidPhase {
                action: "start a round",
                phase: self.phase,
            });
        }

        self.results.clear();

        let spy_index = rng.random_range(0..self.players.len());
        self.spy_id = Some(self.players[spy_index].connection_id.clone());

        let pair = corpus.pick(rng);
        self.secret_word = Some(pair.secret.clone());
        self.spy_word = Some(pair.spy.clone());

        for player in &mut self.players {
            player.vote.clear();
        }
        self.phase = GamePhase::Discussion;

        let mut out = vec![self.room_updated()];
        for player in &self.players {
            let role = if self.spy_id.as_ref() == Some(&player.connection_id)
            {
                Role::Spy
            } else {
                Role::Player
            };
            let word = match role {
                Role::Spy => pair.spy.clone(),
                Role::Player => pair.secret.clone(),
            };
            out.push((
                Recipient::Connection(player.connection_id.clone()),
                ServerNotification::RoleAssigned { role, word },
            ));
        }
        Ok(out)
    }

    /// Host only: opens the ballot (DISCUSSION → VOTING).
    ///
    /// Votes were already cleared entering DISCUSSION; clearing again here
    /// keeps the "empty on entry to VOTING" guarantee independent of how
    /// the room got to DISCUSSION.
    pub fn begin_voting(
        &mut self,
        actor: &ConnectionId,
    ) -> Result<Vec<Outbound>, RoomError> {
        self.require_host(actor, "open the vote")?;
        if self.phase != GamePhase::Discussion {
            return Err(RoomError::InvalidPhase {
                action: "open the vote",
                phase: self.phase,
            });
        }

        for player in &mut self.players {
            player.vote.clear();
        }
        self.phase = GamePhase::Voting;
        Ok(vec![self.room_updated()])
    }

    /// Records the caller's vote during VOTING.
    ///
    /// The candidate is not checked against the player list: a vote for a
    /// name that never existed, or whose player has since left, is
    /// accepted and counts at tally time. Emits a per-vote delta rather
    /// than a full snapshot.
    pub fn cast_vote(
        &mut self,
        actor: &ConnectionId,
        candidate_username: String,
    ) -> Result<Vec<Outbound>, RoomError> {
        if !self.is_member(actor) {
            return Err(RoomError::Authorization(
                "join the room before voting".into(),
            ));
        }
        if self.phase != GamePhase::Voting {
            return Err(RoomError::InvalidPhase {
                action: "vote",
                phase: self.phase,
            });
        }

        if let Some(player) = self
            .players
            .iter_mut()
            .find(|p| p.connection_id == *actor)
        {
            player.vote = candidate_username.clone();
        }

        Ok(vec![(
            Recipient::All,
            ServerNotification::VoteUpdated {
                connection_id: actor.clone(),
                vote: candidate_username,
            },
        )])
    }

    /// Host only: tallies, scores, and reveals (VOTING → RESULT).
    ///
    /// The spy is caught iff their username is among the top-voted
    /// candidates — a tie does not protect the spy. When caught, each
    /// player who voted for the spy gains a point; otherwise the spy
    /// gains one. The words are revealed to the whole room only here.
    pub fn reveal_results(
        &mut self,
        actor: &ConnectionId,
    ) -> Result<Vec<Outbound>, RoomError> {
        self.require_host(actor, "reveal the results")?;
        if self.phase != GamePhase::Voting {
            return Err(RoomError::InvalidPhase {
                action: "reveal results",
                phase: self.phase,
            });
        }

        let tally = tally_votes(&self.players);

        let spy_conn = self.spy_id.clone();
        let spy_username = spy_conn.as_ref().and_then(|id| {
            self.players
                .iter()
                .find(|p| p.connection_id == *id)
                .map(|p| p.username.clone())
        });
        let spy_caught = spy_username
            .as_deref()
            .is_some_and(|spy| tally.top_voted.iter().any(|t| t == spy));

        if let Some(spy) = spy_username.as_deref() {
            if spy_caught {
                for player in &mut self.players {
                    if player.vote == spy {
                        player.score += 1;
                    }
                }
            } else if let Some(spy_player) = self
                .players
                .iter_mut()
                .find(|p| Some(&p.connection_id) == spy_conn.as_ref())
            {
                spy_player.score += 1;
            }
        }

        self.results = tally.counts.clone();
        self.phase = GamePhase::Result;

        Ok(vec![
            self.room_updated(),
            (
                Recipient::All,
                ServerNotification::Results {
                    vote_counts: tally.counts,
                    spy_caught,
                    spy_username,
                    spy_word: self.spy_word.clone().unwrap_or_default(),
                    secret_word: self
                        .secret_word
                        .clone()
                        .unwrap_or_default(),
                    players: self.players.iter().map(Player::info).collect(),
                },
            ),
        ])
    }

    /// Host only: terminates the room. Allowed from any phase.
    ///
    /// The room's owner is responsible for actually dropping the state;
    /// this only authorizes the deletion and produces the farewell
    /// broadcast.
    pub fn end(
        &self,
        actor: &ConnectionId,
    ) -> Result<Vec<Outbound>, RoomError> {
        self.require_host(actor, "end the room")?;
        Ok(vec![(Recipient::All, ServerNotification::RoomDeleted)])
    }

    /// Removes the player on `connection_id`, if present.
    ///
    /// If the departing player was host, the first remaining player (in
    /// join order) becomes host. No phase change occurs; votes pointing
    /// at the departed player are left dangling on purpose.
    pub fn remove_connection(
        &mut self,
        connection_id: &ConnectionId,
    ) -> Departure {
        let Some(index) = self
            .players
            .iter()
            .position(|p| p.connection_id == *connection_id)
        else {
            return Departure::NotMember;
        };

        let was_host = self.host_id == *connection_id;
        self.players.remove(index);

        if self.players.is_empty() {
            return Departure::Drained {
                notifications: vec![(
                    Recipient::All,
                    ServerNotification::RoomDeleted,
                )],
            };
        }

        if was_host {
            self.host_id = self.players[0].connection_id.clone();
        }

        Departure::Removed {
            notifications: vec![self.room_updated()],
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
