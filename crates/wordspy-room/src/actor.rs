//! Room task: an isolated Tokio task that owns one [`Room`].
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel — no shared mutable state, just message
//! passing. Because the task processes one command at a time, every
//! validate-then-commit sequence is naturally atomic per room, and
//! notifications go out in commit order.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use wordspy_corpus::WordCorpus;
use wordspy_protocol::{
    ConnectionId, Recipient, RoomId, RoomSnapshot, ServerNotification,
};

use crate::room::{Departure, Outbound, Room};
use crate::RoomError;

/// Channel sender for delivering notifications to one connection.
///
/// The gateway creates one per connection and hands it over on
/// create/join; the room task pushes into it after each commit.
pub type NotificationSender = mpsc::UnboundedSender<ServerNotification>;

/// A player-triggered operation on a running room.
#[derive(Debug, Clone)]
pub(crate) enum RoomAction {
    StartGame,
    BeginVoting,
    CastVote { candidate_username: String },
    RevealResults,
}

/// What a disconnect did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DisconnectOutcome {
    /// The connection wasn't a player here.
    NotMember,
    /// The player was removed; the room lives on.
    Removed,
    /// The last player left; the task has stopped and the registry must
    /// drop its handle.
    Drained,
}

/// Commands sent to a room task through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel — the
/// caller sends a command and awaits the outcome, which makes every
/// operation a strictly ordered request/response against the room.
pub(crate) enum RoomCommand {
    /// Add a player and register its notification channel.
    Join {
        connection_id: ConnectionId,
        username: String,
        sender: NotificationSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Apply a player-triggered operation.
    Act {
        connection_id: ConnectionId,
        action: RoomAction,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Host-initiated termination. On success the task broadcasts the
    /// farewell and stops.
    End {
        connection_id: ConnectionId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Remove a departed connection.
    Disconnect {
        connection_id: ConnectionId,
        reply: oneshot::Sender<DisconnectOutcome>,
    },

    /// Request the current public snapshot.
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// Handle to a running room task. Cheap to clone — just an
/// `mpsc::Sender` wrapper. The registry holds one per room.
#[derive(Clone)]
pub(crate) struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    fn unavailable(&self) -> RoomError {
        RoomError::Internal(format!("room {} is unavailable", self.room_id))
    }

    pub(crate) async fn join(
        &self,
        connection_id: ConnectionId,
        username: String,
        sender: NotificationSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                connection_id,
                username,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub(crate) async fn act(
        &self,
        connection_id: ConnectionId,
        action: RoomAction,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Act {
                connection_id,
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub(crate) async fn end(
        &self,
        connection_id: ConnectionId,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::End {
                connection_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub(crate) async fn disconnect(
        &self,
        connection_id: ConnectionId,
    ) -> Result<DisconnectOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Disconnect {
                connection_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub(crate) async fn snapshot(
        &self,
    ) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }
}

/// The room task state. Runs inside a Tokio task.
struct RoomTask {
    room: Room,
    corpus: Arc<WordCorpus>,
    rng: StdRng,
    /// Per-connection notification channels, maintained alongside the
    /// player list.
    senders: HashMap<ConnectionId, NotificationSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomTask {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.room_id(), "room task started");

        // The creator is already a player; announce the fresh room.
        self.dispatch(vec![self.room.room_updated()]);

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    connection_id,
                    username,
                    sender,
                    reply,
                } => {
                    let result =
                        self.room.join(connection_id.clone(), username);
                    match result {
                        Ok(notifications) => {
                            self.senders.insert(connection_id, sender);
                            self.dispatch(notifications);
                            let _ = reply.send(Ok(()));
                        }
                        Err(e) => {
                            let _ = reply.send(Err(e));
                        }
                    }
                }

                RoomCommand::Act {
                    connection_id,
                    action,
                    reply,
                } => {
                    let result = self.apply(&connection_id, action);
                    match result {
                        Ok(notifications) => {
                            self.dispatch(notifications);
                            let _ = reply.send(Ok(()));
                        }
                        Err(e) => {
                            tracing::debug!(
                                room_id = %self.room.room_id(),
                                %connection_id,
                                error = %e,
                                "operation rejected"
                            );
                            let _ = reply.send(Err(e));
                        }
                    }
                }

                RoomCommand::End {
                    connection_id,
                    reply,
                } => match self.room.end(&connection_id) {
                    Ok(notifications) => {
                        self.dispatch(notifications);
                        let _ = reply.send(Ok(()));
                        tracing::info!(
                            room_id = %self.room.room_id(),
                            "room ended by host"
                        );
                        break;
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                },

                RoomCommand::Disconnect {
                    connection_id,
                    reply,
                } => {
                    self.senders.remove(&connection_id);
                    match self.room.remove_connection(&connection_id) {
                        Departure::NotMember => {
                            let _ =
                                reply.send(DisconnectOutcome::NotMember);
                        }
                        Departure::Removed { notifications } => {
                            tracing::info!(
                                room_id = %self.room.room_id(),
                                %connection_id,
                                players = self.room.players().len(),
                                "player left"
                            );
                            self.dispatch(notifications);
                            let _ = reply.send(DisconnectOutcome::Removed);
                        }
                        Departure::Drained { notifications } => {
                            self.dispatch(notifications);
                            let _ = reply.send(DisconnectOutcome::Drained);
                            tracing::info!(
                                room_id = %self.room.room_id(),
                                "last player left, room drained"
                            );
                            break;
                        }
                    }
                }

                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.room.snapshot());
                }
            }
        }

        tracing::info!(room_id = %self.room.room_id(), "room task stopped");
    }

    fn apply(
        &mut self,
        connection_id: &ConnectionId,
        action: RoomAction,
    ) -> Result<Vec<Outbound>, RoomError> {
        match action {
            RoomAction::StartGame => self.room.start_round(
                connection_id,
                &self.corpus,
                &mut self.rng,
            ),
            RoomAction::BeginVoting => {
                self.room.begin_voting(connection_id)
            }
            RoomAction::CastVote { candidate_username } => {
                self.room.cast_vote(connection_id, candidate_username)
            }
            RoomAction::RevealResults => {
                self.room.reveal_results(connection_id)
            }
        }
    }

    /// Delivers committed notifications. Sends to gone receivers are
    /// silently dropped (the connection is on its way out anyway).
    fn dispatch(&self, notifications: Vec<Outbound>) {
        for (recipient, notification) in notifications {
            match recipient {
                Recipient::All => {
                    for sender in self.senders.values() {
                        let _ = sender.send(notification.clone());
                    }
                }
                Recipient::Connection(connection_id) => {
                    if let Some(sender) = self.senders.get(&connection_id)
                    {
                        let _ = sender.send(notification);
                    }
                }
            }
        }
    }
}

/// Spawns a room task for a freshly created room and returns its handle.
///
/// `channel_size` bounds the command channel; if it fills up, senders
/// wait rather than pile up unbounded.
pub(crate) fn spawn_room(
    room_id: RoomId,
    creator: ConnectionId,
    username: String,
    sender: NotificationSender,
    corpus: Arc<WordCorpus>,
    rng: StdRng,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let room = Room::new(room_id.clone(), creator.clone(), username);
    let task = RoomTask {
        room,
        corpus,
        rng,
        senders: HashMap::from([(creator, sender)]),
        receiver: rx,
    };

    tokio::spawn(task.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
