//! Per-connection handler: decode client events, route to the registry,
//! forward room notifications back over the socket.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The task owns the write half of the socket and a channel
//! the room tasks push notifications into, so everything the client
//! sees goes out through a single writer.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use wordspy_protocol::{
    ClientEvent, Codec, ConnectionId, ServerNotification,
};
use wordspy_room::RoomError;

use crate::GatewayError;
use crate::server::ServerState;

type WsStream = WebSocketStream<tokio::net::TcpStream>;

/// Handles a single connection from accept to close.
///
/// Runs until the client closes the socket or the write half fails,
/// then removes the connection from every room it is in.
pub(crate) async fn handle_connection(
    ws: WsStream,
    connection_id: ConnectionId,
    state: Arc<ServerState>,
) -> Result<(), GatewayError> {
    let (mut sink, mut stream) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerNotification>();

    let result = loop {
        tokio::select! {
            note = rx.recv() => {
                // All senders live in room tasks; they are only dropped
                // after we disconnect, so a closed channel is a stop.
                let Some(note) = note else { break Ok(()) };
                // Break, never return: every exit path must fall
                // through to the registry disconnect below.
                let bytes = match state.codec.encode(&note) {
                    Ok(bytes) => bytes,
                    Err(e) => break Err(GatewayError::Protocol(e)),
                };
                let text = String::from_utf8_lossy(&bytes).into_owned();
                if let Err(e) = sink.send(Message::Text(text.into())).await {
                    tracing::debug!(
                        %connection_id, error = %e, "send failed"
                    );
                    break Ok(());
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(
                            text.as_bytes(),
                            &connection_id,
                            &state,
                            &tx,
                        )
                        .await;
                    }
                    Some(Ok(Message::Binary(data))) => {
                        handle_frame(&data, &connection_id, &state, &tx)
                            .await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(
                            %connection_id, "connection closed"
                        );
                        break Ok(());
                    }
                    // ping/pong/frame
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(GatewayError::WebSocket(e)),
                }
            }
        }
    };

    state.registry.disconnect(&connection_id).await;
    result
}

/// Decodes one frame and dispatches it. Failures are reported to the
/// sender as a `room-error` notification instead of tearing down the
/// connection.
async fn handle_frame(
    data: &[u8],
    connection_id: &ConnectionId,
    state: &Arc<ServerState>,
    tx: &mpsc::UnboundedSender<ServerNotification>,
) {
    let event: ClientEvent = match state.codec.decode(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(
                %connection_id, error = %e, "failed to decode event"
            );
            let _ = tx.send(ServerNotification::RoomError {
                message: format!("invalid message: {e}"),
            });
            return;
        }
    };

    if let Err(e) = dispatch(event, connection_id, state, tx).await {
        tracing::debug!(%connection_id, error = %e, "event rejected");
        let _ = tx.send(ServerNotification::RoomError {
            message: e.to_string(),
        });
    }
}

/// Routes one client event to the registry.
async fn dispatch(
    event: ClientEvent,
    connection_id: &ConnectionId,
    state: &Arc<ServerState>,
    tx: &mpsc::UnboundedSender<ServerNotification>,
) -> Result<(), RoomError> {
    let registry = &state.registry;
    match event {
        ClientEvent::CreateRoom { username } => {
            let room_id = registry
                .create_room(
                    connection_id.clone(),
                    username,
                    tx.clone(),
                )
                .await?;
            tracing::info!(%connection_id, %room_id, "room created");
        }
        ClientEvent::JoinRoom { room_id, username } => {
            registry
                .join_room(
                    connection_id.clone(),
                    &room_id,
                    username,
                    tx.clone(),
                )
                .await?;
            tracing::info!(%connection_id, %room_id, "joined room");
        }
        ClientEvent::StartGame { room_id } => {
            registry.start_game(connection_id, &room_id).await?;
        }
        ClientEvent::SubmitVote { room_id } => {
            registry.begin_voting(connection_id, &room_id).await?;
        }
        ClientEvent::CastVote {
            room_id,
            candidate_username,
        } => {
            registry
                .cast_vote(connection_id, &room_id, candidate_username)
                .await?;
        }
        ClientEvent::RevealResults { room_id } => {
            registry.reveal_results(connection_id, &room_id).await?;
        }
        ClientEvent::EndRoom { room_id } => {
            registry.end_room(connection_id, &room_id).await?;
            tracing::info!(%connection_id, %room_id, "room ended");
        }
    }
    Ok(())
}
