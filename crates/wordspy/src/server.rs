//! `GatewayServer` builder and accept loop.
//!
//! This is the entry point for running a wordspy server. It owns the
//! TCP listener and the shared [`RoomRegistry`]; each accepted
//! connection gets its own handler task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpListener;
use wordspy_corpus::WordCorpus;
use wordspy_protocol::{ConnectionId, JsonCodec};
use wordspy_room::RoomRegistry;

use crate::GatewayError;
use crate::handler::handle_connection;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry does its own locking internally.
pub(crate) struct ServerState {
    pub(crate) registry: RoomRegistry,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a gateway server.
pub struct GatewayServerBuilder {
    bind_addr: String,
    corpus: WordCorpus,
    seed: Option<u64>,
}

impl GatewayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            corpus: WordCorpus::builtin(),
            seed: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Replaces the built-in word corpus.
    pub fn corpus(mut self, corpus: WordCorpus) -> Self {
        self.corpus = corpus;
        self
    }

    /// Seeds the registry's randomness for reproducible rounds.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<GatewayServer, GatewayError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "gateway listening");

        let registry = match self.seed {
            Some(seed) => RoomRegistry::with_seed(self.corpus, seed),
            None => RoomRegistry::new(self.corpus),
        };

        Ok(GatewayServer {
            listener,
            state: Arc::new(ServerState {
                registry,
                codec: JsonCodec,
            }),
        })
    }
}

impl Default for GatewayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running wordspy gateway.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GatewayServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl GatewayServer {
    /// Creates a new builder.
    pub fn builder() -> GatewayServerBuilder {
        GatewayServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections, completes the WebSocket
    /// handshake, and spawns a handler task for each client. Runs
    /// until the process is terminated.
    pub async fn run(self) -> Result<(), GatewayError> {
        tracing::info!("wordspy gateway running");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let ws = match tokio_tungstenite::accept_async(
                            stream,
                        )
                        .await
                        {
                            Ok(ws) => ws,
                            Err(e) => {
                                tracing::debug!(
                                    %addr,
                                    error = %e,
                                    "websocket handshake failed"
                                );
                                return;
                            }
                        };

                        let connection_id = ConnectionId::new(format!(
                            "conn-{}",
                            NEXT_CONNECTION_ID
                                .fetch_add(1, Ordering::Relaxed)
                        ));
                        tracing::debug!(
                            %connection_id, %addr, "accepted connection"
                        );

                        if let Err(e) =
                            handle_connection(ws, connection_id, state)
                                .await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
