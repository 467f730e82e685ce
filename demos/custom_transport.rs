//! # Loopback Transport Example
//!
//! Implements the [`Transport`] and [`Connector`] traits over an
//! in-process channel pair, no sockets involved. The same recipe applies
//! to any byte pipe you want to put the dashboard protocol on (TCP, QUIC,
//! WebRTC data channels) and to scripted servers in tests.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example custom_transport
//! ```

use async_trait::async_trait;
use scorewall_client::{
    Connector, ScorewallClient, ScorewallConfig, ScorewallError, ScorewallEvent, Transport,
};
use tokio::sync::mpsc;

// ─────────────────────────────────────────────────────────────────────
// Step 1: a channel-backed loopback transport
// ─────────────────────────────────────────────────────────────────────

/// In-process stand-in for a network transport.
///
/// The loopback consists of two halves:
/// - The **client half** (`LoopbackTransport`) implements [`Transport`] and
///   is produced by `LoopbackConnector` when the client dials.
/// - The **server half** (`LoopbackServer`) lets you inject announcements
///   and read what the client sent.
pub struct LoopbackTransport {
    /// Outbound: what the client sends, the server half reads.
    tx: mpsc::UnboundedSender<String>,
    /// Inbound: what the server half sends, the client reads.
    rx: mpsc::UnboundedReceiver<String>,
}

/// The "server side" of the loopback. Use this to drive the conversation.
pub struct LoopbackServer {
    /// Frames the client transmitted.
    pub rx: mpsc::UnboundedReceiver<String>,
    /// Pushes announcements at the client, as a real server would.
    pub tx: mpsc::UnboundedSender<String>,
}

/// A [`Connector`] that yields the loopback's client half on the first
/// dial. The client redials after a connection loss, so a real connector
/// would build a fresh transport per call; this single-shot demo parks
/// any further dials instead.
pub struct LoopbackConnector {
    transport: Option<LoopbackTransport>,
}

/// Create a connected `(connector, server)` pair.
fn loopback_pair() -> (LoopbackConnector, LoopbackServer) {
    // Client to server channel.
    let (client_tx, server_rx) = mpsc::unbounded_channel();
    // Server to client channel.
    let (server_tx, client_rx) = mpsc::unbounded_channel();

    let connector = LoopbackConnector {
        transport: Some(LoopbackTransport {
            tx: client_tx,
            rx: client_rx,
        }),
    };
    let server = LoopbackServer {
        rx: server_rx,
        tx: server_tx,
    };

    (connector, server)
}

// ─────────────────────────────────────────────────────────────────────
// Step 2: Transport and Connector impls for the loopback
// ─────────────────────────────────────────────────────────────────────

#[async_trait]
impl Transport for LoopbackTransport {
    /// Push one frame at the scripted server.
    async fn send(&mut self, message: String) -> Result<(), ScorewallError> {
        self.tx
            .send(message)
            .map_err(|e| ScorewallError::TransportSend(e.to_string()))
    }

    /// Take the next frame the server pushed.
    ///
    /// `None` once the server half drops its sender, which is how the
    /// client learns the connection is gone. Cancel-safe because
    /// `mpsc::UnboundedReceiver::recv` is.
    async fn recv(&mut self) -> Option<Result<String, ScorewallError>> {
        self.rx.recv().await.map(Ok)
    }

    /// Close is a no-op for channels. Dropping is sufficient.
    async fn close(&mut self) -> Result<(), ScorewallError> {
        Ok(())
    }
}

#[async_trait]
impl Connector for LoopbackConnector {
    type Transport = LoopbackTransport;

    async fn connect(&mut self, _url: &str) -> Result<LoopbackTransport, ScorewallError> {
        match self.transport.take() {
            Some(transport) => Ok(transport),
            // The one loopback connection is spent; park further dials.
            None => std::future::pending().await,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 3: drive the client against the scripted server
// ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for readable output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Create the loopback pair and start the client against it.
    let (connector, mut server) = loopback_pair();
    let config = ScorewallConfig::new("loopback://demo");
    let (mut client, mut event_rx) = ScorewallClient::start(connector, config);

    // ── Fake server: open the registration window ───────────────────
    // The JSON must match the wire format: the `type` tag sits beside the
    // payload fields, e.g. {"type": "currentResult", "currentResult": {…}}.
    server
        .tx
        .send(serde_json::json!({"type": "openUserRegistration"}).to_string())?;

    // ── React to the window: register a player ──────────────────────
    loop {
        let Some(event) = event_rx.recv().await else {
            return Err("event channel closed before registration opened".into());
        };
        match event {
            ScorewallEvent::Connected => {
                tracing::info!("Event: Connected");
            }
            ScorewallEvent::RegistrationOpen => {
                tracing::info!("Event: RegistrationOpen, submitting a registration");
                client.submit_registration(
                    scorewall_client::protocol::RegistrationRecord::named("LoopbackPlayer"),
                )?;
                break;
            }
            other => {
                tracing::info!("Event: {other:?}");
            }
        }
    }

    // ── Fake server: read the registration the client sent ──────────
    let Some(registration) = server.rx.recv().await else {
        return Err("server channel closed before the registration arrived".into());
    };
    tracing::info!("Server received: {registration}");

    // ── Fake server: run a round and publish the board ──────────────
    server
        .tx
        .send(serde_json::json!({"type": "gameInProgress"}).to_string())?;
    server.tx.send(
        serde_json::json!({
            "type": "currentResult",
            "currentResult": {"nickName": "LoopbackPlayer", "score": 1450}
        })
        .to_string(),
    )?;
    server.tx.send(
        serde_json::json!({
            "type": "leaderBoard",
            "leaderBoard": [
                {"nickName": "LoopbackPlayer", "score": 1450},
                {"nickName": "LoopbackPlayer", "score": 900}
            ]
        })
        .to_string(),
    )?;

    // ── Read events until the board arrives ─────────────────────────
    while let Some(event) = event_rx.recv().await {
        match event {
            ScorewallEvent::AttemptPosted { result } => {
                tracing::info!(
                    "Event: {} scored {}. {}",
                    result.nick_name,
                    result.score,
                    result.remark()
                );
            }
            ScorewallEvent::LeaderboardUpdated { players } => {
                for player in &players {
                    tracing::info!(
                        "Board: {} best {} over {} attempt(s)",
                        player.nick_name,
                        player.best_score,
                        player.attempts.len()
                    );
                }
                break;
            }
            other => {
                tracing::info!("Event: {other:?}");
            }
        }
    }

    // ── Clean shutdown ──────────────────────────────────────────────
    client.shutdown().await;
    tracing::info!("Done. Custom transport works!");
    Ok(())
}
