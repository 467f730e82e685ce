//! # Live Dashboard Example
//!
//! Demonstrates a complete Scorewall client lifecycle:
//!
//! 1. Connect to a dashboard server via WebSocket
//! 2. Follow the game phase announcements
//! 3. Register a player while the registration window is open
//! 4. Print posted results and the aggregated leaderboard
//! 5. Shut down gracefully on Ctrl+C
//!
//! ## Running
//!
//! ```sh
//! # Start a Scorewall server on localhost:8080, then:
//! cargo run --example live_dashboard
//!
//! # Override the server URL:
//! SCOREWALL_URL=ws://my-server:8080/ws cargo run --example live_dashboard
//!
//! # Register a player when the window opens:
//! SCOREWALL_NICK=RustPlayer cargo run --example live_dashboard
//! ```

use scorewall_client::protocol::RegistrationRecord;
use scorewall_client::{ScorewallClient, ScorewallConfig, ScorewallEvent, WebSocketConnector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // `RUST_LOG=debug` shows per-frame diagnostics.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("SCOREWALL_URL")
        .unwrap_or_else(|_| ScorewallConfig::default_endpoint("localhost", 8080));
    tracing::info!("Dashboard endpoint: {url}");

    // Start the client. This spawns a background task that dials through
    // the connector, retries with backoff, and emits events on `event_rx`.
    let config = ScorewallConfig::new(url);
    let (mut client, mut event_rx) = ScorewallClient::start(WebSocketConnector, config);

    // ── Event loop ──────────────────────────────────────────────────
    // Use `tokio::select!` to listen for both dashboard events and Ctrl+C.
    loop {
        tokio::select! {
            // Branch 1: Incoming event from the dashboard (or transport layer).
            event = event_rx.recv() => {
                let Some(event) = event else {
                    // Channel closed: the supervisor task exited.
                    tracing::info!("Event stream ended, exiting");
                    break;
                };

                match event {
                    // ── Connection lifecycle ─────────────────────────
                    ScorewallEvent::Connected => {
                        tracing::info!("Connected, awaiting announcements");
                    }

                    ScorewallEvent::Disconnected { reason } => {
                        // The client redials on its own; nothing to do here.
                        tracing::warn!(
                            "Disconnected ({}), reconnecting automatically",
                            reason.as_deref().unwrap_or("connection closed")
                        );
                    }

                    // ── Game phases ──────────────────────────────────
                    ScorewallEvent::WaitingStart => {
                        tracing::info!("Waiting for the next game to start");
                    }

                    ScorewallEvent::RegistrationOpen => {
                        tracing::info!("Registration window is open");
                        if let Ok(nick) = std::env::var("SCOREWALL_NICK") {
                            client.submit_registration(RegistrationRecord::named(&nick))?;
                            tracing::info!("Registration submitted for {nick}");
                        }
                    }

                    ScorewallEvent::GameInProgress => {
                        tracing::info!("Game in progress");
                    }

                    // ── Results ──────────────────────────────────────
                    ScorewallEvent::AttemptPosted { result } => {
                        tracing::info!(
                            "{} scored {}. {}",
                            result.nick_name,
                            result.score,
                            result.remark()
                        );
                    }

                    ScorewallEvent::LeaderboardUpdated { players } => {
                        // Summaries arrive in first-seen order; rank them here.
                        let mut ranked: Vec<_> = players.iter().collect();
                        ranked.sort_by(|a, b| b.best_score.cmp(&a.best_score));
                        tracing::info!("Leaderboard ({} player(s)):", ranked.len());
                        for (place, player) in ranked.iter().enumerate() {
                            tracing::info!(
                                "  {}. {} with {} over {} attempt(s)",
                                place + 1,
                                player.nick_name,
                                player.best_score,
                                player.attempts.len()
                            );
                        }
                    }
                }
            }

            // Branch 2: Ctrl+C, shut down gracefully.
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    // ── Cleanup ─────────────────────────────────────────────────────
    client.shutdown().await;
    tracing::info!("Dashboard client stopped");
    Ok(())
}
