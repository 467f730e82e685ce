//! Async client for the Scorewall dashboard protocol.
//!
//! [`ScorewallClient`] is a thin handle that communicates with a background
//! connection supervisor task via an unbounded MPSC channel. Events are
//! emitted on a bounded channel
//! ([`tokio::sync::mpsc::Receiver<ScorewallEvent>`]) returned from
//! [`ScorewallClient::start`], and the connection and session state are
//! observable through [`tokio::sync::watch`] channels.
//!
//! The supervisor owns the connection for the whole life of the client: it
//! dials through the supplied [`Connector`], runs the connection until it
//! drops, then redials after a capped, doubling backoff delay. There is no
//! retry limit and no fatal error; a dashboard left running overnight keeps
//! trying until it is shut down.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ScorewallConfig::new("ws://localhost:8080/ws");
//! let (client, mut events) = ScorewallClient::start(WebSocketConnector, config);
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ScorewallEvent::RegistrationOpen => { /* enable the form */ }
//!         ScorewallEvent::LeaderboardUpdated { players } => { /* render */ }
//!         _ => {}
//!     }
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::error::{Result, ScorewallError};
use crate::event::ScorewallEvent;
use crate::protocol::{AttemptRecord, ClientMessage, RegistrationRecord, ServerMessage};
use crate::session::{GamePhase, PlayerSummary, SessionState};
use crate::transport::{Connector, Transport};

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default delay before the first reconnect attempt.
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// Default ceiling for the reconnect delay.
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_millis(3000);

/// Default limit on a single connection attempt.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

// ── Connection state ────────────────────────────────────────────────

/// Connection lifecycle state, owned by the supervisor task.
///
/// Observable through [`ScorewallClient::watch_connection`]. The embedder
/// is a read-only observer; only the supervisor writes transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    /// No connection, and no dial in flight (idle between attempts).
    #[default]
    Disconnected,
    /// A dial attempt is in flight.
    Connecting,
    /// A connection is established and frames are flowing.
    Connected,
}

impl ConnectionState {
    /// True only in the `Connected` state.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`ScorewallClient`].
///
/// Must be supplied to [`ScorewallClient::start`]. The only required field
/// is the endpoint `url`; all others have sensible defaults.
///
/// # Example
///
/// ```
/// use scorewall_client::client::ScorewallConfig;
///
/// let config = ScorewallConfig::new("ws://localhost:8080/ws");
/// assert_eq!(config.url, "ws://localhost:8080/ws");
/// ```
///
/// # Tuning
///
/// ```
/// use scorewall_client::client::ScorewallConfig;
/// use std::time::Duration;
///
/// let config = ScorewallConfig::new("ws://localhost:8080/ws")
///     .with_event_channel_capacity(512)
///     .with_max_backoff(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ScorewallConfig {
    /// Endpoint URL the client dials, e.g. `ws://localhost:8080/ws`.
    ///
    /// Can be changed at runtime with [`ScorewallClient::switch_endpoint`].
    pub url: String,
    /// Capacity of the bounded event channel.
    ///
    /// When the consumer cannot keep up with incoming server messages,
    /// data events are dropped (with a warning logged) to avoid stalling
    /// the supervisor. `Connected` and `Disconnected` are always delivered
    /// regardless of capacity.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// Delay before the first reconnect attempt after a connection is
    /// lost. Subsequent attempts double the delay up to `max_backoff`;
    /// a successful connection resets it.
    ///
    /// Defaults to **1 second**. Values below 1 ms are clamped to 1 ms.
    pub initial_backoff: Duration,
    /// Ceiling for the reconnect delay.
    ///
    /// Defaults to **3 seconds**. Values below `initial_backoff` are
    /// treated as `initial_backoff`.
    pub max_backoff: Duration,
    /// Limit on a single connection attempt. An attempt that exceeds it
    /// counts as a failed dial and re-enters the backoff wait.
    ///
    /// Defaults to **10 seconds**.
    pub connect_timeout: Duration,
    /// Timeout for the graceful shutdown.
    ///
    /// When [`ScorewallClient::shutdown`] is called, the supervisor is
    /// given this much time to close the transport and emit a final
    /// `Disconnected` event. If the timeout expires the task is aborted.
    ///
    /// Defaults to **1 second**. A zero timeout aborts the supervisor
    /// immediately without waiting for graceful shutdown.
    pub shutdown_timeout: Duration,
}

impl ScorewallConfig {
    /// Create a new configuration for the given endpoint URL with default
    /// values.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Conventional endpoint URL for a dashboard server:
    /// `ws://<host>:<port>/ws`.
    ///
    /// ```
    /// use scorewall_client::client::ScorewallConfig;
    ///
    /// assert_eq!(
    ///     ScorewallConfig::default_endpoint("localhost", 8080),
    ///     "ws://localhost:8080/ws"
    /// );
    /// ```
    pub fn default_endpoint(host: &str, port: u16) -> String {
        format!("ws://{host}:{port}/ws")
    }

    /// Set the capacity of the bounded event channel.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the delay before the first reconnect attempt.
    ///
    /// Defaults to **1 second**.
    #[must_use]
    pub fn with_initial_backoff(mut self, delay: Duration) -> Self {
        self.initial_backoff = delay;
        self
    }

    /// Set the ceiling for the reconnect delay.
    ///
    /// Defaults to **3 seconds**.
    #[must_use]
    pub fn with_max_backoff(mut self, ceiling: Duration) -> Self {
        self.max_backoff = ceiling;
        self
    }

    /// Set the limit on a single connection attempt.
    ///
    /// Defaults to **10 seconds**.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the timeout for the graceful shutdown.
    ///
    /// Defaults to **1 second**. A zero timeout aborts the supervisor
    /// immediately without waiting for graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

// ── Commands ────────────────────────────────────────────────────────

/// Commands from the client handle to the supervisor task.
#[derive(Debug)]
enum Command {
    /// Serialize and transmit a message, if a connection is currently up.
    /// Dropped with a debug log otherwise.
    Send(ClientMessage),
    /// Tear down the current connection (or abandon the current dial /
    /// pending retry) and dial this endpoint instead.
    SwitchEndpoint(String),
}

// ── Client handle ───────────────────────────────────────────────────

/// Async client handle for the Scorewall dashboard protocol.
///
/// Created via [`ScorewallClient::start`], which spawns the background
/// connection supervisor and returns this handle together with an event
/// receiver.
///
/// Outbound methods queue a command to the supervisor and return once it
/// is queued (no round-trip await). Sends queued while no connection is up
/// are dropped, not held: a stale registration is worse than a missing
/// one, and the server rebroadcasts everything else on reconnect.
pub struct ScorewallClient {
    /// Sender half of the command channel to the supervisor.
    cmd_tx: mpsc::UnboundedSender<Command>,
    /// Connection state published by the supervisor.
    conn_rx: watch::Receiver<ConnectionState>,
    /// Session state published by the supervisor.
    session_rx: watch::Receiver<SessionState>,
    /// Handle to the background supervisor task.
    task: Option<tokio::task::JoinHandle<()>>,
    /// Oneshot sender to signal the supervisor to shut down gracefully.
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    /// Timeout for the graceful shutdown.
    shutdown_timeout: Duration,
}

impl ScorewallClient {
    /// Start the connection supervisor and return a handle plus event
    /// receiver.
    ///
    /// The supervisor dials `config.url` through `connector` immediately
    /// and keeps redialing (with capped backoff) for as long as the client
    /// lives.
    ///
    /// # Arguments
    ///
    /// * `connector`: The [`Connector`] used for every connection attempt.
    /// * `config`: Client configuration including the endpoint URL.
    ///
    /// # Returns
    ///
    /// A tuple of `(client_handle, event_receiver)`. The event receiver
    /// yields [`ScorewallEvent`]s until the client shuts down.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start(
        connector: impl Connector,
        config: ScorewallConfig,
    ) -> (Self, mpsc::Receiver<ScorewallEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<ScorewallEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let (conn_tx, conn_rx) = watch::channel(ConnectionState::Disconnected);
        let (session_tx, session_rx) = watch::channel(SessionState::new());

        // Clamp the backoff knobs so the retry delay can never decrease
        // and can never be zero (a zero delay would spin on a dead server).
        let initial_backoff = config.initial_backoff.max(Duration::from_millis(1));
        let max_backoff = config.max_backoff.max(initial_backoff);

        let supervisor = Supervisor {
            connector,
            url: config.url,
            initial_backoff,
            max_backoff,
            retry_delay: initial_backoff,
            connect_timeout: config.connect_timeout,
            cmd_rx,
            event_tx,
            conn_tx,
            session_tx,
            shutdown_rx,
        };
        let task = tokio::spawn(supervisor.run());

        let client = Self {
            cmd_tx,
            conn_rx,
            session_rx,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (client, event_rx)
    }

    // ── Outbound API ────────────────────────────────────────────────

    /// Submit a registration record for the next game window.
    ///
    /// Fire-and-forget: the record is queued for transmission and this
    /// method returns once it is queued. If no connection is up when the
    /// supervisor picks it up, the record is dropped rather than held for
    /// later; callers clear their form either way.
    ///
    /// # Errors
    ///
    /// Returns [`ScorewallError::EmptyRegistration`] if `record` has no
    /// fields set, or [`ScorewallError::ClientClosed`] if the client has
    /// shut down. Being disconnected is not an error.
    pub fn submit_registration(&self, record: RegistrationRecord) -> Result<()> {
        if record.is_empty() {
            return Err(ScorewallError::EmptyRegistration);
        }
        self.send(Command::Send(ClientMessage::User { user: record }))
    }

    /// Tear down the current connection, if any, and dial `url` instead.
    ///
    /// Takes effect immediately: a pending backoff wait or in-flight dial
    /// is abandoned, the backoff delay resets to its minimum, and the new
    /// endpoint is dialed right away.
    ///
    /// # Errors
    ///
    /// Returns [`ScorewallError::ClientClosed`] if the client has shut
    /// down.
    pub fn switch_endpoint(&self, url: impl Into<String>) -> Result<()> {
        self.send(Command::SwitchEndpoint(url.into()))
    }

    /// Shut down the client, closing the transport and stopping the
    /// supervisor task.
    ///
    /// After calling this method, the event receiver will yield `None`
    /// once the supervisor exits.
    pub async fn shutdown(&mut self) {
        debug!("ScorewallClient: shutdown requested");

        // Signal the supervisor to shut down gracefully.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        // Await the supervisor with a timeout. If it doesn't exit in time,
        // abort it so the task cannot detach and run indefinitely.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("supervisor terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("supervisor did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("supervisor aborted: {join_err}");
                    }
                }
            }
        }
    }

    // ── State observers ─────────────────────────────────────────────

    /// Returns the current connection state.
    ///
    /// A shut-down client reports `Disconnected` regardless of the last
    /// value the supervisor published.
    pub fn connection_state(&self) -> ConnectionState {
        if self.task.is_none() {
            return ConnectionState::Disconnected;
        }
        *self.conn_rx.borrow()
    }

    /// Returns `true` if a connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected()
    }

    /// Returns a watch receiver that yields connection state changes.
    ///
    /// When the client shuts down the sender side is dropped, after which
    /// [`changed`](watch::Receiver::changed) returns an error.
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.conn_rx.clone()
    }

    /// Returns a snapshot of the current session state.
    pub fn session(&self) -> SessionState {
        self.session_rx.borrow().clone()
    }

    /// Returns a watch receiver that yields session state changes.
    pub fn watch_session(&self) -> watch::Receiver<SessionState> {
        self.session_rx.clone()
    }

    /// Returns the current game phase.
    pub fn current_phase(&self) -> GamePhase {
        self.session_rx.borrow().phase
    }

    /// Returns the most recently posted attempt, if any since the
    /// registration window last opened.
    pub fn last_result(&self) -> Option<AttemptRecord> {
        self.session_rx.borrow().last_result.clone()
    }

    /// Returns the aggregated leaderboard from the latest snapshot, in
    /// first-seen player order.
    pub fn leaderboard(&self) -> Vec<PlayerSummary> {
        self.session_rx.borrow().leaderboard.clone()
    }

    /// Returns `true` when the registration form should be disabled, i.e.
    /// in every phase except `RegistrationOpen`.
    pub fn registration_disabled(&self) -> bool {
        self.session_rx.borrow().registration_disabled()
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Queue a command to the supervisor.
    fn send(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| ScorewallError::ClientClosed)
    }
}

impl std::fmt::Debug for ScorewallClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorewallClient")
            .field("connection", &self.connection_state())
            .field("phase", &self.current_phase())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for ScorewallClient {
    fn drop(&mut self) {
        // Drop is synchronous, so a graceful close (which awaits the
        // transport) is not possible here. Abort the supervisor task
        // instead; callers wanting a clean close use `shutdown()`.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Supervisor ──────────────────────────────────────────────────────

/// How one established connection ended.
enum ConnectionEnd {
    /// The transport closed or errored; re-enter the backoff wait.
    Dropped,
    /// The handle asked for a different endpoint; dial it immediately.
    Switched(String),
    /// The client is shutting down.
    Shutdown,
}

/// How one dial attempt ended.
enum DialOutcome<T> {
    /// The dial succeeded.
    Connected(T),
    /// The dial failed or timed out; re-enter the backoff wait.
    Failed,
    /// The handle asked for a different endpoint; dial it immediately.
    Switched(String),
    /// The client is shutting down.
    Shutdown,
}

/// How one backoff wait ended.
enum WaitOutcome {
    /// The delay elapsed; dial again.
    Elapsed,
    /// The handle asked for a different endpoint; dial it immediately.
    Switched(String),
    /// The client is shutting down.
    Shutdown,
}

/// Background task that owns the connection for the life of the client.
///
/// Single writer for both watch channels: every state transition happens
/// inside the supervisor's select loops, so there is no concurrent
/// mutation to reason about.
struct Supervisor<C: Connector> {
    connector: C,
    /// Endpoint currently being dialed; replaced by `SwitchEndpoint`.
    url: String,
    initial_backoff: Duration,
    max_backoff: Duration,
    /// Delay before the next reconnect attempt. Doubles (capped) after
    /// each failed cycle; resets on success and on endpoint switches.
    retry_delay: Duration,
    connect_timeout: Duration,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: mpsc::Sender<ScorewallEvent>,
    conn_tx: watch::Sender<ConnectionState>,
    session_tx: watch::Sender<SessionState>,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

impl<C: Connector> Supervisor<C> {
    /// Top-level connect/retry loop. Exits only on shutdown.
    async fn run(mut self) {
        debug!("connection supervisor started");

        loop {
            match self.dial().await {
                DialOutcome::Connected(transport) => {
                    self.retry_delay = self.initial_backoff;
                    match self.run_connection(transport).await {
                        ConnectionEnd::Dropped => {}
                        ConnectionEnd::Switched(url) => {
                            self.switch_to(url);
                            continue;
                        }
                        ConnectionEnd::Shutdown => break,
                    }
                }
                DialOutcome::Failed => {}
                DialOutcome::Switched(url) => {
                    self.switch_to(url);
                    continue;
                }
                DialOutcome::Shutdown => break,
            }

            match self.wait_retry().await {
                WaitOutcome::Elapsed => {
                    self.retry_delay = next_retry_delay(self.retry_delay, self.max_backoff);
                }
                WaitOutcome::Switched(url) => {
                    self.switch_to(url);
                }
                WaitOutcome::Shutdown => break,
            }
        }

        self.set_connection_state(ConnectionState::Disconnected);
        debug!("connection supervisor exited");
    }

    /// Adopt a new endpoint and start its retry schedule from the minimum.
    fn switch_to(&mut self, url: String) {
        info!(url = %url, "switching endpoint");
        self.url = url;
        self.retry_delay = self.initial_backoff;
    }

    /// One connection attempt, bounded by the connect timeout.
    ///
    /// Stays responsive to commands while the dial is in flight: sends are
    /// dropped (nothing is connected yet) and an endpoint switch abandons
    /// the attempt.
    async fn dial(&mut self) -> DialOutcome<C::Transport> {
        self.set_connection_state(ConnectionState::Connecting);
        debug!(url = %self.url, "dialing server");

        let connect = tokio::time::timeout(self.connect_timeout, self.connector.connect(&self.url));
        tokio::pin!(connect);

        loop {
            tokio::select! {
                result = &mut connect => {
                    return match result {
                        Ok(Ok(transport)) => DialOutcome::Connected(transport),
                        Ok(Err(e)) => {
                            warn!(url = %self.url, "connection attempt failed: {e}");
                            DialOutcome::Failed
                        }
                        Err(_) => {
                            warn!(url = %self.url, "connection attempt timed out");
                            DialOutcome::Failed
                        }
                    };
                }

                _ = &mut self.shutdown_rx => {
                    debug!("shutdown signal received while dialing");
                    return DialOutcome::Shutdown;
                }

                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(Command::Send(_)) => {
                            debug!("not connected, dropping outbound message");
                        }
                        Some(Command::SwitchEndpoint(url)) => {
                            return DialOutcome::Switched(url);
                        }
                        None => {
                            debug!("command channel closed, shutting down supervisor");
                            return DialOutcome::Shutdown;
                        }
                    }
                }
            }
        }
    }

    /// Drive one established connection until it ends.
    async fn run_connection(&mut self, mut transport: C::Transport) -> ConnectionEnd {
        // A fresh connection clears the stale result; the server is about
        // to re-announce the phase and the board.
        self.session_tx
            .send_if_modified(|session| session.reset_for_new_connection());
        self.set_connection_state(ConnectionState::Connected);
        info!(url = %self.url, "connected");
        self.emit_lifecycle(ScorewallEvent::Connected).await;

        loop {
            tokio::select! {
                // Branch 1: outgoing command from the client handle
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(Command::Send(msg)) => {
                            debug!("sending client message: {:?}", std::mem::discriminant(&msg));
                            match serde_json::to_string(&msg) {
                                Ok(json) => {
                                    if let Err(e) = transport.send(json).await {
                                        error!("transport send error: {e}");
                                        self.emit_disconnected(
                                            Some(format!("transport send error: {e}")),
                                        ).await;
                                        return ConnectionEnd::Dropped;
                                    }
                                }
                                Err(e) => {
                                    error!("failed to serialize client message: {e}");
                                    // Serialization errors are programming bugs; don't kill the loop.
                                }
                            }
                        }
                        Some(Command::SwitchEndpoint(url)) => {
                            let _ = transport.close().await;
                            self.emit_disconnected(Some("endpoint switched".into())).await;
                            return ConnectionEnd::Switched(url);
                        }
                        None => {
                            debug!("command channel closed, shutting down supervisor");
                            let _ = transport.close().await;
                            self.emit_disconnected(Some("client shut down".into())).await;
                            return ConnectionEnd::Shutdown;
                        }
                    }
                }

                // Branch 2: shutdown signal
                _ = &mut self.shutdown_rx => {
                    debug!("shutdown signal received");
                    let _ = transport.close().await;
                    self.emit_disconnected(Some("client shut down".into())).await;
                    return ConnectionEnd::Shutdown;
                }

                // Branch 3: incoming message from the server
                incoming = transport.recv() => {
                    match incoming {
                        Some(Ok(text)) => self.handle_frame(&text).await,
                        Some(Err(e)) => {
                            error!("transport receive error: {e}");
                            self.emit_disconnected(
                                Some(format!("transport receive error: {e}")),
                            ).await;
                            return ConnectionEnd::Dropped;
                        }
                        // Transport closed cleanly.
                        None => {
                            debug!("connection closed by server");
                            self.emit_disconnected(None).await;
                            return ConnectionEnd::Dropped;
                        }
                    }
                }
            }
        }
    }

    /// Decode one inbound frame, apply it to the session, and emit the
    /// resulting event. Malformed frames are dropped; the connection and
    /// the current state stay untouched.
    async fn handle_frame(&mut self, text: &str) {
        match serde_json::from_str::<ServerMessage>(text) {
            Ok(ServerMessage::Unknown) => {
                debug!("ignoring unrecognized server message: {text}");
            }
            Ok(msg) => {
                let mut event = None;
                self.session_tx.send_if_modified(|session| {
                    event = session.apply(msg);
                    event.is_some()
                });
                if let Some(event) = event {
                    emit_event(&self.event_tx, event).await;
                }
            }
            Err(e) => {
                warn!("failed to deserialize server message: {e} (raw: {text})");
            }
        }
    }

    /// Sleep out the current retry delay, staying responsive to commands.
    async fn wait_retry(&mut self) -> WaitOutcome {
        self.set_connection_state(ConnectionState::Disconnected);
        debug!(delay = ?self.retry_delay, "waiting before reconnect");

        let sleep = tokio::time::sleep(self.retry_delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return WaitOutcome::Elapsed,

                _ = &mut self.shutdown_rx => {
                    debug!("shutdown signal received while waiting to reconnect");
                    return WaitOutcome::Shutdown;
                }

                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(Command::Send(_)) => {
                            debug!("not connected, dropping outbound message");
                        }
                        Some(Command::SwitchEndpoint(url)) => {
                            return WaitOutcome::Switched(url);
                        }
                        None => {
                            debug!("command channel closed, shutting down supervisor");
                            return WaitOutcome::Shutdown;
                        }
                    }
                }
            }
        }
    }

    /// Publish a connection state transition, skipping no-op writes.
    fn set_connection_state(&self, next: ConnectionState) {
        self.conn_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            debug!(from = ?*state, to = ?next, "connection state changed");
            *state = next;
            true
        });
    }

    /// Emit a lifecycle event with delivery guaranteed: blocks until the
    /// event channel has room rather than dropping.
    async fn emit_lifecycle(&mut self, event: ScorewallEvent) {
        if self.event_tx.send(event).await.is_err() {
            debug!("event channel closed, receiver dropped");
        }
    }

    /// Publish the `Disconnected` state and emit the matching event.
    /// `Disconnected` marks the end of a logical connection and is never
    /// dropped under backpressure.
    async fn emit_disconnected(&mut self, reason: Option<String>) {
        self.set_connection_state(ConnectionState::Disconnected);
        self.emit_lifecycle(ScorewallEvent::Disconnected { reason })
            .await;
    }
}

/// The reconnect delay that follows `current`: doubled, capped at `max`.
fn next_retry_delay(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

/// Emit a data event to the event channel. If the channel is full, log a
/// warning and drop the event to avoid stalling the supervisor.
async fn emit_event(event_tx: &mpsc::Sender<ScorewallEvent>, event: ScorewallEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(
                "event channel full, dropping event: {:?}",
                std::mem::discriminant(&dropped)
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    // ── Mock transport and connector ────────────────────────────────

    /// A mock transport that records sent messages and replays scripted
    /// responses.
    struct MockTransport {
        /// Messages that `recv()` will yield in order. An explicit `None`
        /// entry signals a clean transport close.
        incoming: VecDeque<Option<std::result::Result<String, ScorewallError>>>,
        /// Recorded outgoing messages, shared across reconnects.
        sent: Arc<StdMutex<Vec<String>>>,
        /// Whether `close()` was called on any transport.
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, message: String) -> std::result::Result<(), ScorewallError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Option<std::result::Result<String, ScorewallError>> {
            if let Some(item) = self.incoming.pop_front() {
                item
            } else {
                // Script exhausted: hang so the connection stays up until
                // the client shuts down.
                std::future::pending().await
            }
        }

        async fn close(&mut self) -> std::result::Result<(), ScorewallError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    /// What a single scripted dial attempt should do.
    enum Dial {
        /// Yield a transport that replays these frames.
        Accept(Vec<Option<std::result::Result<String, ScorewallError>>>),
        /// Fail the dial immediately (connection refused).
        Refuse,
        /// Never resolve, so the client's connect timeout fires.
        Hang,
    }

    /// Shared probes into a [`MockConnector`] and its transports.
    struct MockHandles {
        /// Every URL that was dialed, in order.
        dialed: Arc<StdMutex<Vec<String>>>,
        /// Every message sent on any transport, in order.
        sent: Arc<StdMutex<Vec<String>>>,
        /// Whether `close()` was called on any transport.
        closed: Arc<AtomicBool>,
    }

    /// A mock connector that replays scripted dial outcomes. Once the
    /// script is exhausted, further dials hang forever.
    struct MockConnector {
        script: VecDeque<Dial>,
        dialed: Arc<StdMutex<Vec<String>>>,
        sent: Arc<StdMutex<Vec<String>>>,
        closed: Arc<AtomicBool>,
    }

    impl MockConnector {
        fn new(script: Vec<Dial>) -> (Self, MockHandles) {
            let handles = MockHandles {
                dialed: Arc::new(StdMutex::new(Vec::new())),
                sent: Arc::new(StdMutex::new(Vec::new())),
                closed: Arc::new(AtomicBool::new(false)),
            };
            let connector = Self {
                script: VecDeque::from(script),
                dialed: Arc::clone(&handles.dialed),
                sent: Arc::clone(&handles.sent),
                closed: Arc::clone(&handles.closed),
            };
            (connector, handles)
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        type Transport = MockTransport;

        async fn connect(
            &mut self,
            url: &str,
        ) -> std::result::Result<MockTransport, ScorewallError> {
            self.dialed.lock().unwrap().push(url.to_string());
            match self.script.pop_front() {
                Some(Dial::Accept(incoming)) => Ok(MockTransport {
                    incoming: VecDeque::from(incoming),
                    sent: Arc::clone(&self.sent),
                    closed: Arc::clone(&self.closed),
                }),
                Some(Dial::Refuse) => Err(ScorewallError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
                Some(Dial::Hang) | None => std::future::pending().await,
            }
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────

    fn game_in_progress_json() -> String {
        r#"{"type":"gameInProgress"}"#.to_string()
    }

    fn current_result_json(nick: &str, score: i64) -> String {
        format!(
            r#"{{"type":"currentResult","currentResult":{{"nickName":"{nick}","score":{score}}}}}"#
        )
    }

    fn test_config() -> ScorewallConfig {
        ScorewallConfig::new("ws://test.invalid/ws")
    }

    // ── Config tests ────────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let config = test_config();
        assert_eq!(config.url, "ws://test.invalid/ws");
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.initial_backoff, Duration::from_millis(1000));
        assert_eq!(config.max_backoff, Duration::from_millis(3000));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[test]
    fn config_builder_methods() {
        let config = test_config()
            .with_event_channel_capacity(512)
            .with_initial_backoff(Duration::from_millis(250))
            .with_max_backoff(Duration::from_secs(10))
            .with_connect_timeout(Duration::from_secs(3))
            .with_shutdown_timeout(Duration::from_secs(5));
        assert_eq!(config.event_channel_capacity, 512);
        assert_eq!(config.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.max_backoff, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn event_channel_capacity_is_clamped_to_one() {
        let config = test_config().with_event_channel_capacity(0);
        assert_eq!(config.event_channel_capacity, 1);
    }

    #[test]
    fn default_endpoint_joins_host_and_port() {
        assert_eq!(
            ScorewallConfig::default_endpoint("dashboard.local", 9000),
            "ws://dashboard.local:9000/ws"
        );
    }

    #[test]
    fn connection_state_helpers() {
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Connecting.is_connected());
        assert!(!ConnectionState::Disconnected.is_connected());
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn retry_delay_doubles_and_caps() {
        let max = Duration::from_millis(3000);
        let mut delay = Duration::from_millis(1000);
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(delay);
            delay = next_retry_delay(delay, max);
        }
        assert_eq!(
            seen,
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(3000),
                Duration::from_millis(3000),
                Duration::from_millis(3000),
            ]
        );
    }

    // ── Lifecycle tests ─────────────────────────────────────────────

    #[tokio::test]
    async fn connected_event_after_first_dial() {
        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(vec![])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Connected));
        assert!(client.is_connected());

        client.shutdown().await;
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn disconnected_on_transport_close() {
        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(vec![
            Some(Ok(game_in_progress_json())),
            // Explicit None signals clean transport close.
            None,
        ])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected
        let _ = events.recv().await; // GameInProgress
        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Disconnected { .. }));
        assert!(!client.is_connected());

        // The session keeps the last announced phase across the outage.
        assert_eq!(client.current_phase(), GamePhase::InProgress);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn session_follows_announcements() {
        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(vec![
            Some(Ok(r#"{"type":"openUserRegistration"}"#.to_string())),
            Some(Ok(current_result_json("ada", 1337))),
        ])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::RegistrationOpen));

        let event = events.recv().await.unwrap();
        let ScorewallEvent::AttemptPosted { result } = event else {
            panic!("expected AttemptPosted, got {event:?}");
        };
        assert_eq!(result.nick_name, "ada");
        assert_eq!(result.score, 1337);

        assert_eq!(client.current_phase(), GamePhase::RegistrationOpen);
        assert!(!client.registration_disabled());
        assert_eq!(client.last_result().map(|r| r.score), Some(1337));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_frame_does_not_drop_connection() {
        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(vec![
            Some(Ok("this is not json".to_string())),
            Some(Ok(r#"{"nickName":"no type tag"}"#.to_string())),
            Some(Ok(game_in_progress_json())),
        ])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected
        // Both bad frames are dropped; the next event is the good frame.
        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::GameInProgress));
        assert!(client.is_connected());

        client.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_message_type_is_ignored() {
        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(vec![
            Some(Ok(r#"{"type":"adminBroadcast","text":"hi"}"#.to_string())),
            Some(Ok(r#"{"type":"waitingStartSignal"}"#.to_string())),
        ])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected
        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::WaitingStart));
        assert!(client.session().leaderboard.is_empty());

        client.shutdown().await;
    }

    // ── Outbound tests ──────────────────────────────────────────────

    #[tokio::test]
    async fn registration_is_sent_when_connected() {
        let (connector, handles) = MockConnector::new(vec![Dial::Accept(vec![])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected

        let record = RegistrationRecord::named("ada").with_email("ada@example.com");
        client.submit_registration(record).unwrap();

        // Give the supervisor a moment to process.
        tokio::time::sleep(Duration::from_millis(50)).await;

        {
            let messages = handles.sent.lock().unwrap();
            assert_eq!(messages.len(), 1);
            let value: serde_json::Value = serde_json::from_str(&messages[0]).unwrap();
            assert_eq!(value["type"], "user");
            assert_eq!(value["user"]["nickName"], "ada");
            assert_eq!(value["user"]["email"], "ada@example.com");
        }

        client.shutdown().await;
    }

    #[tokio::test]
    async fn empty_registration_is_rejected() {
        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(vec![])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected

        let result = client.submit_registration(RegistrationRecord::default());
        assert!(matches!(result, Err(ScorewallError::EmptyRegistration)));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn client_closed_error_after_shutdown() {
        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(vec![])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected
        client.shutdown().await;

        let result = client.submit_registration(RegistrationRecord::named("ada"));
        assert!(matches!(result, Err(ScorewallError::ClientClosed)));
        let result = client.switch_endpoint("ws://elsewhere.invalid/ws");
        assert!(matches!(result, Err(ScorewallError::ClientClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn send_while_disconnected_is_dropped() {
        // First dial fails; the send arrives while nothing is connected
        // and must be dropped, not delivered after reconnecting.
        let (connector, handles) = MockConnector::new(vec![Dial::Refuse, Dial::Accept(vec![])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        client
            .submit_registration(RegistrationRecord::named("ada"))
            .unwrap();

        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Connected));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handles.sent.lock().unwrap().is_empty());

        client.shutdown().await;
    }

    // ── Reconnect tests ─────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn reconnect_backoff_doubles_to_ceiling() {
        // Five refused dials: waits of 1s, 2s, 3s, 3s and 3s before the
        // sixth attempt succeeds.
        let (connector, handles) = MockConnector::new(vec![
            Dial::Refuse,
            Dial::Refuse,
            Dial::Refuse,
            Dial::Refuse,
            Dial::Refuse,
            Dial::Accept(vec![]),
        ]);
        let start = tokio::time::Instant::now();
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Connected));

        assert_eq!(
            start.elapsed(),
            Duration::from_millis(1000 + 2000 + 3000 + 3000 + 3000)
        );
        assert_eq!(handles.dialed.lock().unwrap().len(), 6);

        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_resets_after_successful_connection() {
        // Refuse (wait 1s), connect briefly, drop. The next wait must be
        // back at 1s, not 2s.
        let (connector, _handles) = MockConnector::new(vec![
            Dial::Refuse,
            Dial::Accept(vec![None]),
            Dial::Refuse,
            Dial::Accept(vec![]),
        ]);
        let start = tokio::time::Instant::now();
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let event = events.recv().await.unwrap(); // first connection, t = 1s
        assert!(matches!(event, ScorewallEvent::Connected));
        let event = events.recv().await.unwrap(); // immediate clean close
        assert!(matches!(event, ScorewallEvent::Disconnected { .. }));

        let event = events.recv().await.unwrap(); // second connection
        assert!(matches!(event, ScorewallEvent::Connected));

        // 1s (refused) + 1s (reset wait after the drop) + 2s (after the
        // second refusal).
        assert_eq!(start.elapsed(), Duration::from_millis(1000 + 1000 + 2000));

        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dial_timeout_counts_as_failed_attempt() {
        let (connector, handles) = MockConnector::new(vec![Dial::Hang, Dial::Accept(vec![])]);
        let config = test_config().with_connect_timeout(Duration::from_secs(2));
        let start = tokio::time::Instant::now();
        let (mut client, mut events) = ScorewallClient::start(connector, config);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Connected));

        // 2s hung dial plus 1s backoff wait.
        assert_eq!(start.elapsed(), Duration::from_millis(2000 + 1000));
        assert_eq!(handles.dialed.lock().unwrap().len(), 2);

        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn switch_endpoint_skips_backoff_wait() {
        let (connector, handles) = MockConnector::new(vec![Dial::Refuse, Dial::Accept(vec![])]);
        let start = tokio::time::Instant::now();
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        // Let the first dial fail and the backoff wait begin.
        while handles.dialed.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        client.switch_endpoint("ws://other.invalid/ws").unwrap();

        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Connected));

        // The pending 1s retry wait was abandoned, not served.
        assert!(start.elapsed() < Duration::from_millis(1000));
        assert_eq!(
            handles.dialed.lock().unwrap().clone(),
            vec!["ws://test.invalid/ws", "ws://other.invalid/ws"]
        );

        client.shutdown().await;
    }

    #[tokio::test]
    async fn switch_endpoint_tears_down_live_connection() {
        let (connector, handles) =
            MockConnector::new(vec![Dial::Accept(vec![]), Dial::Accept(vec![])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected
        client.switch_endpoint("ws://other.invalid/ws").unwrap();

        let event = events.recv().await.unwrap();
        let ScorewallEvent::Disconnected { reason } = event else {
            panic!("expected Disconnected, got {event:?}");
        };
        assert_eq!(reason.as_deref(), Some("endpoint switched"));

        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Connected));

        assert!(handles.closed.load(Ordering::Relaxed));
        let urls = handles.dialed.lock().unwrap().clone();
        assert_eq!(urls, vec!["ws://test.invalid/ws", "ws://other.invalid/ws"]);

        client.shutdown().await;
    }

    // ── Event channel tests ─────────────────────────────────────────

    #[tokio::test]
    async fn zero_event_channel_capacity_does_not_panic() {
        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(vec![])]);
        let config = test_config().with_event_channel_capacity(0);
        let (mut client, mut events) = ScorewallClient::start(connector, config);

        // Capacity is clamped to 1 internally; starting must not panic.
        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Connected));

        client.shutdown().await;
    }

    #[tokio::test]
    async fn disconnected_survives_a_full_event_channel() {
        // Capacity 1 and a burst of announcements: data events may be
        // dropped, but the final Disconnected must still arrive.
        let mut incoming = Vec::new();
        for _ in 0..20 {
            incoming.push(Some(Ok(game_in_progress_json())));
            incoming.push(Some(Ok(r#"{"type":"waitingStartSignal"}"#.to_string())));
        }
        incoming.push(None);

        let (connector, _handles) = MockConnector::new(vec![Dial::Accept(incoming)]);
        let config = test_config().with_event_channel_capacity(1);
        let (mut client, mut events) = ScorewallClient::start(connector, config);

        // Let the channel fill up and events get dropped.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let mut saw_disconnected = false;
        let mut drained = 0;
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_secs(1), events.recv()).await
        {
            drained += 1;
            if matches!(event, ScorewallEvent::Disconnected { .. }) {
                saw_disconnected = true;
                break;
            }
        }
        assert!(saw_disconnected, "Disconnected must never be dropped");
        // 42 events were produced; a single-slot channel cannot have
        // delivered them all.
        assert!(
            drained < 42,
            "expected drops under backpressure, got {drained}"
        );

        client.shutdown().await;
    }

    // ── Shutdown tests ──────────────────────────────────────────────

    /// A connector whose transport hangs in `close()` so the shutdown
    /// timeout/abort path can be exercised.
    struct HangingCloseConnector {
        close_called: Arc<AtomicBool>,
        dropped: Arc<AtomicBool>,
    }

    struct HangingCloseTransport {
        close_called: Arc<AtomicBool>,
        dropped: Arc<AtomicBool>,
    }

    impl Drop for HangingCloseTransport {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::Release);
        }
    }

    #[async_trait]
    impl Transport for HangingCloseTransport {
        async fn send(&mut self, _message: String) -> std::result::Result<(), ScorewallError> {
            Ok(())
        }

        async fn recv(&mut self) -> Option<std::result::Result<String, ScorewallError>> {
            std::future::pending().await
        }

        async fn close(&mut self) -> std::result::Result<(), ScorewallError> {
            self.close_called.store(true, Ordering::Release);
            std::future::pending().await
        }
    }

    #[async_trait]
    impl Connector for HangingCloseConnector {
        type Transport = HangingCloseTransport;

        async fn connect(
            &mut self,
            _url: &str,
        ) -> std::result::Result<HangingCloseTransport, ScorewallError> {
            Ok(HangingCloseTransport {
                close_called: Arc::clone(&self.close_called),
                dropped: Arc::clone(&self.dropped),
            })
        }
    }

    #[tokio::test]
    async fn shutdown_timeout_aborts_stuck_supervisor() {
        let close_called = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicBool::new(false));
        let connector = HangingCloseConnector {
            close_called: Arc::clone(&close_called),
            dropped: Arc::clone(&dropped),
        };
        let config = test_config().with_shutdown_timeout(Duration::from_millis(20));
        let (mut client, mut events) = ScorewallClient::start(connector, config);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, ScorewallEvent::Connected));

        client.shutdown().await;

        assert!(
            close_called.load(Ordering::Acquire),
            "transport.close() should have been attempted during graceful shutdown"
        );
        assert!(
            dropped.load(Ordering::Acquire),
            "timed-out shutdown should abort and drop the supervisor task"
        );
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn shutdown_closes_event_stream() {
        let (connector, handles) = MockConnector::new(vec![Dial::Accept(vec![])]);
        let (mut client, mut events) = ScorewallClient::start(connector, test_config());

        let _ = events.recv().await; // Connected
        client.shutdown().await;

        // Drain the final Disconnected, then the channel must end.
        let mut last = None;
        while let Some(event) = events.recv().await {
            last = Some(event);
        }
        assert!(matches!(last, Some(ScorewallEvent::Disconnected { .. })));
        assert!(handles.closed.load(Ordering::Relaxed));
    }
}
