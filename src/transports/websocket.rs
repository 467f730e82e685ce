//! WebSocket transport built on `tokio-tungstenite`.
//!
//! [`WebSocketTransport`] carries the dashboard's text frames over a
//! WebSocket connection; [`WebSocketConnector`] is the matching
//! [`Connector`] the client dials through on every (re)connection
//! attempt. `ws://` and `wss://` URLs both work; TLS is negotiated behind
//! [`MaybeTlsStream`](tokio_tungstenite::MaybeTlsStream).
//!
//! # Feature gate
//!
//! Only compiled with the `transport-websocket` feature (on by default).
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), scorewall_client::ScorewallError> {
//! use scorewall_client::{ScorewallClient, ScorewallConfig, WebSocketConnector};
//!
//! let config = ScorewallConfig::new("ws://localhost:8080/ws");
//! let (client, mut events) = ScorewallClient::start(WebSocketConnector, config);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::Message;

use crate::error::ScorewallError;
use crate::transport::{Connector, Transport};

/// The concrete `tokio-tungstenite` stream type behind the transport.
///
/// Public so an externally-built stream (custom TLS, proxy tunnels) can be
/// wrapped via [`WebSocketTransport::from_stream`].
pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Map a tungstenite dial error onto [`ScorewallError::Io`], keeping the
/// original [`ErrorKind`](std::io::ErrorKind) where one exists.
fn handshake_error(e: tokio_tungstenite::tungstenite::Error) -> ScorewallError {
    let kind = match &e {
        tokio_tungstenite::tungstenite::Error::Io(io) => io.kind(),
        _ => std::io::ErrorKind::Other,
    };
    ScorewallError::Io(std::io::Error::new(kind, e))
}

/// [`Transport`] implementation backed by a WebSocket stream.
///
/// Bridges the dashboard's one-JSON-object-per-frame protocol onto
/// WebSocket text frames. The protocol never uses binary frames, so those
/// are skipped with a warning; ping/pong bookkeeping stays internal.
///
/// Normally constructed for you by [`WebSocketConnector`]. To drive a
/// transport by hand, dial with [`WebSocketTransport::connect`]; for custom
/// TLS setups, proxies, or extra handshake headers, build the stream
/// yourself and wrap it with [`WebSocketTransport::from_stream`].
///
/// # Cancel Safety
///
/// `recv` is cancel-safe: a dropped `recv` future neither consumes nor
/// loses a frame, which is what lets the supervisor poll it inside
/// `tokio::select!`.
#[derive(Debug)]
pub struct WebSocketTransport {
    stream: WsStream,
    closed: bool,
}

impl WebSocketTransport {
    /// Dial `url` and perform the WebSocket handshake.
    ///
    /// Accepts `ws://` and `wss://` schemes; TLS is negotiated by
    /// `tokio-tungstenite` when the scheme asks for it.
    ///
    /// # Errors
    ///
    /// Returns [`ScorewallError::Io`] when the URL is invalid or the
    /// handshake fails. An underlying I/O error keeps its
    /// [`ErrorKind`](std::io::ErrorKind); anything else surfaces as
    /// [`ErrorKind::Other`](std::io::ErrorKind::Other).
    pub async fn connect(url: &str) -> Result<Self, ScorewallError> {
        tracing::debug!(url = %url, "starting WebSocket handshake");

        let (stream, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(handshake_error)?;

        tracing::info!(url = %url, "WebSocket handshake complete");

        Ok(Self {
            stream,
            closed: false,
        })
    }

    /// Wrap an already-established WebSocket stream.
    ///
    /// The escape hatch for connection setup [`connect`](Self::connect)
    /// does not cover: custom TLS configuration, proxy tunnels, or extra
    /// handshake headers.
    pub fn from_stream(stream: WsStream) -> Self {
        Self {
            stream,
            closed: false,
        }
    }

    /// Like [`connect`](Self::connect), bounded by a deadline.
    ///
    /// The client already applies its configured dial timeout around
    /// [`WebSocketConnector`], so reach for this only when driving a
    /// transport by hand.
    ///
    /// # Errors
    ///
    /// [`ScorewallError::Timeout`] when the deadline elapses; otherwise
    /// whatever [`connect`](Self::connect) would have returned.
    pub async fn connect_with_timeout(
        url: &str,
        timeout: std::time::Duration,
    ) -> Result<Self, ScorewallError> {
        tokio::time::timeout(timeout, Self::connect(url))
            .await
            .map_err(|_| ScorewallError::Timeout)?
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, message: String) -> Result<(), ScorewallError> {
        if self.closed {
            return Err(ScorewallError::TransportClosed);
        }
        self.stream
            .send(Message::Text(message.into()))
            .await
            .map_err(|e| ScorewallError::TransportSend(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, ScorewallError>> {
        while let Some(item) = self.stream.next().await {
            let msg = match item {
                Ok(msg) => msg,
                Err(e) => return Some(Err(ScorewallError::TransportReceive(e.to_string()))),
            };

            match msg {
                // `Utf8Bytes` does not give up its buffer by value, so the
                // payload is copied into a fresh `String`.
                Message::Text(text) => return Some(Ok(text.to_string())),
                Message::Close(frame) => {
                    tracing::debug!(?frame, "server sent WebSocket close frame");
                    return None;
                }
                // tungstenite queues the pong reply itself.
                Message::Ping(_) | Message::Pong(_) => {
                    tracing::debug!("WebSocket control frame handled");
                }
                Message::Binary(payload) => {
                    tracing::warn!(len = payload.len(), "skipping unexpected binary frame");
                }
                // Never produced by the read half; arm kept for exhaustiveness.
                Message::Frame(_) => {
                    tracing::debug!("skipping raw WebSocket frame");
                }
            }
        }
        None
    }

    async fn close(&mut self) -> Result<(), ScorewallError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream
            .close(None)
            .await
            .map_err(|e| ScorewallError::TransportSend(e.to_string()))
    }
}

/// A [`Connector`] that dials plain WebSocket URLs.
///
/// This is the connector most embedders hand to
/// [`ScorewallClient::start`](crate::ScorewallClient::start). It carries no
/// state; each dial is an independent [`WebSocketTransport::connect`]. For
/// custom TLS or headers, implement [`Connector`] yourself and build the
/// transport with [`WebSocketTransport::from_stream`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&mut self, url: &str) -> Result<WebSocketTransport, ScorewallError> {
        WebSocketTransport::connect(url).await
    }
}

#[cfg(test)]
#[cfg(feature = "transport-websocket")]
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

    #[test]
    fn transport_is_send_and_debug() {
        fn assert_bounds<T: Send + std::fmt::Debug>() {}
        assert_bounds::<WebSocketTransport>();
    }

    #[tokio::test]
    async fn connect_rejects_a_malformed_url() {
        let err = WebSocketTransport::connect("not-a-valid-url")
            .await
            .unwrap_err();
        assert!(matches!(err, ScorewallError::Io(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn refused_connection_keeps_its_io_error_kind() {
        let err = WebSocketTransport::connect("ws://127.0.0.1:1")
            .await
            .unwrap_err();
        match err {
            ScorewallError::Io(io) => {
                assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    // ── Mock-server helpers ─────────────────────────────────────────

    use tokio::net::TcpListener;

    /// Bind an ephemeral local server, hand the accepted WebSocket to
    /// `handler`, and return the `ws://` URL to dial.
    async fn start_mock_server<F, Fut>(handler: F) -> String
    where
        F: FnOnce(tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>) -> Fut
            + Send
            + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            handler(ws).await;
        });

        format!("ws://{addr}")
    }

    // ── Mock-server tests ───────────────────────────────────────────

    #[tokio::test]
    async fn recv_yields_text_frames_in_order() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Text(r#"{"type":"openUserRegistration"}"#.into()))
                .await
                .unwrap();
            ws.send(Message::Text(r#"{"type":"gameInProgress"}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();

        let first = transport.recv().await.unwrap().unwrap();
        assert_eq!(first, r#"{"type":"openUserRegistration"}"#);

        let second = transport.recv().await.unwrap().unwrap();
        assert_eq!(second, r#"{"type":"gameInProgress"}"#);
    }

    #[tokio::test]
    async fn clean_close_ends_the_stream() {
        let url = start_mock_server(|mut ws| async move {
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        assert!(transport.recv().await.is_none());
    }

    #[tokio::test]
    async fn recv_skips_control_and_binary_frames() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Ping(vec![1].into())).await.unwrap();
            ws.send(Message::Binary(vec![0xDE, 0xAD].into()))
                .await
                .unwrap();
            ws.send(Message::Text(r#"{"type":"gameInProgress"}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();

        // Only the text frame surfaces.
        let msg = transport.recv().await.unwrap().unwrap();
        assert_eq!(msg, r#"{"type":"gameInProgress"}"#);
        assert!(transport.recv().await.is_none());
    }

    #[tokio::test]
    async fn send_after_local_close_is_rejected() {
        let url = start_mock_server(|mut ws| async move {
            // Read until the client closes.
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.close().await.unwrap();

        let err = transport.send("late".to_string()).await.unwrap_err();
        assert!(matches!(err, ScorewallError::TransportClosed));
    }

    #[tokio::test]
    async fn closing_twice_is_harmless() {
        let url =
            start_mock_server(|mut ws| async move { while let Some(Ok(_)) = ws.next().await {} })
                .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.close().await.unwrap();
        transport.close().await.unwrap();
    }

    #[tokio::test]
    async fn connect_with_timeout_gives_up_at_the_deadline() {
        // 192.0.2.0/24 is TEST-NET, guaranteed unroutable.
        let err = WebSocketTransport::connect_with_timeout(
            "ws://192.0.2.1:9",
            std::time::Duration::from_millis(25),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScorewallError::Timeout));
    }

    #[tokio::test]
    async fn from_stream_wraps_an_existing_connection() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Text(r#"{"type":"waitingStartSignal"}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        // Connect the raw stream ourselves, then wrap it.
        let (ws_stream, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
        let mut transport = WebSocketTransport::from_stream(ws_stream);

        let msg = transport.recv().await.unwrap().unwrap();
        assert_eq!(msg, r#"{"type":"waitingStartSignal"}"#);
    }

    #[tokio::test]
    async fn registration_frame_round_trips_through_echo() {
        let url = start_mock_server(|mut ws| async move {
            // Read one message and echo it back.
            if let Some(Ok(Message::Text(text))) = ws.next().await {
                ws.send(Message::Text(text)).await.unwrap();
            }
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport
            .send(r#"{"type":"user","user":{"nickName":"ada"}}"#.to_string())
            .await
            .unwrap();

        let msg = transport.recv().await.unwrap().unwrap();
        assert_eq!(msg, r#"{"type":"user","user":{"nickName":"ada"}}"#);
    }

    #[tokio::test]
    async fn recv_after_local_close_does_not_hang() {
        let url =
            start_mock_server(|mut ws| async move { while let Some(Ok(_)) = ws.next().await {} })
                .await;

        let mut transport = WebSocketTransport::connect(&url).await.unwrap();
        transport.close().await.unwrap();

        // Whichever way tungstenite reports the closed stream, recv must
        // terminate: end-of-stream and a transport error are both fine.
        match transport.recv().await {
            None | Some(Err(_)) => {}
            Some(Ok(msg)) => panic!("expected None or error after close, got Ok({msg:?})"),
        }
    }

    #[tokio::test]
    async fn connector_dials_and_yields_a_working_transport() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Text(r#"{"type":"leaderBoard","leaderBoard":[]}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut connector = WebSocketConnector;
        let mut transport = connector.connect(&url).await.unwrap();

        let msg = transport.recv().await.unwrap().unwrap();
        assert_eq!(msg, r#"{"type":"leaderBoard","leaderBoard":[]}"#);
    }

    #[tokio::test]
    async fn connector_dial_failure_is_an_error_not_a_panic() {
        let mut connector = WebSocketConnector;
        let err = connector.connect("ws://127.0.0.1:1").await.unwrap_err();
        assert!(matches!(err, ScorewallError::Io(_)));
    }
}
