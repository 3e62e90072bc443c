//! WebSocket transport implementation using `tokio-tungstenite`.
//!
//! [`WebSocketTransport`] carries the realtime channel's JSON text frames
//! over a WebSocket. `ws://` works out of the box; `wss://` needs the
//! `transport-websocket-tls` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), dumb_api_client::ApiError> {
//! use dumb_api_client::{Transport, WebSocketTransport};
//!
//! let mut transport =
//!     WebSocketTransport::connect("ws://localhost:3000/ws", Some("token-123")).await?;
//! transport.send(r#"{"type":"typing","channel":"general"}"#.to_string()).await?;
//!
//! if let Some(Ok(frame)) = transport.recv().await {
//!     println!("received: {frame}");
//! }
//!
//! transport.close().await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::transport::Transport;

/// The underlying WebSocket stream.
///
/// Public so callers can wrap a stream they opened themselves with
/// [`WebSocketTransport::from_stream`].
pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// A [`Transport`] backed by a WebSocket connection.
///
/// # Cancel Safety
///
/// [`recv`](Transport::recv) is cancel-safe: dropping its future before it
/// completes does not consume a frame.
#[derive(Debug)]
pub struct WebSocketTransport {
    stream: WsStream,
    closed: bool,
}

impl WebSocketTransport {
    /// Open a WebSocket to `url`.
    ///
    /// When `bearer_token` is given it is sent as
    /// `Authorization: Bearer <token>` on the upgrade request.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Io`] if the URL is invalid or the handshake fails.
    /// I/O error kinds are preserved; other failures map to
    /// [`ErrorKind::Other`](std::io::ErrorKind::Other). Returns
    /// [`ApiError::Http`] if the token cannot be encoded as a header value.
    pub async fn connect(url: &str, bearer_token: Option<&str>) -> Result<Self, ApiError> {
        debug!(url = %url, authenticated = bearer_token.is_some(), "connecting to WebSocket server");

        let mut request = url.into_client_request().map_err(handshake_error)?;
        if let Some(token) = bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Http(format!("invalid bearer token: {e}")))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(handshake_error)?;

        info!(url = %url, "WebSocket connection established");

        Ok(Self {
            stream,
            closed: false,
        })
    }

    /// Like [`connect`](Self::connect) but fails with [`ApiError::Timeout`]
    /// if the handshake does not finish within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Timeout`] if the deadline elapses, or any error
    /// [`connect`](Self::connect) may return.
    pub async fn connect_with_timeout(
        url: &str,
        bearer_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        tokio::time::timeout(timeout, Self::connect(url, bearer_token))
            .await
            .map_err(|_| ApiError::Timeout)?
    }

    /// Wrap an already-established WebSocket stream.
    pub fn from_stream(stream: WsStream) -> Self {
        Self {
            stream,
            closed: false,
        }
    }
}

fn handshake_error(e: tokio_tungstenite::tungstenite::Error) -> ApiError {
    let kind = match &e {
        tokio_tungstenite::tungstenite::Error::Io(io) => io.kind(),
        _ => std::io::ErrorKind::Other,
    };
    ApiError::Io(std::io::Error::new(kind, e))
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, message: String) -> Result<(), ApiError> {
        if self.closed {
            return Err(ApiError::TransportClosed);
        }
        self.stream
            .send(Message::Text(message.into()))
            .await
            .map_err(|e| ApiError::TransportSend(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<String, ApiError>> {
        loop {
            let msg = match self.stream.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    return Some(Err(ApiError::TransportReceive(e.to_string())));
                }
                None => return None,
            };

            match msg {
                Message::Text(text) => return Some(Ok(text.to_string())),
                Message::Close(frame) => {
                    debug!(?frame, "received WebSocket close frame");
                    return None;
                }
                // tungstenite queues the pong itself.
                Message::Ping(_) | Message::Pong(_) => {}
                Message::Binary(_) => {
                    warn!("received unexpected binary WebSocket frame, skipping");
                }
                Message::Frame(_) => {
                    debug!("received raw WebSocket frame, skipping");
                }
            }
        }
    }

    async fn close(&mut self) -> Result<(), ApiError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream
            .close(None)
            .await
            .map_err(|e| ApiError::TransportSend(e.to_string()))
    }
}

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

    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    #[test]
    fn websocket_transport_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<WebSocketTransport>();
    }

    #[tokio::test]
    async fn connect_fails_with_invalid_url() {
        let err = WebSocketTransport::connect("not-a-valid-url", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
    }

    #[tokio::test]
    async fn connect_fails_with_unreachable_host() {
        let err = WebSocketTransport::connect("ws://127.0.0.1:1/ws", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io(_)));
    }

    #[tokio::test]
    async fn token_with_newline_is_rejected() {
        let err = WebSocketTransport::connect("ws://127.0.0.1:1/ws", Some("bad\ntoken"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }

    // ── Mock-server helpers ──────────────────────────────────────────────

    /// Start a local WebSocket server that runs `handler` on the accepted
    /// connection and returns the URL to connect to.
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

        format!("ws://{addr}/ws")
    }

    /// Start a server that reports the `Authorization` header of the upgrade
    /// request, then closes.
    async fn start_header_capture_server() -> (String, oneshot::Receiver<Option<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let auth = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let _ = tx.send(auth);
                Ok(resp)
            };
            let mut ws = tokio_tungstenite::accept_hdr_async(tcp, callback)
                .await
                .unwrap();
            let _ = ws.close(None).await;
        });

        (format!("ws://{addr}/ws"), rx)
    }

    // ── Mock-server tests ────────────────────────────────────────────────

    #[tokio::test]
    async fn bearer_token_is_sent_on_handshake() {
        let (url, auth) = start_header_capture_server().await;
        let _transport = WebSocketTransport::connect(&url, Some("secret-token"))
            .await
            .unwrap();
        assert_eq!(auth.await.unwrap().as_deref(), Some("Bearer secret-token"));
    }

    #[tokio::test]
    async fn no_authorization_header_without_token() {
        let (url, auth) = start_header_capture_server().await;
        let _transport = WebSocketTransport::connect(&url, None).await.unwrap();
        assert!(auth.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn recv_receives_text_frames_in_order() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Text(r#"{"type":"message"}"#.into()))
                .await
                .unwrap();
            ws.send(Message::Text(r#"{"type":"webrtc-offer"}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url, None).await.unwrap();
        assert_eq!(
            transport.recv().await.unwrap().unwrap(),
            r#"{"type":"message"}"#
        );
        assert_eq!(
            transport.recv().await.unwrap().unwrap(),
            r#"{"type":"webrtc-offer"}"#
        );
        assert!(transport.recv().await.is_none());
    }

    #[tokio::test]
    async fn recv_skips_binary_frames() {
        let url = start_mock_server(|mut ws| async move {
            ws.send(Message::Binary(vec![0xDE, 0xAD].into()))
                .await
                .unwrap();
            ws.send(Message::Text("after_binary".into())).await.unwrap();
            ws.close(None).await.unwrap();
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url, None).await.unwrap();
        assert_eq!(transport.recv().await.unwrap().unwrap(), "after_binary");
    }

    #[tokio::test]
    async fn send_writes_one_text_frame() {
        let (tx, rx) = oneshot::channel::<String>();
        let url = start_mock_server(|mut ws| async move {
            if let Some(Ok(Message::Text(text))) = ws.next().await {
                let _ = tx.send(text.to_string());
            }
            while let Some(Ok(_)) = ws.next().await {}
        })
        .await;

        let mut transport = WebSocketTransport::connect(&url, None).await.unwrap();
        transport
            .send(r#"{"type":"typing"}"#.to_string())
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), r#"{"type":"typing"}"#);
        transport.close().await.unwrap();
    }

    #[tokio::test]
    async fn send_after_close_returns_transport_closed() {
        let url =
            start_mock_server(|mut ws| async move { while let Some(Ok(_)) = ws.next().await {} })
                .await;

        let mut transport = WebSocketTransport::connect(&url, None).await.unwrap();
        transport.close().await.unwrap();

        let err = transport.send("late".to_string()).await.unwrap_err();
        assert!(matches!(err, ApiError::TransportClosed));
    }

    #[tokio::test]
    async fn double_close_is_idempotent() {
        let url =
            start_mock_server(|mut ws| async move { while let Some(Ok(_)) = ws.next().await {} })
                .await;

        let mut transport = WebSocketTransport::connect(&url, None).await.unwrap();
        transport.close().await.unwrap();
        transport.close().await.unwrap();
    }

    #[tokio::test]
    async fn connect_with_timeout_times_out() {
        // Accepts TCP but never answers the upgrade.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_tcp, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = WebSocketTransport::connect_with_timeout(
            &format!("ws://{addr}/ws"),
            None,
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Timeout));
    }
}
