//! Realtime Channel: one persistent socket to the service.
//!
//! [`RealtimeChannel`] owns at most one open connection. While it is open, a
//! background task multiplexes three things with `tokio::select!`: outgoing
//! frames queued by [`send`](RealtimeChannel::send), the shutdown signal from
//! [`disconnect`](RealtimeChannel::disconnect) or an external cancellation
//! signal, and inbound frames, which are classified by
//! [`parse_frame`](crate::protocol::parse_frame) and published to every
//! subscriber as [`RealtimeEvent`]s.
//!
//! # Notifications
//!
//! Each connection produces exactly one `ConnectionChanged { connected: true }`
//! followed, at most once, by `ConnectionChanged { connected: false }`. The
//! closing notification carries an error text only when a receive or send
//! fault ended the connection. Cooperative cancellation ends the connection
//! silently.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::event::RealtimeEvent;
use crate::protocol::parse_frame;
use crate::session::Session;
use crate::transport::Transport;

/// Work handed from the channel handle to the background task.
enum Command {
    Send {
        text: String,
        ack: oneshot::Sender<Result<()>>,
    },
}

/// Handles to one open connection's background task.
struct Connection {
    cmd_tx: mpsc::UnboundedSender<Command>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// The Realtime Channel.
///
/// Usually obtained from [`Client::realtime`](crate::client::Client::realtime),
/// which shares the login session with the Request Gateway so the socket
/// handshake carries the bearer token.
pub struct RealtimeChannel {
    config: Arc<ClientConfig>,
    session: Arc<Session>,
    event_tx: broadcast::Sender<RealtimeEvent>,
    connection: Mutex<Option<Connection>>,
}

impl RealtimeChannel {
    /// Create a closed channel with its own, empty session.
    ///
    /// Its handshake carries no bearer token. To connect as a logged-in user,
    /// use [`Client`](crate::client::Client) or share the gateway's session
    /// through [`with_session`](Self::with_session).
    pub fn new(config: ClientConfig) -> Self {
        Self::with_session(Arc::new(config), Arc::new(Session::new()))
    }

    /// Create a closed channel on an existing session, typically
    /// [`ApiClient::session`](crate::gateway::ApiClient::session). A token
    /// stored by a later login is sent on the next connect.
    pub fn with_session(config: Arc<ClientConfig>, session: Arc<Session>) -> Self {
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        Self {
            config,
            session,
            event_tx,
            connection: Mutex::new(None),
        }
    }

    /// Register a new listener.
    ///
    /// Each receiver sees every event published after it subscribed, in
    /// arrival order. A receiver that falls more than
    /// `event_channel_capacity` events behind loses the oldest ones and gets
    /// [`RecvError::Lagged`](broadcast::error::RecvError::Lagged).
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.event_tx.subscribe()
    }

    /// Returns `true` while the socket is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Open the socket at the configured base address.
    ///
    /// The socket URL is the base address with `http` swapped for `ws` (or
    /// `https` for `wss`) and `/ws` appended. The session's bearer token, if
    /// any, is sent as an `Authorization` header. An already open connection
    /// is closed first.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidUrl`] for a base address that is not HTTP(S) or
    /// WS(S), or the handshake error from the transport.
    #[cfg(feature = "transport-websocket")]
    pub async fn connect(&self) -> Result<()> {
        self.open_websocket(None).await
    }

    /// Like [`connect`](Self::connect), but the background task also stops,
    /// without notification, once `cancel` becomes `true`.
    #[cfg(feature = "transport-websocket")]
    pub async fn connect_with_cancel(&self, cancel: watch::Receiver<bool>) -> Result<()> {
        self.open_websocket(Some(cancel)).await
    }

    #[cfg(feature = "transport-websocket")]
    async fn open_websocket(&self, cancel: Option<watch::Receiver<bool>>) -> Result<()> {
        use crate::transports::WebSocketTransport;

        let url = self.config.websocket_url()?;
        self.disconnect().await?;

        let token = self.session.token();
        info!(%url, authenticated = token.is_some(), "opening realtime socket");
        let transport = match self.config.connect_timeout {
            Some(timeout) => {
                WebSocketTransport::connect_with_timeout(&url, token.as_deref(), timeout).await?
            }
            None => WebSocketTransport::connect(&url, token.as_deref()).await?,
        };
        self.connect_transport(transport, cancel).await
    }

    /// Attach an already open transport and start the background task.
    ///
    /// Closes any connection that is still open, then emits
    /// `ConnectionChanged { connected: true }`.
    pub async fn connect_transport<T: Transport>(
        &self,
        transport: T,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<()> {
        let mut guard = self.connection.lock().await;
        if let Some(previous) = guard.take() {
            debug!("replacing open realtime connection");
            self.shut_down(previous).await;
        }

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        self.session.set_connected(true);
        publish(&self.event_tx, RealtimeEvent::connected());

        let task = tokio::spawn(receive_loop(
            transport,
            cmd_rx,
            self.event_tx.clone(),
            Arc::clone(&self.session),
            shutdown_rx,
            cancel,
        ));

        *guard = Some(Connection {
            cmd_tx,
            shutdown_tx: Some(shutdown_tx),
            task,
        });
        Ok(())
    }

    /// Serialize `payload` as JSON and write it as one text frame.
    ///
    /// Returns once the frame has been written.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotConnected`] if the socket is not open
    /// - [`ApiError::Serialization`] if `payload` cannot be serialized
    /// - the transport's write error; the connection is closed in that case
    pub async fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<()> {
        let cmd_tx = {
            let guard = self.connection.lock().await;
            match guard.as_ref() {
                Some(conn) if self.session.is_connected() => conn.cmd_tx.clone(),
                _ => return Err(ApiError::NotConnected),
            }
        };

        let text = serde_json::to_string(payload)?;
        let (ack, ack_rx) = oneshot::channel();
        cmd_tx
            .send(Command::Send { text, ack })
            .map_err(|_| ApiError::NotConnected)?;
        ack_rx.await.map_err(|_| ApiError::NotConnected)?
    }

    /// Close the socket gracefully and wait for the background task.
    ///
    /// Emits `ConnectionChanged { connected: false }` unless the connection
    /// had already ended. Safe to call at any time, including repeatedly or
    /// before any connect.
    pub async fn disconnect(&self) -> Result<()> {
        let previous = self.connection.lock().await.take();
        match previous {
            Some(connection) => {
                self.shut_down(connection).await;
                info!("realtime socket disconnected");
            }
            None => debug!("disconnect: no open connection"),
        }
        Ok(())
    }

    /// Signal the task, wait up to `shutdown_timeout`, then abort it.
    async fn shut_down(&self, mut connection: Connection) {
        if let Some(tx) = connection.shutdown_tx.take() {
            let _ = tx.send(());
        }

        match tokio::time::timeout(self.config.shutdown_timeout, &mut connection.task).await {
            Ok(Ok(())) => {}
            Ok(Err(join_err)) => {
                warn!("receive loop terminated with join error: {join_err}");
            }
            Err(_) => {
                warn!("receive loop did not exit within timeout; aborting task");
                connection.task.abort();
                if let Err(join_err) = connection.task.await {
                    debug!("receive loop aborted: {join_err}");
                }
            }
        }

        if self.session.take_connected() {
            publish(&self.event_tx, RealtimeEvent::disconnected(None));
        }
    }
}

impl std::fmt::Debug for RealtimeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeChannel")
            .field("connected", &self.is_connected())
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

impl Drop for RealtimeChannel {
    fn drop(&mut self) {
        // No executor to drive a close handshake here; abort instead.
        if let Some(connection) = self.connection.get_mut().take() {
            connection.task.abort();
        }
    }
}

// ── Receive loop ────────────────────────────────────────────────────

/// Background task of one connection.
///
/// Exits when:
/// - shutdown is signalled or the channel handle is gone
/// - the cancellation signal fires
/// - the transport returns `None` (server closed the socket)
/// - a receive or send fault occurs
async fn receive_loop(
    mut transport: impl Transport,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    event_tx: broadcast::Sender<RealtimeEvent>,
    session: Arc<Session>,
    mut shutdown_rx: oneshot::Receiver<()>,
    mut cancel: Option<watch::Receiver<bool>>,
) {
    debug!("receive loop started");

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(Command::Send { text, ack }) => {
                        if let Err(e) = transport.send(text).await {
                            error!("realtime send failed: {e}");
                            let message = e.to_string();
                            let _ = ack.send(Err(e));
                            let _ = transport.close().await;
                            emit_disconnected(&event_tx, &session, Some(message));
                            break;
                        }
                        let _ = ack.send(Ok(()));
                    }
                    None => {
                        debug!("command channel closed, shutting down receive loop");
                        let _ = transport.close().await;
                        emit_disconnected(&event_tx, &session, None);
                        break;
                    }
                }
            }

            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                if let Err(e) = transport.close().await {
                    debug!("close handshake failed: {e}");
                }
                emit_disconnected(&event_tx, &session, None);
                break;
            }

            () = cancelled(&mut cancel) => {
                info!("realtime connection cancelled");
                let _ = transport.close().await;
                session.take_connected();
                break;
            }

            incoming = transport.recv() => {
                match incoming {
                    Some(Ok(text)) => {
                        if let Some(event) = parse_frame(&text) {
                            publish(&event_tx, event);
                        }
                    }
                    Some(Err(e)) => {
                        error!("realtime receive failed: {e}");
                        emit_disconnected(&event_tx, &session, Some(e.to_string()));
                        break;
                    }
                    None => {
                        debug!("realtime socket closed by server");
                        // Flushes the reply to the server's close frame.
                        let _ = transport.close().await;
                        emit_disconnected(&event_tx, &session, None);
                        break;
                    }
                }
            }
        }
    }

    debug!("receive loop exited");
}

/// Resolves once the cancellation signal reads `true`. Never resolves without
/// a signal, or if its sender is dropped first.
async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
        if fired {
            return;
        }
    }
    std::future::pending::<()>().await;
}

fn publish(event_tx: &broadcast::Sender<RealtimeEvent>, event: RealtimeEvent) {
    if event_tx.send(event).is_err() {
        debug!("no realtime subscribers, event dropped");
    }
}

/// Emit the closing notification if this connection has not emitted it yet.
fn emit_disconnected(
    event_tx: &broadcast::Sender<RealtimeEvent>,
    session: &Session,
    error: Option<String>,
) {
    if session.take_connected() {
        publish(event_tx, RealtimeEvent::disconnected(error));
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    // ── Mock transport ──────────────────────────────────────────────

    /// Replays scripted frames, records sends, then hangs until shutdown.
    struct MockTransport {
        incoming: VecDeque<Option<Result<String>>>,
        sent: Arc<StdMutex<Vec<String>>>,
        closed: Arc<AtomicBool>,
        fail_sends: bool,
    }

    impl MockTransport {
        fn new(
            incoming: Vec<Option<Result<String>>>,
        ) -> (Self, Arc<StdMutex<Vec<String>>>, Arc<AtomicBool>) {
            let sent = Arc::new(StdMutex::new(Vec::new()));
            let closed = Arc::new(AtomicBool::new(false));
            let transport = Self {
                incoming: VecDeque::from(incoming),
                sent: Arc::clone(&sent),
                closed: Arc::clone(&closed),
                fail_sends: false,
            };
            (transport, sent, closed)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&mut self, message: String) -> Result<()> {
            if self.fail_sends {
                return Err(ApiError::TransportSend("broken pipe".into()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn recv(&mut self) -> Option<Result<String>> {
            match self.incoming.pop_front() {
                Some(item) => item,
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) -> Result<()> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }
    }

    fn channel() -> RealtimeChannel {
        RealtimeChannel::new(ClientConfig::default())
    }

    async fn next(rx: &mut broadcast::Receiver<RealtimeEvent>) -> RealtimeEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    fn message_frame(text: &str) -> Option<Result<String>> {
        Some(Ok(format!(
            r#"{{"type":"message","id":"1","channel":"c","from":"u","text":"{text}","ts":100}}"#
        )))
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn connect_emits_connected_then_frames_in_order() {
        let rt = channel();
        let mut rx = rt.subscribe();
        let (transport, _, _) = MockTransport::new(vec![
            message_frame("one"),
            Some(Ok(r#"{"type":"webrtc-offer","from":"a","to":"b"}"#.into())),
            message_frame("two"),
        ]);

        rt.connect_transport(transport, None).await.unwrap();
        assert!(rt.is_connected());
        assert_eq!(next(&mut rx).await, RealtimeEvent::connected());

        match next(&mut rx).await {
            RealtimeEvent::MessageReceived(msg) => assert_eq!(msg.text, "one"),
            other => panic!("expected message, got {other:?}"),
        }
        match next(&mut rx).await {
            RealtimeEvent::Signaling { kind, .. } => {
                assert_eq!(kind, crate::protocol::SignalingKind::Offer);
            }
            other => panic!("expected signaling, got {other:?}"),
        }
        match next(&mut rx).await {
            RealtimeEvent::MessageReceived(msg) => assert_eq!(msg.text, "two"),
            other => panic!("expected message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn junk_frames_do_not_stop_the_loop() {
        let rt = channel();
        let mut rx = rt.subscribe();
        let (transport, _, _) = MockTransport::new(vec![
            Some(Ok("not json".into())),
            Some(Ok(r#"{"type":"unknown"}"#.into())),
            message_frame("still here"),
        ]);
        rt.connect_transport(transport, None).await.unwrap();
        next(&mut rx).await;

        match next(&mut rx).await {
            RealtimeEvent::MessageReceived(msg) => assert_eq!(msg.text, "still here"),
            other => panic!("expected message, got {other:?}"),
        }
        assert!(rt.is_connected());
    }

    #[tokio::test]
    async fn send_writes_one_frame() {
        let rt = channel();
        let (transport, sent, _) = MockTransport::new(vec![]);
        rt.connect_transport(transport, None).await.unwrap();

        let payload = serde_json::json!({"type": "typing", "channel": "general"});
        rt.send(&payload).await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let written: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(written, payload);
    }

    #[tokio::test]
    async fn send_before_connect_is_not_connected() {
        let rt = channel();
        let err = rt.send(&serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ApiError::NotConnected));
    }

    #[tokio::test]
    async fn send_failure_is_returned_and_closes_connection() {
        let rt = channel();
        let mut rx = rt.subscribe();
        let (mut transport, _, closed) = MockTransport::new(vec![]);
        transport.fail_sends = true;
        rt.connect_transport(transport, None).await.unwrap();
        next(&mut rx).await;

        let err = rt.send(&"hello").await.unwrap_err();
        assert!(matches!(err, ApiError::TransportSend(_)));

        match next(&mut rx).await {
            RealtimeEvent::ConnectionChanged { connected, error } => {
                assert!(!connected);
                assert!(error.unwrap().contains("broken pipe"));
            }
            other => panic!("expected disconnect, got {other:?}"),
        }
        assert!(closed.load(Ordering::Relaxed));
        assert!(!rt.is_connected());
    }

    #[tokio::test]
    async fn server_close_emits_once_without_error() {
        let rt = channel();
        let mut rx = rt.subscribe();
        let (transport, _, closed) = MockTransport::new(vec![None]);
        rt.connect_transport(transport, None).await.unwrap();

        assert_eq!(next(&mut rx).await, RealtimeEvent::connected());
        assert_eq!(next(&mut rx).await, RealtimeEvent::disconnected(None));
        // Close handshake is answered before the notification.
        assert!(closed.load(Ordering::Relaxed));

        rt.disconnect().await.unwrap();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn receive_fault_carries_error_text() {
        let rt = channel();
        let mut rx = rt.subscribe();
        let (transport, _, _) = MockTransport::new(vec![Some(Err(ApiError::TransportReceive(
            "reset by peer".into(),
        )))]);
        rt.connect_transport(transport, None).await.unwrap();
        next(&mut rx).await;

        match next(&mut rx).await {
            RealtimeEvent::ConnectionChanged { connected, error } => {
                assert!(!connected);
                assert!(error.unwrap().contains("reset by peer"));
            }
            other => panic!("expected disconnect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn disconnect_closes_transport_and_emits_once() {
        let rt = channel();
        let mut rx = rt.subscribe();
        let (transport, _, closed) = MockTransport::new(vec![]);
        rt.connect_transport(transport, None).await.unwrap();
        next(&mut rx).await;

        rt.disconnect().await.unwrap();
        rt.disconnect().await.unwrap();

        assert!(closed.load(Ordering::Relaxed));
        assert_eq!(next(&mut rx).await, RealtimeEvent::disconnected(None));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn disconnect_without_connect_is_a_no_op() {
        let rt = channel();
        let mut rx = rt.subscribe();
        rt.disconnect().await.unwrap();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn cancellation_ends_connection_silently() {
        let rt = channel();
        let mut rx = rt.subscribe();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (transport, _, closed) = MockTransport::new(vec![]);
        rt.connect_transport(transport, Some(cancel_rx)).await.unwrap();
        next(&mut rx).await;

        cancel_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), async {
            while rt.is_connected() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        rt.disconnect().await.unwrap();
        assert!(closed.load(Ordering::Relaxed));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn reconnect_closes_previous_connection_first() {
        let rt = channel();
        let mut rx = rt.subscribe();
        let (first, _, first_closed) = MockTransport::new(vec![]);
        let (second, second_sent, _) = MockTransport::new(vec![]);

        rt.connect_transport(first, None).await.unwrap();
        rt.connect_transport(second, None).await.unwrap();

        assert!(first_closed.load(Ordering::Relaxed));
        assert_eq!(next(&mut rx).await, RealtimeEvent::connected());
        assert_eq!(next(&mut rx).await, RealtimeEvent::disconnected(None));
        assert_eq!(next(&mut rx).await, RealtimeEvent::connected());

        rt.send(&"ping").await.unwrap();
        assert_eq!(*second_sent.lock().unwrap(), vec![r#""ping""#.to_string()]);
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let rt = channel();
        let mut a = rt.subscribe();
        let mut b = rt.subscribe();
        let (transport, _, _) = MockTransport::new(vec![message_frame("hi")]);
        rt.connect_transport(transport, None).await.unwrap();

        for rx in [&mut a, &mut b] {
            assert_eq!(next(rx).await, RealtimeEvent::connected());
            assert!(matches!(next(rx).await, RealtimeEvent::MessageReceived(_)));
        }
    }
}
