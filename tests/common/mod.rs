#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for dumb_api client integration tests.
//!
//! Provides a channel-fed [`MockTransport`] for the realtime channel, a
//! hyper-backed HTTP server ([`MockHttpServer`]) for the Request Gateway,
//! and builders for the JSON frames the service pushes.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use dumb_api_client::{ApiError, RealtimeEvent, Transport};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderValue, CONNECTION, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

// ── MockTransport ───────────────────────────────────────────────────

/// A mock transport whose inbound frames are pushed by the test.
///
/// `recv()` yields whatever is pushed through [`MockHandle::push`]; once the
/// handle is dropped it hangs, so the receive loop stays alive until shutdown.
pub struct MockTransport {
    incoming: mpsc::UnboundedReceiver<Option<Result<String, ApiError>>>,
    sent: Arc<StdMutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

/// Test-side controls of a [`MockTransport`].
pub struct MockHandle {
    incoming: mpsc::UnboundedSender<Option<Result<String, ApiError>>>,
    /// Frames written by the client.
    pub sent: Arc<StdMutex<Vec<String>>>,
    /// Whether `close()` has been called.
    pub closed: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> (Self, MockHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let transport = Self {
            incoming: rx,
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        };
        let handle = MockHandle {
            incoming: tx,
            sent,
            closed,
        };
        (transport, handle)
    }
}

impl MockHandle {
    /// Deliver one text frame.
    pub fn push(&self, frame: impl Into<String>) {
        let _ = self.incoming.send(Some(Ok(frame.into())));
    }

    /// Deliver a receive fault.
    pub fn fail(&self, error: ApiError) {
        let _ = self.incoming.send(Some(Err(error)));
    }

    /// Simulate the server closing the socket.
    pub fn close_from_server(&self) {
        let _ = self.incoming.send(None);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), ApiError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(ApiError::TransportClosed);
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, ApiError>> {
        match self.incoming.recv().await {
            Some(item) => item,
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), ApiError> {
        self.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

// ── Event helpers ───────────────────────────────────────────────────

/// Wait up to two seconds for the next event.
pub async fn next_event(rx: &mut broadcast::Receiver<RealtimeEvent>) -> RealtimeEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for a realtime event")
        .expect("event channel closed")
}

/// Assert that no event is queued right now.
pub fn assert_no_event(rx: &mut broadcast::Receiver<RealtimeEvent>) {
    match rx.try_recv() {
        Err(broadcast::error::TryRecvError::Empty) => {}
        other => panic!("expected no event, got {other:?}"),
    }
}

// ── Frame builders ──────────────────────────────────────────────────

pub fn message_json(id: &str, channel: &str, from: &str, text: &str, ts: i64) -> String {
    serde_json::json!({
        "type": "message",
        "id": id,
        "channel": channel,
        "from": from,
        "text": text,
        "ts": ts,
    })
    .to_string()
}

pub fn offer_json(from: &str, to: &str, sdp: &str) -> String {
    serde_json::json!({
        "type": "webrtc-offer",
        "from": from,
        "to": to,
        "channel": "general",
        "offer": { "type": "offer", "sdp": sdp },
    })
    .to_string()
}

pub fn ice_candidate_json(from: &str, to: &str) -> String {
    serde_json::json!({
        "type": "webrtc-ice-candidate",
        "from": from,
        "to": to,
        "candidate": {
            "candidate": "candidate:1 1 udp 2122260223 10.0.0.2 54321 typ host",
            "sdpMid": "0",
            "sdpMLineIndex": 0,
        },
    })
    .to_string()
}

// ── MockHttpServer ──────────────────────────────────────────────────

/// One request as received by [`MockHttpServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string, still percent-encoded.
    pub path: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Split a hyper request into its recorded form, collecting the body.
    async fn record(req: Request<Incoming>) -> Self {
        let (parts, body) = req.into_parts();
        let body = body
            .collect()
            .await
            .map(|collected| collected.to_bytes().to_vec())
            .unwrap_or_default();
        let path = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            method: parts.method.to_string(),
            path,
            headers,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }

    /// Path without the query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or_default()
    }
}

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl MockReply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.into().into_bytes(),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.into().into_bytes(),
        }
    }

    pub fn bytes(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: "application/octet-stream",
            body,
        }
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = StatusCode::from_u16(self.status).unwrap();
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        response
    }
}

/// An HTTP/1.1 server on 127.0.0.1 backed by hyper.
///
/// Every request is recorded and answered by the handler. Connections are
/// not kept alive, so the client opens a fresh one per request.
pub struct MockHttpServer {
    pub base_url: String,
    requests: Arc<StdMutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl MockHttpServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> MockReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(StdMutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(serve_connection(stream, move |req| {
                    recorded.lock().unwrap().push(req.clone());
                    handler(req)
                }));
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            task,
        }
    }

    /// Answer every request with the same reply.
    pub async fn always(reply: MockReply) -> Self {
        Self::start(move |_| reply.clone()).await
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The only request received so far.
    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request: {requests:?}");
        requests.into_iter().next().unwrap()
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serve HTTP on one accepted connection until the client is answered and
/// the connection closes.
pub async fn serve_connection<F>(stream: TcpStream, respond: F) -> hyper::Result<()>
where
    F: Fn(&RecordedRequest) -> MockReply + Send + Sync + 'static,
{
    let respond = Arc::new(respond);
    let service = service_fn(move |req: Request<Incoming>| {
        let respond = Arc::clone(&respond);
        async move {
            let request = RecordedRequest::record(req).await;
            Ok::<_, Infallible>(respond(&request).into_response())
        }
    });

    http1::Builder::new()
        .keep_alive(false)
        .serve_connection(TokioIo::new(stream), service)
        .await
}
