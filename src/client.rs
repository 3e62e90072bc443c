//! Facade tying the Request Gateway and the Realtime Channel to one session.
//!
//! # Example
//!
//! ```rust,no_run
//! use dumb_api_client::{Client, ClientConfig, RealtimeEvent};
//!
//! # async fn run() -> Result<(), dumb_api_client::ApiError> {
//! let client = Client::new(ClientConfig::from_env())?;
//!
//! let login = client.api().login("alice", "hunter2", None).await;
//! if let Some(err) = login.error() {
//!     eprintln!("login failed: {err}");
//!     return Ok(());
//! }
//!
//! let mut events = client.realtime().subscribe();
//! client.realtime().connect().await?;
//!
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         RealtimeEvent::MessageReceived(msg) => println!("{}: {}", msg.from, msg.text),
//!         RealtimeEvent::ConnectionChanged { connected: false, .. } => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::gateway::ApiClient;
use crate::realtime::RealtimeChannel;
use crate::session::Session;

/// A dumb_api client: one [`ApiClient`] and one [`RealtimeChannel`] sharing a
/// [`Session`].
///
/// Logging in through [`api`](Self::api) authenticates both halves; the next
/// [`RealtimeChannel::connect`] sends the stored token on the handshake.
#[derive(Debug)]
pub struct Client {
    session: Arc<Session>,
    api: ApiClient,
    realtime: RealtimeChannel,
}

impl Client {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`](crate::error::ApiError::Http) if the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let config = Arc::new(config);
        let session = Arc::new(Session::new());
        let api = ApiClient::with_session(Arc::clone(&config), Arc::clone(&session))?;
        let realtime = RealtimeChannel::with_session(config, Arc::clone(&session));
        Ok(Self {
            session,
            api,
            realtime,
        })
    }

    /// The Request Gateway.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The Realtime Channel.
    pub fn realtime(&self) -> &RealtimeChannel {
        &self.realtime
    }

    /// The bearer token from the last successful login, if any.
    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// Returns `true` while the realtime socket is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// The configuration both halves were built with.
    pub fn config(&self) -> &ClientConfig {
        self.api.config()
    }
}
