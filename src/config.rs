//! Client configuration.

use std::time::Duration;

use crate::error::{ApiError, Result};

/// Environment variable read by [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "DUMB_API_URL";

/// Base address used when [`BASE_URL_ENV`] is not set.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Path of the realtime endpoint, relative to the base address.
pub const WEBSOCKET_PATH: &str = "/ws";

/// Default capacity of the realtime event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for a graceful realtime disconnect.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration shared by the Request Gateway and the Realtime Channel.
///
/// # Example
///
/// ```
/// use dumb_api_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("http://chat.example.com/")
///     .with_event_channel_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(3));
///
/// assert_eq!(config.base_url, "http://chat.example.com");
/// assert_eq!(config.websocket_url().unwrap(), "ws://chat.example.com/ws");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the service, without a trailing slash.
    pub base_url: String,
    /// `User-Agent` header sent with every HTTP request.
    pub user_agent: String,
    /// Capacity of the broadcast channel carrying realtime events.
    ///
    /// Subscribers that fall further behind than this lose the oldest events.
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// How long `disconnect` waits for the receive loop to close the socket
    /// before aborting it. Defaults to **1 second**.
    pub shutdown_timeout: Duration,
    /// Optional deadline for the WebSocket handshake. `None` leaves it to the
    /// transport.
    pub connect_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration for the given base address with default values.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: format!("dumb-api-client/{}", env!("CARGO_PKG_VERSION")),
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            connect_timeout: None,
        }
    }

    /// Build a configuration from `DUMB_API_URL`, falling back to
    /// `http://localhost:3000`.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the capacity of the realtime event channel.
    ///
    /// Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the graceful disconnect timeout.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Bound the WebSocket handshake by `timeout`.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Full URL of an HTTP route such as `/api/login`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Socket URL: the base address with its scheme swapped for the socket
    /// equivalent and `/ws` appended.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base address does not use an
    /// `http`, `https`, `ws` or `wss` scheme.
    pub fn websocket_url(&self) -> Result<String> {
        let (scheme, rest) = self
            .base_url
            .split_once("://")
            .ok_or_else(|| ApiError::InvalidUrl(self.base_url.clone()))?;

        let ws_scheme = match scheme.to_ascii_lowercase().as_str() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            _ => return Err(ApiError::InvalidUrl(self.base_url.clone())),
        };

        if rest.is_empty() {
            return Err(ApiError::InvalidUrl(self.base_url.clone()));
        }

        Ok(format!("{ws_scheme}://{rest}{WEBSOCKET_PATH}"))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
