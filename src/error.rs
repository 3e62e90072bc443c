//! Error types for the dumb_api client.
//!
//! Request Gateway operations never return these directly; they fold every
//! fault into an [`ApiResponse::Failure`](crate::response::ApiResponse). The
//! realtime channel and the transports surface them as hard errors.

use thiserror::Error;

/// Errors that can occur when using the dumb_api client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to send a frame through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a frame from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was already closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// Failed to serialize or deserialize a JSON payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Attempted to send on the realtime channel while it is not open.
    #[error("WebSocket is not connected")]
    NotConnected,

    /// The configured base address cannot be turned into a request or socket URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP layer failed before a response was received.
    #[error("http error: {0}")]
    Http(String),

    /// The service answered with a failure envelope.
    #[error("server error: {message}")]
    Server {
        /// Human-readable error message reported by the service.
        message: String,
    },

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_connect() {
            ApiError::Http(format!("connection failed: {e}"))
        } else {
            ApiError::Http(e.to_string())
        }
    }
}

/// A specialized [`Result`] type for dumb_api client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
