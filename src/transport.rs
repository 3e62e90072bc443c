//! Transport abstraction for the realtime channel.
//!
//! The [`Transport`] trait is a bidirectional channel of complete JSON text
//! frames. The service speaks WebSocket, and [`WebSocketTransport`] is the
//! production implementation; the trait exists so the realtime channel can
//! be driven by anything that frames text, including scripted test doubles.
//!
//! Connection setup is not part of this trait. Open the transport first,
//! then hand it to
//! [`RealtimeChannel::connect_transport`](crate::realtime::RealtimeChannel::connect_transport).
//!
//! [`WebSocketTransport`]: crate::transports::WebSocketTransport
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use dumb_api_client::error::ApiError;
//! use dumb_api_client::transport::Transport;
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, message: String) -> Result<(), ApiError> {
//!         // Write one complete JSON text frame
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Option<Result<String, ApiError>> {
//!         // Return the next text frame, or None once the peer has closed
//!         todo!()
//!     }
//!
//!     async fn close(&mut self) -> Result<(), ApiError> {
//!         // Perform the close handshake and release the connection
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::ApiError;

/// A bidirectional text frame transport.
///
/// Each call to [`send`](Transport::send) writes one complete frame and each
/// call to [`recv`](Transport::recv) yields one complete frame.
///
/// # Cancel Safety
///
/// [`recv`](Transport::recv) **MUST** be cancel-safe because the receive loop
/// polls it inside `tokio::select!` alongside outbound sends and shutdown.
/// Dropping a pending `recv` future must not lose a frame.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Write one JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TransportSend`] if the frame could not be written,
    /// or [`ApiError::TransportClosed`] after [`close`](Transport::close).
    async fn send(&mut self, message: String) -> Result<(), ApiError>;

    /// Receive the next text frame.
    ///
    /// Returns:
    /// - `Some(Ok(text))` for a complete frame
    /// - `Some(Err(e))` for a transport fault
    /// - `None` once the peer closed the connection cleanly
    async fn recv(&mut self) -> Option<Result<String, ApiError>>;

    /// Close the connection gracefully. Calling it twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails. Implementations must
    /// still release the connection in that case.
    async fn close(&mut self) -> Result<(), ApiError>;
}
