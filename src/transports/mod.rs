//! Transport implementations for the realtime channel.
//!
//! | Feature                   | Transport              |
//! |---------------------------|------------------------|
//! | `transport-websocket`     | [`WebSocketTransport`] |
//! | `transport-websocket-tls` | adds `wss://` support  |

#[cfg(feature = "transport-websocket")]
pub mod websocket;

#[cfg(feature = "transport-websocket")]
pub use websocket::WebSocketTransport;
