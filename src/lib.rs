//! # dumb_api client
//!
//! Async Rust client for the dumb_api chat and WebRTC signaling service.
//!
//! The crate has two halves that share one login [`Session`]:
//!
//! - **Request Gateway** ([`ApiClient`]): one typed method per REST route.
//!   Every call returns an [`ApiResponse`], either `Success(data)` or
//!   `Failure(message)`; HTTP errors, network faults and undecodable bodies
//!   never surface as `Err` or panics.
//! - **Realtime Channel** ([`RealtimeChannel`]): one persistent WebSocket.
//!   Inbound frames are classified by their `type` tag and broadcast as
//!   [`RealtimeEvent`]s to any number of subscribers.
//!
//! [`Client`] bundles both. The socket side is transport-agnostic: anything
//! implementing [`Transport`] can be attached with
//! [`RealtimeChannel::connect_transport`].
//!
//! ## Features
//!
//! - `transport-websocket` (default): [`WebSocketTransport`] over
//!   tokio-tungstenite and [`RealtimeChannel::connect`]
//! - `transport-websocket-tls`: `wss://` support via rustls
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dumb_api_client::{Client, ClientConfig};
//!
//! # async fn run() -> Result<(), dumb_api_client::ApiError> {
//! let client = Client::new(ClientConfig::new("http://localhost:3000"))?;
//! client.api().login("alice", "hunter2", None).await.into_result()?;
//!
//! for channel in client.api().get_channels().await.into_result()?.channels {
//!     println!("#{}", channel.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod event;
pub mod gateway;
pub mod models;
pub mod protocol;
pub mod realtime;
pub mod response;
pub mod session;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use client::Client;
pub use config::ClientConfig;
pub use endpoints::messages::SendMessageOptions;
pub use error::{ApiError, Result};
pub use event::RealtimeEvent;
pub use gateway::ApiClient;
pub use protocol::SignalingKind;
pub use realtime::RealtimeChannel;
pub use response::ApiResponse;
pub use session::Session;
pub use transport::Transport;

#[cfg(feature = "transport-websocket")]
pub use transports::WebSocketTransport;
