//! Typed operations of the Request Gateway, one module per route family.
//!
//! Every module adds methods to [`ApiClient`](crate::gateway::ApiClient);
//! nothing here is instantiated directly.

pub mod auth;
pub mod channels;
pub mod email;
pub mod files;
pub mod messages;
pub mod users;
pub mod webrtc;
