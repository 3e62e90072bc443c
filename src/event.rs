//! Notifications published by the realtime channel.

use crate::models::{Message, WebRtcMessage};
use crate::protocol::SignalingKind;

/// A typed notification from the realtime channel.
///
/// Delivered in the order the underlying frames arrived. Subscribe with
/// [`RealtimeChannel::subscribe`](crate::realtime::RealtimeChannel::subscribe).
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// A chat message was pushed by the service (`"type": "message"`).
    MessageReceived(Message),

    /// A WebRTC signaling envelope was relayed to this user.
    Signaling {
        /// Which of the four signaling frames this was.
        kind: SignalingKind,
        /// The full envelope; payload fields are left opaque.
        envelope: WebRtcMessage,
    },

    /// The socket opened or closed.
    ///
    /// `error` is set only when the connection ended because of a fault.
    ConnectionChanged {
        connected: bool,
        error: Option<String>,
    },
}

impl RealtimeEvent {
    pub(crate) fn connected() -> Self {
        RealtimeEvent::ConnectionChanged {
            connected: true,
            error: None,
        }
    }

    pub(crate) fn disconnected(error: Option<String>) -> Self {
        RealtimeEvent::ConnectionChanged {
            connected: false,
            error,
        }
    }
}
