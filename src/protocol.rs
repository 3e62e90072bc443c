//! Inbound frame classification for the realtime channel.
//!
//! Every frame the service pushes is a JSON object with a `type`
//! discriminator. Chat messages and the four WebRTC signaling frames are
//! surfaced; anything else is dropped.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::event::RealtimeEvent;
use crate::models::{Message, WebRtcMessage};

/// Discriminator of a chat message frame.
pub const MESSAGE_TYPE: &str = "message";

/// WebRTC signaling frame types relayed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalingKind {
    #[serde(rename = "webrtc-offer")]
    Offer,
    #[serde(rename = "webrtc-answer")]
    Answer,
    #[serde(rename = "webrtc-ice-candidate")]
    IceCandidate,
    #[serde(rename = "webrtc-end-call")]
    EndCall,
}

impl SignalingKind {
    /// All signaling kinds, in call-setup order.
    pub const ALL: [SignalingKind; 4] = [
        SignalingKind::Offer,
        SignalingKind::Answer,
        SignalingKind::IceCandidate,
        SignalingKind::EndCall,
    ];

    /// The frame's `type` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            SignalingKind::Offer => "webrtc-offer",
            SignalingKind::Answer => "webrtc-answer",
            SignalingKind::IceCandidate => "webrtc-ice-candidate",
            SignalingKind::EndCall => "webrtc-end-call",
        }
    }

    /// Parse a frame's `type` tag.
    pub fn from_type(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for SignalingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one inbound text frame.
///
/// Returns `None` for malformed JSON, a missing or non-string `type`, an
/// unknown `type`, or a body that does not fit the record its `type` names.
/// Those frames are logged and otherwise ignored.
pub fn parse_frame(text: &str) -> Option<RealtimeEvent> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("failed to parse realtime frame: {e}");
            return None;
        }
    };

    let Some(tag) = value.get("type").and_then(Value::as_str) else {
        debug!("realtime frame without a type tag, dropping");
        return None;
    };

    if tag == MESSAGE_TYPE {
        return match serde_json::from_value::<Message>(value) {
            Ok(message) => Some(RealtimeEvent::MessageReceived(message)),
            Err(e) => {
                warn!("failed to decode message frame: {e}");
                None
            }
        };
    }

    if let Some(kind) = SignalingKind::from_type(tag) {
        return match serde_json::from_value::<WebRtcMessage>(value) {
            Ok(envelope) => Some(RealtimeEvent::Signaling { kind, envelope }),
            Err(e) => {
                warn!(%kind, "failed to decode signaling frame: {e}");
                None
            }
        };
    }

    debug!(frame_type = tag, "ignoring realtime frame of unknown type");
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn message_frame_yields_message_event() {
        let frame = r#"{"type":"message","id":"1","channel":"c","from":"u","text":"hi","ts":100}"#;
        match parse_frame(frame) {
            Some(RealtimeEvent::MessageReceived(msg)) => {
                assert_eq!(msg.text, "hi");
                assert_eq!(msg.timestamp, 100);
            }
            other => panic!("expected MessageReceived, got {other:?}"),
        }
    }

    #[test]
    fn every_signaling_tag_is_recognized() {
        for kind in SignalingKind::ALL {
            let frame = format!(r#"{{"type":"{kind}","from":"alice","to":"bob"}}"#);
            match parse_frame(&frame) {
                Some(RealtimeEvent::Signaling {
                    kind: parsed,
                    envelope,
                }) => {
                    assert_eq!(parsed, kind);
                    assert_eq!(envelope.kind, kind.as_str());
                    assert_eq!(envelope.from, "alice");
                }
                other => panic!("expected Signaling for {kind}, got {other:?}"),
            }
        }
    }

    #[test]
    fn offer_payload_is_kept_opaque() {
        let frame = r#"{"type":"webrtc-offer","from":"a","to":"b","channel":"c",
                        "offer":{"type":"offer","sdp":"v=0\r\n"}}"#;
        let Some(RealtimeEvent::Signaling { envelope, .. }) = parse_frame(frame) else {
            panic!("expected Signaling");
        };
        assert_eq!(envelope.channel.as_deref(), Some("c"));
        assert_eq!(envelope.offer.unwrap()["sdp"], "v=0\r\n");
    }

    #[test]
    fn unknown_missing_and_malformed_frames_are_dropped() {
        assert!(parse_frame(r#"{"type":"unknown"}"#).is_none());
        assert!(parse_frame(r#"{"text":"no type"}"#).is_none());
        assert!(parse_frame(r#"{"type":7}"#).is_none());
        assert!(parse_frame("not json").is_none());
        assert!(parse_frame("").is_none());
        assert!(parse_frame("[1,2,3]").is_none());
    }

    #[test]
    fn message_frame_with_wrong_shape_is_dropped() {
        assert!(parse_frame(r#"{"type":"message","ts":"yesterday"}"#).is_none());
    }

    #[test]
    fn signaling_kind_round_trips_through_serde() {
        let json = serde_json::to_string(&SignalingKind::IceCandidate).unwrap();
        assert_eq!(json, r#""webrtc-ice-candidate""#);
        let back: SignalingKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SignalingKind::IceCandidate);
        assert!(SignalingKind::from_type("webrtc-bogus").is_none());
    }
}
