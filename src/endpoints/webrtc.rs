//! WebRTC signaling over HTTP.
//!
//! Offers, answers and candidates are opaque JSON to the client; pass through
//! whatever the local WebRTC stack produced. The callee receives them either
//! as realtime [`Signaling`](crate::event::RealtimeEvent::Signaling) events or
//! by polling the `get_*` routes below.

use reqwest::Method;
use serde_json::{json, Value};

use crate::gateway::ApiClient;
use crate::models::{IceCandidatesResponse, WebRtcAnswerResponse, WebRtcOfferResponse};
use crate::response::ApiResponse;

impl ApiClient {
    /// Send an SDP offer to `to_user`, optionally scoped to a channel.
    pub async fn send_webrtc_offer(
        &self,
        to_user: &str,
        offer: &Value,
        channel: Option<&str>,
    ) -> ApiResponse<()> {
        let body = json!({ "toUser": to_user, "offer": offer, "channel": channel });
        self.send_unit(Method::POST, "/api/webrtc/offer", Some(&body))
            .await
    }

    /// Answer an offer received from `to_user`.
    pub async fn send_webrtc_answer(&self, to_user: &str, answer: &Value) -> ApiResponse<()> {
        let body = json!({ "toUser": to_user, "answer": answer });
        self.send_unit(Method::POST, "/api/webrtc/answer", Some(&body))
            .await
    }

    /// Relay one ICE candidate to `to_user`.
    pub async fn send_ice_candidate(&self, to_user: &str, candidate: &Value) -> ApiResponse<()> {
        let body = json!({ "toUser": to_user, "candidate": candidate });
        self.send_unit(Method::POST, "/api/webrtc/ice-candidate", Some(&body))
            .await
    }

    /// Hang up a call with `target_user`.
    pub async fn end_webrtc_call(&self, target_user: &str) -> ApiResponse<()> {
        let body = json!({ "targetUser": target_user });
        self.send_unit(Method::POST, "/api/webrtc/end-call", Some(&body))
            .await
    }

    /// Fetch the pending offer sent by `from_user`.
    pub async fn get_webrtc_offer(&self, from_user: &str) -> ApiResponse<WebRtcOfferResponse> {
        self.get_json("/api/webrtc/offer", &[("fromUser", from_user.to_string())])
            .await
    }

    /// Fetch the pending answer sent by `from_user`.
    pub async fn get_webrtc_answer(&self, from_user: &str) -> ApiResponse<WebRtcAnswerResponse> {
        self.get_json("/api/webrtc/answer", &[("fromUser", from_user.to_string())])
            .await
    }

    /// Fetch the ICE candidates queued by `from_user`.
    pub async fn get_ice_candidates(&self, from_user: &str) -> ApiResponse<IceCandidatesResponse> {
        self.get_json(
            "/api/webrtc/ice-candidates",
            &[("fromUser", from_user.to_string())],
        )
        .await
    }
}
