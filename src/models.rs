//! Wire-compatible data records for the dumb_api service.
//!
//! The client only mirrors the service's JSON shapes. Field names follow the
//! service's camelCase keys; every field tolerates being absent so partial
//! records from older server builds still decode.
//!
//! Identifiers that the service sometimes emits as numbers or booleans are
//! normalized to strings by [`nullable_string`] and [`lenient_string`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Lenient string decoding ─────────────────────────────────────────

/// Decode a string-or-number-or-bool-or-null into `Option<String>`.
///
/// Numbers keep their JSON spelling (`42` → `"42"`), booleans become
/// `"true"`/`"false"`, and `null` becomes `None`. Arrays and objects are
/// rejected.
pub fn nullable_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string, number, bool or null, got {other}"
        ))),
    }
}

/// Like [`nullable_string`] but maps `null` to an empty string.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    nullable_string(deserializer).map(Option::unwrap_or_default)
}

// ── Entities ────────────────────────────────────────────────────────

/// A chat channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Caller-chosen identifier. The service stores whatever it was given, so
    /// it may come back as a number, boolean, string or null.
    #[serde(default, deserialize_with = "nullable_string")]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub member_count: i64,
    #[serde(default)]
    pub is_member: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_by: String,
    #[serde(default)]
    pub created_at: i64,
}

/// A chat message, as returned by the message routes and pushed over the socket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub channel: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
    /// Milliseconds since the Unix epoch.
    #[serde(rename = "ts", default)]
    pub timestamp: i64,
    #[serde(
        default,
        deserialize_with = "nullable_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub reply_to: Option<String>,
    /// The message being replied to. The service embeds one level only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceAttachment>,
    /// Set by the sender; the client passes it through without decrypting.
    #[serde(default)]
    pub encrypted: bool,
    /// Frame discriminator (`"message"`) or a free-form subtype tag.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "nullable_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<String>,
}

/// A registered user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
    /// Avatar file name, fetch with `get_user_avatar`.
    #[serde(default, deserialize_with = "nullable_string")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub last_seen: i64,
    #[serde(default, deserialize_with = "nullable_string")]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

/// A file attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    /// Stored name; pass to `download_file`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub original_name: String,
    #[serde(rename = "mimetype", default, deserialize_with = "lenient_string")]
    pub mime_type: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub download_url: String,
    #[serde(default)]
    pub uploaded_at: i64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uploaded_by: String,
}

/// A voice clip attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAttachment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: String,
    /// Length in seconds.
    #[serde(default)]
    pub duration: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub download_url: String,
}

/// WebRTC signaling envelope relayed through the service.
///
/// Only one of `offer`, `answer`, `candidate` or `data` is normally set,
/// depending on `kind`. Their contents are opaque to the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebRtcMessage {
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub from: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub to: String,
    #[serde(
        default,
        deserialize_with = "nullable_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl WebRtcMessage {
    /// The payload matching this envelope's `kind`, falling back to `data`.
    pub fn payload(&self) -> Option<&Value> {
        let specific = match self.kind.as_str() {
            "webrtc-offer" => self.offer.as_ref(),
            "webrtc-answer" => self.answer.as_ref(),
            "webrtc-ice-candidate" => self.candidate.as_ref(),
            _ => None,
        };
        specific.or(self.data.as_ref())
    }
}

// ── Response payloads ───────────────────────────────────────────────

/// Returned by register, login and two-factor verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "nullable_string")]
    pub token: Option<String>,
    /// Present when a second factor is required; pass to `verify_2fa_login`.
    #[serde(default, deserialize_with = "nullable_string")]
    pub session_id: Option<String>,
    #[serde(rename = "requires2FA", default)]
    pub requires_2fa: bool,
    #[serde(default)]
    pub two_factor_enabled: bool,
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFaSetupResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub qr_code_url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwoFaStatusResponse {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelCreateResponse {
    #[serde(rename = "channelId", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "channel", default, deserialize_with = "lenient_string")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelsResponse {
    #[serde(default)]
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMembersResponse {
    #[serde(default)]
    pub members: Vec<User>,
}

/// Returned by `send_message`, `send_voice_only` and `get_message`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<User>,
}

/// Returned by the avatar upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileUploadResponse {
    #[serde(default)]
    pub file: Option<FileAttachment>,
}

/// Returned by `upload_voice_message`; the clip itself goes to
/// `upload_voice_file` with `voice_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceUploadResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub voice_id: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub upload_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebRtcOfferResponse {
    #[serde(default)]
    pub offer: Option<Value>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebRtcAnswerResponse {
    #[serde(default)]
    pub answer: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IceCandidatesResponse {
    #[serde(default)]
    pub candidates: Vec<Value>,
}
