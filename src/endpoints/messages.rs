//! Message routes.

use reqwest::Method;
use serde_json::json;

use crate::gateway::{ApiClient, Route};
use crate::models::{MessageResponse, MessagesResponse};
use crate::response::ApiResponse;

/// Page size used by [`ApiClient::get_messages`] when the caller has no preference.
pub const DEFAULT_MESSAGE_LIMIT: u32 = 50;

/// Optional parts of an outgoing message.
#[derive(Debug, Clone, Default)]
pub struct SendMessageOptions {
    /// Id of the message being replied to.
    pub reply_to: Option<String>,
    /// Id of a file previously uploaded with `upload_file`.
    pub file_id: Option<String>,
    /// Marks the message as encrypted. The text is sent as given; the client
    /// does not encrypt it.
    pub encrypt: bool,
}

impl SendMessageOptions {
    /// Reply to the message with this id.
    #[must_use]
    pub fn with_reply_to(mut self, message_id: impl Into<String>) -> Self {
        self.reply_to = Some(message_id.into());
        self
    }

    /// Attach a file uploaded earlier.
    #[must_use]
    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }

    /// Set the encrypted marker.
    #[must_use]
    pub fn with_encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }
}

impl ApiClient {
    /// Post a text message to a channel.
    pub async fn send_message(
        &self,
        channel: &str,
        text: &str,
        options: SendMessageOptions,
    ) -> ApiResponse<MessageResponse> {
        let body = json!({
            "channel": channel,
            "text": text,
            "replyTo": options.reply_to,
            "fileId": options.file_id,
            "encrypt": options.encrypt,
        });
        self.send_json(Method::POST, "/api/message", Some(&body))
            .await
    }

    /// Post a message that consists of a previously uploaded voice clip only.
    pub async fn send_voice_only(
        &self,
        channel: &str,
        voice_message: &str,
    ) -> ApiResponse<MessageResponse> {
        let body = json!({ "channel": channel, "voiceMessage": voice_message });
        self.send_json(Method::POST, "/api/message/voice-only", Some(&body))
            .await
    }

    /// Fetch up to `limit` messages of a channel, newest page first; pass the
    /// oldest id seen as `before` to page backwards.
    pub async fn get_messages(
        &self,
        channel: &str,
        limit: u32,
        before: Option<&str>,
    ) -> ApiResponse<MessagesResponse> {
        let mut query = vec![("channel", channel.to_string()), ("limit", limit.to_string())];
        if let Some(before) = before.filter(|b| !b.is_empty()) {
            query.push(("before", before.to_string()));
        }
        self.get_json("/api/messages", &query).await
    }

    /// Fetch one message by id.
    pub async fn get_message(&self, message_id: &str) -> ApiResponse<MessageResponse> {
        self.get_json(Route::new("/api/message", &[message_id]), &[])
            .await
    }
}
