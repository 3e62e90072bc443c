//! Channel routes.

use reqwest::Method;
use serde_json::json;

use crate::gateway::ApiClient;
use crate::models::{ChannelCreateResponse, ChannelMembersResponse, ChannelsResponse};
use crate::response::ApiResponse;

impl ApiClient {
    /// Create a channel, optionally tagged with a caller-chosen identifier.
    pub async fn create_channel(
        &self,
        name: &str,
        custom_id: Option<&str>,
    ) -> ApiResponse<ChannelCreateResponse> {
        let body = json!({ "name": name, "customId": custom_id });
        self.send_json(Method::POST, "/api/channels/create", Some(&body))
            .await
    }

    /// List every channel visible to the current user.
    pub async fn get_channels(&self) -> ApiResponse<ChannelsResponse> {
        self.get_json("/api/channels", &[]).await
    }

    /// Rename a channel.
    pub async fn update_channel(&self, name: &str, new_name: &str) -> ApiResponse<()> {
        let body = json!({ "name": name, "newName": new_name });
        self.send_unit(Method::PATCH, "/api/channels", Some(&body))
            .await
    }

    /// Join a channel as the current user.
    pub async fn join_channel(&self, channel: &str) -> ApiResponse<()> {
        let body = json!({ "channel": channel });
        self.send_unit(Method::POST, "/api/channels/join", Some(&body))
            .await
    }

    /// Leave a channel.
    pub async fn leave_channel(&self, channel: &str) -> ApiResponse<()> {
        let body = json!({ "channel": channel });
        self.send_unit(Method::POST, "/api/channels/leave", Some(&body))
            .await
    }

    /// List the members of a channel.
    pub async fn get_channel_members(&self, channel: &str) -> ApiResponse<ChannelMembersResponse> {
        self.get_json("/api/channels/members", &[("channel", channel.to_string())])
            .await
    }

    /// Search channels by name.
    pub async fn search_channels(&self, query: &str) -> ApiResponse<ChannelsResponse> {
        let body = json!({ "query": query });
        self.send_json(Method::POST, "/api/channels/search", Some(&body))
            .await
    }
}
