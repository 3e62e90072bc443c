//! User directory.

use crate::gateway::ApiClient;
use crate::models::UsersResponse;
use crate::response::ApiResponse;

impl ApiClient {
    /// List all registered users.
    pub async fn get_users(&self) -> ApiResponse<UsersResponse> {
        self.get_json("/api/users", &[]).await
    }
}
