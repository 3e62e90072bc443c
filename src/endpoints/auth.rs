//! Registration, login and two-factor authentication.

use reqwest::Method;
use serde_json::json;

use crate::gateway::ApiClient;
use crate::models::{LoginResponse, TwoFaSetupResponse, TwoFaStatusResponse};
use crate::response::ApiResponse;

impl ApiClient {
    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> ApiResponse<LoginResponse> {
        let body = json!({ "username": username, "password": password });
        self.send_json(Method::POST, "/api/register", Some(&body))
            .await
    }

    /// Log in and, on success, keep the returned bearer token for every later
    /// call and for the realtime handshake.
    ///
    /// When the account has two-factor authentication enabled and no
    /// `two_factor_token` is given, the service answers with
    /// `requires_2fa = true` and a `session_id` instead of a token; finish with
    /// [`verify_2fa_login`](Self::verify_2fa_login). A failed login leaves any
    /// previously held token in place.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        two_factor_token: Option<&str>,
    ) -> ApiResponse<LoginResponse> {
        let body = json!({
            "username": username,
            "password": password,
            "twoFactorToken": two_factor_token,
        });
        let response: ApiResponse<LoginResponse> =
            self.send_json(Method::POST, "/api/login", Some(&body)).await;
        if let Some(data) = response.data() {
            self.remember_token(data.token.as_deref());
        }
        response
    }

    /// Complete a login that required a second factor. Stores the token on
    /// success, like [`login`](Self::login).
    pub async fn verify_2fa_login(
        &self,
        username: &str,
        session_id: &str,
        two_factor_token: &str,
    ) -> ApiResponse<LoginResponse> {
        let body = json!({
            "username": username,
            "sessionId": session_id,
            "twoFactorToken": two_factor_token,
        });
        let response: ApiResponse<LoginResponse> = self
            .send_json(Method::POST, "/api/2fa/verify-login", Some(&body))
            .await;
        if let Some(data) = response.data() {
            self.remember_token(data.token.as_deref());
        }
        response
    }

    /// Start two-factor enrollment; returns the secret and a QR code URL.
    pub async fn setup_2fa(&self) -> ApiResponse<TwoFaSetupResponse> {
        self.send_json(Method::POST, "/api/2fa/setup", None).await
    }

    /// Confirm enrollment with a code from the authenticator app.
    pub async fn enable_2fa(&self, token: &str) -> ApiResponse<()> {
        let body = json!({ "token": token });
        self.send_unit(Method::POST, "/api/2fa/enable", Some(&body))
            .await
    }

    /// Turn two-factor authentication off; requires the account password.
    pub async fn disable_2fa(&self, password: &str) -> ApiResponse<()> {
        let body = json!({ "password": password });
        self.send_unit(Method::POST, "/api/2fa/disable", Some(&body))
            .await
    }

    /// Whether two-factor authentication is enabled for the current user.
    pub async fn get_2fa_status(&self) -> ApiResponse<TwoFaStatusResponse> {
        self.get_json("/api/2fa/status", &[]).await
    }
}
