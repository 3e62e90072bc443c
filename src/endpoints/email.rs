//! Email verification and password reset.

use reqwest::Method;
use serde_json::json;

use crate::gateway::ApiClient;
use crate::response::ApiResponse;

impl ApiClient {
    /// Ask the service to mail a verification code to `email`.
    pub async fn send_verification_email(&self, email: &str) -> ApiResponse<()> {
        let body = json!({ "email": email });
        self.send_unit(Method::POST, "/api/email/send-verification", Some(&body))
            .await
    }

    /// Confirm `email` with the mailed code.
    pub async fn verify_email(&self, email: &str, code: &str) -> ApiResponse<()> {
        let body = json!({ "email": email, "code": code });
        self.send_unit(Method::POST, "/api/email/verify", Some(&body))
            .await
    }

    /// Start a password reset; the service mails a reset token.
    pub async fn request_password_reset(&self, email: &str) -> ApiResponse<()> {
        let body = json!({ "email": email });
        self.send_unit(Method::POST, "/api/auth/reset-password", Some(&body))
            .await
    }

    /// Finish a password reset with the mailed token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> ApiResponse<()> {
        let body = json!({ "token": token, "newPassword": new_password });
        self.send_unit(Method::POST, "/api/auth/reset-password/confirm", Some(&body))
            .await
    }
}
