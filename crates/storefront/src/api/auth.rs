//! Account endpoints.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use super::{
    ApiClient, ApiError, AuthResponse, PasswordReset, ResetCodeVerified, ResetRequested,
    SignInRequest, SignUpRequest,
};

impl ApiClient {
    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns the server's message (e.g. "Incorrect email or password") on
    /// rejection.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("/api/v1/auth/signin")?;
        let body = SignInRequest { email, password };
        self.send(self.request(Method::POST, url, None).json(&body))
            .await
    }

    /// Create an account and receive a session token.
    ///
    /// # Errors
    ///
    /// Returns the server's message (e.g. "Account Already Exists") on
    /// rejection.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: &SignUpRequest<'_>) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint("/api/v1/auth/signup")?;
        self.send(self.request(Method::POST, url, None).json(request))
            .await
    }

    /// Ask the server to email a password reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is unknown or the request fails.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<ResetRequested, ApiError> {
        let url = self.endpoint("/api/v1/auth/forgotPasswords")?;
        self.send(
            self.request(Method::POST, url, None)
                .json(&json!({ "email": email })),
        )
        .await
    }

    /// Verify an emailed reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is invalid or expired.
    #[instrument(skip(self, code))]
    pub async fn verify_reset_code(&self, code: &str) -> Result<ResetCodeVerified, ApiError> {
        let url = self.endpoint("/api/v1/auth/verifyResetCode")?;
        self.send(
            self.request(Method::POST, url, None)
                .json(&json!({ "resetCode": code })),
        )
        .await
    }

    /// Set a new password after a verified reset code.
    ///
    /// # Errors
    ///
    /// Returns an error if no verified reset is pending for the email.
    #[instrument(skip(self, new_password))]
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<PasswordReset, ApiError> {
        let url = self.endpoint("/api/v1/auth/resetPassword")?;
        self.send(
            self.request(Method::PUT, url, None)
                .json(&json!({ "email": email, "newPassword": new_password })),
        )
        .await
    }
}
