#![warn(missing_docs)]
//! # devdesk-api
//!
//! ## Purpose
//! Typed wrappers for the platform's authentication endpoints.
//!
//! ## Responsibilities
//! - Shape login/register/password-recovery/logout/current-user calls.
//! - Fetch the external identity provider's authorize URL (a plain data
//!   fetch; completing the redirect handshake is the app layer's concern).
//! - Turn application-level rejections into typed errors carrying the
//!   backend message.
//!
//! ## Data flow
//! Callers build request payloads -> [`AuthApi`] dispatches through the
//! gateway -> envelopes are unwrapped into payload data or [`ApiError`].
//!
//! ## Ownership and lifetimes
//! [`AuthApi`] holds a cheap gateway clone; request/response payloads are
//! owned serde structs.
//!
//! ## Error model
//! Gateway classification and envelope rejections both surface as
//! [`ApiError`]; the gateway has already published the user-facing notice
//! for transport failures by the time an error reaches the caller.
//!
//! ## Security and privacy notes
//! Password fields live only inside request payloads; they are never logged
//! or echoed into errors.

use devdesk_core::{ApiEnvelope, CoreError};
use devdesk_gateway::{ApiGateway, GatewayError, Method, OutboundRequest};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Login request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

/// Registration request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired username.
    pub username: String,
    /// Desired password.
    pub password: String,
    /// Display nickname.
    pub nickname: String,
}

/// Password reset payload carrying the recovery token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    /// Recovery token issued by the forgot-password flow.
    pub token: String,
    /// Replacement password.
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Current-user profile returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Numeric user identifier.
    pub id: i64,
    /// Login username.
    pub username: String,
    /// Display nickname, when set.
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Authentication endpoint client.
#[derive(Clone)]
pub struct AuthApi {
    gateway: ApiGateway,
}

impl AuthApi {
    /// Creates a client over the shared gateway.
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Authenticates and returns the issued credential.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or backend rejection.
    pub fn login(&self, request: &LoginRequest) -> Result<String, ApiError> {
        let envelope: ApiEnvelope<String> = self.gateway.post("/sys/user/login", request)?;
        Ok(envelope.into_data()?)
    }

    /// Registers an account and returns the issued credential.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or backend rejection.
    pub fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let envelope: ApiEnvelope<String> = self.gateway.post("/sys/user/register", request)?;
        Ok(envelope.into_data()?)
    }

    /// Starts password recovery and returns the recovery token handle.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or backend rejection.
    pub fn forgot_password(&self, username: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "username": username });
        let envelope: ApiEnvelope<String> = self.gateway.post("/sys/user/forgot", &body)?;
        Ok(envelope.into_data()?)
    }

    /// Completes password recovery.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or backend rejection.
    pub fn reset_password(&self, request: &ResetPasswordRequest) -> Result<bool, ApiError> {
        let envelope: ApiEnvelope<bool> = self.gateway.post("/sys/user/reset", request)?;
        Ok(envelope.into_data()?)
    }

    /// Terminates the server-side session.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or backend rejection.
    pub fn logout(&self) -> Result<(), ApiError> {
        let request = OutboundRequest::new(Method::Post, "/sys/user/logout");
        let envelope: ApiEnvelope<serde_json::Value> = self.gateway.execute(request)?;
        accept(envelope)
    }

    /// Fetches the authenticated principal's profile.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or backend rejection.
    pub fn current_user(&self) -> Result<UserProfile, ApiError> {
        let envelope: ApiEnvelope<UserProfile> = self.gateway.get("/sys/user/current")?;
        Ok(envelope.into_data()?)
    }

    /// Fetches the external provider's authorize URL to start the OAuth flow.
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport failure or backend rejection
    /// (for example when the provider integration is not configured).
    pub fn github_authorize_url(&self) -> Result<String, ApiError> {
        let envelope: ApiEnvelope<String> =
            self.gateway.get("/sys/user/oauth/github/authorize")?;
        Ok(envelope.into_data()?)
    }
}

fn accept(envelope: ApiEnvelope<serde_json::Value>) -> Result<(), ApiError> {
    if envelope.is_success() {
        return Ok(());
    }

    Err(ApiError::Envelope(CoreError::Rejected {
        code: envelope.code,
        message: envelope.message,
    }))
}

/// Authentication endpoint failures.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure already classified and surfaced by the gateway.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// Application-level rejection or missing payload.
    #[error(transparent)]
    Envelope(#[from] CoreError),
}
