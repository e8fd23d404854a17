//! HTTP identity provider client.
//!
//! This module signs users in against the provider's password sign-in REST
//! endpoint and keeps the resulting session as the current one.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use liftlog_core::UserId;

use crate::error::{AuthError, Result};
use crate::{validate_email, AuthConfig, AuthSession, Credentials, IdentityProvider};

/// Request payload for email/password sign-in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Raw response from the sign-in endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    refresh_token: String,
    /// Seconds until the ID token expires, as a decimal string.
    expires_in: String,
}

/// Error envelope returned by the provider.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity provider backed by the password sign-in REST API.
pub struct HttpIdentityProvider {
    config: AuthConfig,
    client: reqwest::Client,
    session: RwLock<Option<AuthSession>>,
}

impl HttpIdentityProvider {
    /// Create a new provider client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the HTTP client cannot be created.
    pub fn new(config: AuthConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AuthError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            session: RwLock::new(None),
        })
    }

    /// The current session, if signed in.
    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.session.read().clone()
    }

    /// Handle the HTTP response and convert to an `AuthSession`.
    async fn handle_response(response: reqwest::Response) -> Result<AuthSession> {
        let status = response.status();

        if status.is_success() {
            let raw: RawSignInResponse = response
                .json()
                .await
                .map_err(|e| AuthError::Internal(format!("invalid response: {e}")))?;

            let user_id = UserId::new(raw.local_id)
                .map_err(|e| AuthError::Internal(format!("invalid localId in response: {e}")))?;

            let expires_at = raw
                .expires_in
                .parse::<i64>()
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl))
                .ok_or_else(|| {
                    AuthError::Internal(format!(
                        "invalid expiresIn in response: {:?}",
                        raw.expires_in
                    ))
                })?;

            return Ok(AuthSession {
                user_id,
                email: raw.email,
                id_token: raw.id_token,
                refresh_token: raw.refresh_token,
                expires_at,
            });
        }

        // Try to parse error response
        let envelope: Option<ErrorEnvelope> = response.json().await.ok();

        match envelope {
            Some(envelope) => Err(AuthError::from_provider_code(&envelope.error.message)),
            None => match status.as_u16() {
                429 => Err(AuthError::RateLimited),
                _ => Err(AuthError::Unknown(format!("HTTP {status}"))),
            },
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        validate_email(&credentials.email)?;

        let request = SignInRequest {
            email: credentials.email.trim(),
            password: &credentials.password,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(self.config.sign_in_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let session = Self::handle_response(response).await.inspect_err(|e| {
            tracing::warn!(email = %credentials.email, error = %e, "Sign-in failed");
        })?;

        tracing::info!(user_id = %session.user_id, "Signed in");
        *self.session.write() = Some(session.clone());

        Ok(session)
    }

    fn current_user(&self) -> Option<UserId> {
        self.session.read().as_ref().map(|s| s.user_id.clone())
    }

    fn sign_out(&self) {
        if let Some(session) = self.session.write().take() {
            tracing::info!(user_id = %session.user_id, "Signed out");
        }
    }
}
