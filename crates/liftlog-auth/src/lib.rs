//! Identity provider client for liftlog.
//!
//! This crate authenticates coaches and athletes against a hosted identity
//! provider and yields the stable [`UserId`] every other crate keys on:
//!
//! - Email/password sign-in over the provider's REST API
//! - Classification of provider errors into user-facing categories
//! - The current session, held until sign-out
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────────┐
//! │   Application    │────▶│  IdentityProvider    │
//! │                  │     │  (trait)             │
//! └──────────────────┘     └──────────┬───────────┘
//!                                     │
//!                          ┌──────────▼───────────┐
//!                          │ HttpIdentityProvider │
//!                          │ (impl)               │
//!                          └──────────┬───────────┘
//!                                     │ HTTPS
//!                          ┌──────────▼───────────┐
//!                          │  signInWithPassword  │
//!                          └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use liftlog_auth::{AuthConfig, Credentials, HttpIdentityProvider, IdentityProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = HttpIdentityProvider::new(AuthConfig::from_env())?;
//!
//! let session = provider
//!     .sign_in(&Credentials::new("coach@example.com", "hunter2"))
//!     .await?;
//!
//! assert_eq!(provider.current_user(), Some(session.user_id));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use liftlog_core::UserId;

pub use client::HttpIdentityProvider;
pub use error::{AuthError, Result};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockIdentityProvider;

/// Configuration for the identity provider.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the provider's REST API.
    pub base_url: String,
    /// Project API key, sent as the `key` query parameter.
    pub api_key: String,
    /// Per-request timeout, in seconds.
    pub request_timeout_seconds: u64,
}

impl AuthConfig {
    /// Load configuration from `LIFTLOG_AUTH_URL` and `LIFTLOG_AUTH_API_KEY`,
    /// falling back to defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("LIFTLOG_AUTH_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("LIFTLOG_AUTH_API_KEY").unwrap_or(defaults.api_key),
            request_timeout_seconds: defaults.request_timeout_seconds,
        }
    }

    /// Get the password sign-in endpoint URL (without the API key).
    #[must_use]
    pub fn sign_in_url(&self) -> String {
        format!(
            "{}/v1/accounts:signInWithPassword",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "https://identitytoolkit.googleapis.com".to_string(),
            api_key: String::new(),
            request_timeout_seconds: 30,
        }
    }
}

/// An email/password credential.
#[derive(Clone)]
pub struct Credentials {
    /// Account email address.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Create a credential.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A signed-in session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Email the user signed in with.
    pub email: String,
    /// Provider-issued ID token.
    pub id_token: String,
    /// Token for obtaining new ID tokens.
    pub refresh_token: String,
    /// When the ID token expires.
    pub expires_at: DateTime<Utc>,
}

/// Trait for authenticating users.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with an email and password and make the session current.
    ///
    /// # Errors
    ///
    /// Returns a classified [`AuthError`] if the provider rejects the credential.
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession>;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<UserId>;

    /// Forget the current session.
    fn sign_out(&self);
}

/// Reject email addresses that cannot possibly be valid before contacting the
/// provider.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` if the address is malformed.
pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(AuthError::InvalidEmail);
    }
    Ok(())
}
