//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No account exists for the email address.
    #[error("user not found")]
    UserNotFound,

    /// The password does not match the account.
    #[error("wrong password")]
    WrongPassword,

    /// The email address is malformed.
    #[error("invalid email")]
    InvalidEmail,

    /// Too many failed attempts; the provider is refusing sign-in for now.
    #[error("rate limited")]
    RateLimited,

    /// The provider rejected the credential with an unclassified code.
    #[error("authentication failed: {0}")]
    Unknown(String),

    /// The provider could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Classify a provider error code.
    #[must_use]
    pub fn from_provider_code(code: &str) -> Self {
        // Codes may carry a detail suffix, e.g. "TOO_MANY_ATTEMPTS_TRY_LATER : ..."
        let code = code.split(':').next().unwrap_or(code).trim();
        match code {
            "EMAIL_NOT_FOUND" | "USER_NOT_FOUND" => Self::UserNotFound,
            "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => Self::WrongPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => Self::InvalidEmail,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::RateLimited,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Returns `true` if the same request might succeed later.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::Network(_))
    }

    /// Returns `true` if the user supplied a bad credential.
    #[must_use]
    pub const fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound | Self::WrongPassword | Self::InvalidEmail
        )
    }
}
