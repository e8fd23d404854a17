//! In-process identity provider for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use liftlog_core::UserId;

use crate::error::{AuthError, Result};
use crate::{validate_email, AuthSession, Credentials, IdentityProvider};

/// A mock identity provider with a fixed set of accounts.
///
/// Sign-in checks the email against registered accounts and the password
/// against the stored one, producing the same error classification as the
/// real provider.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    accounts: HashMap<String, (String, UserId)>,
    session: RwLock<Option<AuthSession>>,
}

impl MockIdentityProvider {
    /// Create a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account.
    #[must_use]
    pub fn with_account(
        mut self,
        email: impl Into<String>,
        password: impl Into<String>,
        user_id: UserId,
    ) -> Self {
        self.accounts
            .insert(email.into().to_lowercase(), (password.into(), user_id));
        self
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession> {
        validate_email(&credentials.email)?;

        let email = credentials.email.trim().to_lowercase();
        let (password, user_id) = self.accounts.get(&email).ok_or(AuthError::UserNotFound)?;
        if *password != credentials.password {
            return Err(AuthError::WrongPassword);
        }

        let session = AuthSession {
            user_id: user_id.clone(),
            email,
            id_token: format!("test-token:{user_id}"),
            refresh_token: format!("test-refresh:{user_id}"),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        };
        *self.session.write() = Some(session.clone());
        Ok(session)
    }

    fn current_user(&self) -> Option<UserId> {
        self.session.read().as_ref().map(|s| s.user_id.clone())
    }

    fn sign_out(&self) {
        self.session.write().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MockIdentityProvider {
        MockIdentityProvider::new().with_account(
            "Coach@Example.com",
            "secret",
            UserId::new("coach-1").unwrap(),
        )
    }

    #[tokio::test]
    async fn mock_sign_in() {
        let provider = provider();
        let session = provider
            .sign_in(&Credentials::new("coach@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(session.user_id.as_str(), "coach-1");
        assert_eq!(provider.current_user(), Some(session.user_id));
    }

    #[tokio::test]
    async fn mock_classifies_errors() {
        let provider = provider();
        assert!(matches!(
            provider
                .sign_in(&Credentials::new("other@example.com", "secret"))
                .await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            provider
                .sign_in(&Credentials::new("coach@example.com", "nope"))
                .await,
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            provider.sign_in(&Credentials::new("coach", "secret")).await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(provider.current_user().is_none());
    }

    #[tokio::test]
    async fn mock_sign_out() {
        let provider = provider();
        provider
            .sign_in(&Credentials::new("coach@example.com", "secret"))
            .await
            .unwrap();
        provider.sign_out();
        assert!(provider.current_user().is_none());
    }
}
