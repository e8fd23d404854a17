//! User profiles and sign-in.
//!
//! A profile document is written once at signup and afterwards only mutated
//! by the other protocols. The lookups here are shared by every module that
//! needs to check a user exists and has the right role.

use liftlog_auth::{AuthSession, Credentials, IdentityProvider};
use liftlog_core::UserId;
use liftlog_store::{
    fields, get_as, to_document, Collection, DocumentStore, FieldPath, FieldUpdate, Role, User,
    WriteBatch,
};

use crate::error::{CoachError, Result};
use crate::types::{validate_name, NewProfile};

/// Read a user profile.
pub(crate) fn fetch_user<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: &UserId,
) -> Result<Option<User>> {
    Ok(get_as(store, Collection::Users, user_id.as_str())?)
}

/// Read a user profile, failing if it is missing.
///
/// # Errors
///
/// Returns `CoachError::UserNotFound` if there is no profile.
pub fn get_user<S: DocumentStore + ?Sized>(store: &S, user_id: &UserId) -> Result<User> {
    fetch_user(store, user_id)?.ok_or_else(|| CoachError::UserNotFound(user_id.clone()))
}

/// Read a coach profile.
pub(crate) fn require_coach<S: DocumentStore + ?Sized>(store: &S, coach_id: &UserId) -> Result<User> {
    let user = get_user(store, coach_id)?;
    require_role(&user, Role::Coach)?;
    Ok(user)
}

/// Read an athlete profile.
pub(crate) fn require_athlete<S: DocumentStore + ?Sized>(
    store: &S,
    athlete_id: &UserId,
) -> Result<User> {
    let user = fetch_user(store, athlete_id)?
        .ok_or_else(|| CoachError::AthleteNotFound(athlete_id.clone()))?;
    require_role(&user, Role::Athlete)?;
    Ok(user)
}

fn require_role(user: &User, expected: Role) -> Result<()> {
    if user.role != expected {
        return Err(CoachError::WrongRole {
            user_id: user.id.clone(),
            expected,
        });
    }
    Ok(())
}

/// Write the profile for a newly signed-up user.
///
/// Relationship sets start empty and athletes start unlinked.
///
/// # Errors
///
/// Returns `CoachError::Validation` for a blank name or malformed email, and
/// `CoachError::NotAllowed` if the user already has a profile.
pub fn create_profile<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: &UserId,
    profile: NewProfile,
) -> Result<User> {
    let display_name = validate_name("display name", &profile.display_name)?.to_string();
    liftlog_auth::validate_email(&profile.email)
        .map_err(|_| CoachError::Validation(format!("invalid email address: {}", profile.email)))?;

    if fetch_user(store, user_id)?.is_some() {
        return Err(CoachError::NotAllowed(format!(
            "profile already exists for {user_id}"
        )));
    }

    let mut user = User {
        id: user_id.clone(),
        role: profile.role,
        display_name,
        email: profile.email.trim().to_string(),
        username: profile.username,
        coach_id: None,
        status: None,
        athletes: Vec::new(),
        active_blocks: Vec::new(),
        previous_blocks: Vec::new(),
        workout_logs: Vec::new(),
        has_entered_max_lifts: false,
        created_at: None,
    };

    let mut batch = WriteBatch::new();
    batch
        .set(Collection::Users, user_id, to_document(&user)?)
        .update(
            Collection::Users,
            user_id,
            vec![FieldUpdate::server_timestamp(FieldPath::field(
                fields::CREATED_AT,
            ))],
        );
    let info = store.commit(batch)?;

    user.created_at = Some(info.commit_time);
    Ok(user)
}

/// Sign in and load the signed-in user's profile.
///
/// # Errors
///
/// Returns `CoachError::Auth` if the provider rejects the credential, or
/// `CoachError::UserNotFound` if the account has no profile yet.
pub async fn sign_in<S, P>(
    store: &S,
    provider: &P,
    credentials: &Credentials,
) -> Result<(AuthSession, User)>
where
    S: DocumentStore + ?Sized,
    P: IdentityProvider + ?Sized,
{
    let session = provider.sign_in(credentials).await?;
    let user = get_user(store, &session.user_id)?;
    Ok((session, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_auth::{AuthError, MockIdentityProvider};
    use liftlog_store::MemoryStore;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    fn create_and_read_profile() {
        let store = MemoryStore::new();
        let user = create_profile(
            &store,
            &uid("a1"),
            NewProfile::athlete("  Ana  ", "ana@example.com"),
        )
        .unwrap();

        assert_eq!(user.display_name, "Ana");
        assert!(user.created_at.is_some());

        let stored = get_user(&store, &uid("a1")).unwrap();
        assert_eq!(stored, user);
        assert!(stored.active_blocks.is_empty());
        assert!(stored.coach_id.is_none());
    }

    #[test]
    fn duplicate_profile_rejected() {
        let store = MemoryStore::new();
        create_profile(&store, &uid("c1"), NewProfile::coach("Cole", "cole@example.com")).unwrap();

        let result = create_profile(&store, &uid("c1"), NewProfile::coach("Cole", "cole@example.com"));
        assert!(matches!(result, Err(CoachError::NotAllowed(_))));
    }

    #[test]
    fn malformed_profile_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(
            create_profile(&store, &uid("c1"), NewProfile::coach("Cole", "cole")),
            Err(CoachError::Validation(_))
        ));
        assert!(matches!(
            create_profile(&store, &uid("c1"), NewProfile::coach(" ", "cole@example.com")),
            Err(CoachError::Validation(_))
        ));
        assert_eq!(store.count(Collection::Users), 0);
    }

    #[test]
    fn role_checks() {
        let store = MemoryStore::new();
        create_profile(&store, &uid("c1"), NewProfile::coach("Cole", "cole@example.com")).unwrap();

        assert!(require_coach(&store, &uid("c1")).is_ok());
        assert!(matches!(
            require_athlete(&store, &uid("c1")),
            Err(CoachError::WrongRole {
                expected: Role::Athlete,
                ..
            })
        ));
        assert!(matches!(
            require_athlete(&store, &uid("ghost")),
            Err(CoachError::AthleteNotFound(_))
        ));
        assert!(matches!(
            get_user(&store, &uid("ghost")),
            Err(CoachError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn sign_in_loads_profile() {
        let store = MemoryStore::new();
        create_profile(&store, &uid("c1"), NewProfile::coach("Cole", "cole@example.com")).unwrap();
        let provider =
            MockIdentityProvider::new().with_account("cole@example.com", "pw", uid("c1"));

        let (session, user) = sign_in(&store, &provider, &Credentials::new("cole@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(user.role, Role::Coach);

        let result = sign_in(&store, &provider, &Credentials::new("cole@example.com", "bad")).await;
        assert!(matches!(result, Err(CoachError::Auth(AuthError::WrongPassword))));
    }

    #[tokio::test]
    async fn sign_in_without_profile() {
        let store = MemoryStore::new();
        let provider =
            MockIdentityProvider::new().with_account("new@example.com", "pw", uid("n1"));

        let result = sign_in(&store, &provider, &Credentials::new("new@example.com", "pw")).await;
        assert!(matches!(result, Err(CoachError::UserNotFound(_))));
    }
}
