//! Roster linkage between coaches and athletes.
//!
//! A link is recorded on both sides: the coach's `athletes` set and the
//! athlete's `coachId` back-reference. Linking is one atomic batch. Removal
//! is two independent writes, so a failure between them leaves the athlete
//! still pointing at a coach that no longer lists them.

use liftlog_core::UserId;
use liftlog_store::{
    fields, query_as, Collection, DocumentStore, FieldPath, FieldUpdate, Query, User, UserStatus,
    WriteBatch,
};
use serde_json::Value;

use crate::error::{CoachError, Result};
use crate::profile::{require_athlete, require_coach};

/// Link an athlete to a coach's roster.
///
/// Returns the updated athlete profile.
///
/// # Errors
///
/// Returns an error if either user is missing or has the wrong role, or
/// `CoachError::AlreadyAssigned` if the athlete is linked to another coach.
pub fn add_client<S: DocumentStore + ?Sized>(
    store: &S,
    coach_id: &UserId,
    athlete_id: &UserId,
) -> Result<User> {
    require_coach(store, coach_id)?;
    let mut athlete = require_athlete(store, athlete_id)?;

    if let Some(current) = athlete.coach_id.as_ref().filter(|c| *c != coach_id) {
        return Err(CoachError::AlreadyAssigned {
            subject: athlete_id.to_string(),
            assigned_to: current.clone(),
        });
    }

    let mut batch = WriteBatch::new();
    batch
        .update(
            Collection::Users,
            coach_id,
            vec![FieldUpdate::array_union(
                FieldPath::field(fields::ATHLETES),
                vec![Value::from(athlete_id.as_str())],
            )],
        )
        .update(
            Collection::Users,
            athlete_id,
            vec![
                FieldUpdate::set(FieldPath::field(fields::COACH_ID), coach_id.as_str()),
                FieldUpdate::set(FieldPath::field(fields::STATUS), UserStatus::Active.as_str()),
            ],
        );
    store.commit(batch)?;

    athlete.coach_id = Some(coach_id.clone());
    athlete.status = Some(UserStatus::Active);
    Ok(athlete)
}

/// Unlink an athlete from a coach's roster.
///
/// The athlete must not be linked to a different coach. Then this first removes the athlete from the coach's `athletes`, then clears the
/// athlete's `coachId` and marks them inactive. The writes are independent:
/// if the second fails, the first stays applied and the error is returned.
///
/// # Errors
///
/// Returns `CoachError::AlreadyAssigned` if the athlete belongs to another
/// coach, a not-found error if the athlete is missing, or the store error of
/// whichever write failed.
pub fn remove_client<S: DocumentStore + ?Sized>(
    store: &S,
    coach_id: &UserId,
    athlete_id: &UserId,
) -> Result<()> {
    let athlete = require_athlete(store, athlete_id)?;
    if let Some(current) = athlete.coach_id.filter(|c| c != coach_id) {
        return Err(CoachError::AlreadyAssigned {
            subject: athlete_id.to_string(),
            assigned_to: current,
        });
    }

    store.update(
        Collection::Users,
        coach_id.as_str(),
        vec![FieldUpdate::array_remove(
            FieldPath::field(fields::ATHLETES),
            vec![Value::from(athlete_id.as_str())],
        )],
    )?;

    store
        .update(
            Collection::Users,
            athlete_id.as_str(),
            vec![
                FieldUpdate::set(FieldPath::field(fields::COACH_ID), Value::Null),
                FieldUpdate::set(
                    FieldPath::field(fields::STATUS),
                    UserStatus::Inactive.as_str(),
                ),
            ],
        )
        .inspect_err(|e| {
            tracing::warn!(
                coach_id = %coach_id,
                athlete_id = %athlete_id,
                error = %e,
                "Athlete left linked after removal from roster"
            );
        })?;

    Ok(())
}

/// Athletes currently linked to a coach, ordered by user ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_clients<S: DocumentStore + ?Sized>(store: &S, coach_id: &UserId) -> Result<Vec<User>> {
    let query = Query::new(Collection::Users)
        .where_eq(fields::ROLE, "athlete")
        .where_eq(fields::COACH_ID, coach_id.as_str());
    Ok(query_as(store, &query)?)
}
