//! Max-lift analytics.
//!
//! The `analytics` document for a user holds the latest one-rep max per lift
//! and an append-only progression for each lift. It is keyed by user ID.

use chrono::Utc;
use liftlog_core::UserId;
use liftlog_store::{
    fields, get_as, to_document, Collection, CurrentMaxes, DocumentStore, FieldPath, FieldUpdate,
    Lift, LiftRecord, MaxLifts, WriteBatch,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{CoachError, Result};
use crate::profile::get_user;
use crate::types::{validate_weight, MaxLiftsInput};

fn encode<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| CoachError::Internal(format!("encode max lifts: {e}")))
}

fn set_current(maxes: &mut CurrentMaxes, lift: Lift, record: LiftRecord) {
    match lift {
        Lift::Squat => maxes.squat = Some(record),
        Lift::Bench => maxes.bench = Some(record),
        Lift::Deadlift => maxes.deadlift = Some(record),
    }
}

fn push_progression(max_lifts: &mut MaxLifts, lift: Lift, record: LiftRecord) {
    match lift {
        Lift::Squat => max_lifts.squat_progression.push(record),
        Lift::Bench => max_lifts.bench_progression.push(record),
        Lift::Deadlift => max_lifts.deadlift_progression.push(record),
    }
}

/// Record a max-lift submission.
///
/// The first submission creates the analytics document. Later ones overwrite
/// the submitted lifts in `currentMaxes` and append to their progressions.
/// The user's `hasEnteredMaxLifts` flag is set in the same batch.
///
/// # Errors
///
/// Returns `CoachError::Validation` if no lift is given or a weight is
/// invalid, or `CoachError::UserNotFound` if the user has no profile.
pub fn submit_max_lifts<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: &UserId,
    input: MaxLiftsInput,
) -> Result<MaxLifts> {
    let mut submitted = input.entries().peekable();
    if submitted.peek().is_none() {
        return Err(CoachError::Validation(
            "at least one lift is required".to_string(),
        ));
    }
    for (_, weight) in input.entries() {
        validate_weight(weight)?;
    }
    get_user(store, user_id)?;

    let now = Utc::now();
    let existing: Option<MaxLifts> = get_as(store, Collection::Analytics, user_id.as_str())?;
    let mut batch = WriteBatch::new();

    let max_lifts = match existing {
        None => {
            let mut max_lifts = MaxLifts {
                user_id: user_id.clone(),
                current_maxes: CurrentMaxes::default(),
                squat_progression: Vec::new(),
                bench_progression: Vec::new(),
                deadlift_progression: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            for (lift, weight) in submitted {
                let record = LiftRecord {
                    weight,
                    timestamp: now,
                };
                set_current(&mut max_lifts.current_maxes, lift, record);
                push_progression(&mut max_lifts, lift, record);
            }
            batch.set(Collection::Analytics, user_id, to_document(&max_lifts)?);
            max_lifts
        }
        Some(mut max_lifts) => {
            let mut updates = Vec::new();
            for (lift, weight) in submitted {
                let record = LiftRecord {
                    weight,
                    timestamp: now,
                };
                let value = encode(&record)?;
                updates.push(FieldUpdate::set(
                    FieldPath::field(fields::CURRENT_MAXES).key(lift.as_str()),
                    value.clone(),
                ));
                updates.push(FieldUpdate::array_append(
                    FieldPath::field(lift.progression_field()),
                    vec![value],
                ));
                set_current(&mut max_lifts.current_maxes, lift, record);
                push_progression(&mut max_lifts, lift, record);
            }
            updates.push(FieldUpdate::set(
                FieldPath::field(fields::UPDATED_AT),
                encode(&now)?,
            ));
            max_lifts.updated_at = now;
            batch.update(Collection::Analytics, user_id, updates);
            max_lifts
        }
    };

    batch.update(
        Collection::Users,
        user_id,
        vec![FieldUpdate::set(
            FieldPath::field(fields::HAS_ENTERED_MAX_LIFTS),
            true,
        )],
    );
    store.commit(batch)?;

    Ok(max_lifts)
}

/// Read a user's max-lift analytics, if any have been submitted.
///
/// # Errors
///
/// Returns an error if the read fails.
pub fn get_max_lifts<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: &UserId,
) -> Result<Option<MaxLifts>> {
    Ok(get_as(store, Collection::Analytics, user_id.as_str())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::create_profile;
    use crate::types::NewProfile;
    use liftlog_store::MemoryStore;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn setup() -> MemoryStore {
        let store = MemoryStore::new();
        create_profile(&store, &uid("a1"), NewProfile::athlete("Ana", "ana@example.com")).unwrap();
        store
    }

    #[test]
    fn first_submission_creates_document() {
        let store = setup();
        assert!(get_max_lifts(&store, &uid("a1")).unwrap().is_none());

        let max_lifts =
            submit_max_lifts(&store, &uid("a1"), MaxLiftsInput::all(180.0, 120.0, 220.0)).unwrap();
        assert_eq!(max_lifts.current_maxes.get(Lift::Bench).unwrap().weight, 120.0);
        assert_eq!(max_lifts.progression(Lift::Squat).len(), 1);

        let stored = get_max_lifts(&store, &uid("a1")).unwrap().unwrap();
        assert_eq!(stored, max_lifts);
        assert!(get_user(&store, &uid("a1")).unwrap().has_entered_max_lifts);
    }

    #[test]
    fn later_submissions_append_progressions() {
        let store = setup();
        submit_max_lifts(&store, &uid("a1"), MaxLiftsInput::all(180.0, 120.0, 220.0)).unwrap();
        let returned = submit_max_lifts(
            &store,
            &uid("a1"),
            MaxLiftsInput {
                squat: Some(190.0),
                ..MaxLiftsInput::default()
            },
        )
        .unwrap();

        let stored = get_max_lifts(&store, &uid("a1")).unwrap().unwrap();
        assert_eq!(stored, returned);

        let squats: Vec<f64> = stored
            .progression(Lift::Squat)
            .iter()
            .map(|r| r.weight)
            .collect();
        assert_eq!(squats, vec![180.0, 190.0]);
        assert_eq!(stored.current_maxes.get(Lift::Squat).unwrap().weight, 190.0);
        // Lifts left out keep their previous value.
        assert_eq!(stored.current_maxes.get(Lift::Bench).unwrap().weight, 120.0);
        assert_eq!(stored.progression(Lift::Bench).len(), 1);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[test]
    fn repeated_weights_each_get_an_entry() {
        let store = setup();
        for _ in 0..3 {
            submit_max_lifts(
                &store,
                &uid("a1"),
                MaxLiftsInput {
                    deadlift: Some(220.0),
                    ..MaxLiftsInput::default()
                },
            )
            .unwrap();
        }

        let stored = get_max_lifts(&store, &uid("a1")).unwrap().unwrap();
        let pulls: Vec<f64> = stored
            .progression(Lift::Deadlift)
            .iter()
            .map(|r| r.weight)
            .collect();
        assert_eq!(pulls, vec![220.0, 220.0, 220.0]);
    }

    #[test]
    fn submission_validation() {
        let store = setup();
        assert!(matches!(
            submit_max_lifts(&store, &uid("a1"), MaxLiftsInput::default()),
            Err(CoachError::Validation(_))
        ));
        assert!(matches!(
            submit_max_lifts(&store, &uid("a1"), MaxLiftsInput::all(180.0, -1.0, 220.0)),
            Err(CoachError::Validation(_))
        ));
        assert!(matches!(
            submit_max_lifts(&store, &uid("ghost"), MaxLiftsInput::all(1.0, 1.0, 1.0)),
            Err(CoachError::UserNotFound(_))
        ));
        assert_eq!(store.count(Collection::Analytics), 0);
        assert!(!get_user(&store, &uid("a1")).unwrap().has_entered_max_lifts);
    }
}
