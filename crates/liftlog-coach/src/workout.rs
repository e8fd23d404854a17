//! Workout logging.
//!
//! Logging against a block writes three documents in one batch: the new log,
//! the denormalized latest result on the scheme slot, and the athlete's
//! `workoutLogs` index. The slot is resolved against the block before the
//! batch is built, so a stale or mistyped slot is reported as a not-found
//! error instead of failing inside the store.

use chrono::Utc;
use liftlog_core::{BlockId, LogId, UserId};
use liftlog_store::{
    fields, query_as, to_document, Block, Collection, Direction, DocumentStore, FieldPath,
    FieldUpdate, Query, WorkoutLog, WriteBatch,
};
use serde_json::Value;

use crate::error::{CoachError, Result};
use crate::profile::require_athlete;
use crate::program::get_block;
use crate::types::{validate_name, validate_weight, LogFilter, LogSetRequest, LogWorkoutRequest};

/// Array positions of a scheme slot inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotIndex {
    week: usize,
    day: usize,
    scheme: usize,
}

fn locate_slot(block: &Block, request: &LogWorkoutRequest, exercise_name: &str) -> Result<SlotIndex> {
    let week = block
        .weeks
        .iter()
        .position(|w| w.week_number == request.week_number)
        .ok_or_else(|| CoachError::WeekNotFound {
            block_id: block.id.clone(),
            week_number: request.week_number,
        })?;
    let day = block.weeks[week]
        .days
        .iter()
        .position(|d| d.day_number == request.day_number)
        .ok_or_else(|| CoachError::DayNotFound {
            block_id: block.id.clone(),
            week_number: request.week_number,
            day_number: request.day_number,
        })?;
    let exercise = block.weeks[week].days[day]
        .exercises
        .iter()
        .find(|e| e.name == exercise_name)
        .ok_or_else(|| CoachError::ExerciseNotFound {
            block_id: block.id.clone(),
            name: exercise_name.to_string(),
        })?;
    if request.scheme_index >= exercise.schemes.len() {
        return Err(CoachError::SchemeNotFound {
            block_id: block.id.clone(),
            exercise: exercise_name.to_string(),
            index: request.scheme_index,
        });
    }

    Ok(SlotIndex {
        week,
        day,
        scheme: request.scheme_index,
    })
}

/// Path to a scheme slot: `weeks[w].days[d].exercises[name == X].schemes[i]`.
fn scheme_path(slot: SlotIndex, exercise_name: &str) -> FieldPath {
    FieldPath::field(fields::WEEKS)
        .index(slot.week)
        .key(fields::DAYS)
        .index(slot.day)
        .key(fields::EXERCISES)
        .element_where(fields::NAME, exercise_name)
        .key(fields::SCHEMES)
        .index(slot.scheme)
}

/// Log a weight against a scheme slot of a block.
///
/// # Errors
///
/// Returns `CoachError::Validation` for malformed input,
/// `CoachError::NotAssigned` if the block isn't the athlete's, or a not-found
/// error if the slot doesn't exist. Nothing is written on error.
pub fn log_workout_weight<S: DocumentStore + ?Sized>(
    store: &S,
    block_id: &BlockId,
    request: LogWorkoutRequest,
) -> Result<WorkoutLog> {
    validate_weight(request.weight)?;
    if request.week_number == 0 || request.day_number == 0 {
        return Err(CoachError::Validation(
            "week and day numbers start at 1".to_string(),
        ));
    }
    let exercise_name = validate_name("exercise name", &request.exercise_name)?.to_string();

    let block = get_block(store, block_id)?;
    if block.athlete_id.as_ref() != Some(&request.athlete_id) {
        return Err(CoachError::NotAssigned {
            block_id: block_id.clone(),
            athlete_id: request.athlete_id,
        });
    }
    let slot = locate_slot(&block, &request, &exercise_name)?;
    require_athlete(store, &request.athlete_id)?;

    let mut log = WorkoutLog {
        id: LogId::generate(),
        athlete_id: request.athlete_id,
        block_id: Some(block_id.clone()),
        week_number: Some(request.week_number),
        day_number: Some(request.day_number),
        exercise_name,
        scheme_index: Some(slot.scheme),
        weight: request.weight,
        reps: None,
        notes: request.notes,
        timestamp: Utc::now(),
    };
    let scheme = scheme_path(slot, &log.exercise_name);

    let mut batch = WriteBatch::new();
    batch
        .set(Collection::WorkoutLogs, &log.id, to_document(&log)?)
        .update(
            Collection::WorkoutLogs,
            &log.id,
            vec![FieldUpdate::server_timestamp(FieldPath::field(
                fields::TIMESTAMP,
            ))],
        )
        .update(
            Collection::Blocks,
            block_id,
            vec![
                FieldUpdate::set(scheme.clone().key(fields::LOGGED_WEIGHT), log.weight),
                FieldUpdate::server_timestamp(scheme.key(fields::LOGGED_AT)),
            ],
        )
        .update(
            Collection::Users,
            &log.athlete_id,
            vec![FieldUpdate::array_union(
                FieldPath::field(fields::WORKOUT_LOGS),
                vec![Value::from(log.id.as_str())],
            )],
        );
    let info = store.commit(batch)?;

    log.timestamp = info.commit_time;
    Ok(log)
}

/// An athlete's workout history, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_workout_logs<S: DocumentStore + ?Sized>(
    store: &S,
    athlete_id: &UserId,
    filter: &LogFilter,
) -> Result<Vec<WorkoutLog>> {
    let mut query =
        Query::new(Collection::WorkoutLogs).where_eq(fields::ATHLETE_ID, athlete_id.as_str());
    if let Some(block_id) = &filter.block_id {
        query = query.where_eq(fields::BLOCK_ID, block_id.as_str());
    }
    if let Some(exercise_name) = &filter.exercise_name {
        query = query.where_eq(fields::EXERCISE_NAME, exercise_name.as_str());
    }
    query = query.order_by(fields::TIMESTAMP, Direction::Descending);
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }
    Ok(query_as(store, &query)?)
}

/// Log a free-form set outside any block.
///
/// The log is inserted first and the athlete's `workoutLogs` index updated
/// second. The writes are independent: if the second fails, the log exists
/// but is not indexed on the athlete.
///
/// # Errors
///
/// Returns `CoachError::Validation` for malformed input, or the store error of
/// whichever write failed.
pub fn log_workout_set<S: DocumentStore + ?Sized>(
    store: &S,
    athlete_id: &UserId,
    request: LogSetRequest,
) -> Result<WorkoutLog> {
    validate_weight(request.weight)?;
    let exercise_name = validate_name("exercise name", &request.exercise_name)?.to_string();
    require_athlete(store, athlete_id)?;

    let mut log = WorkoutLog {
        id: LogId::generate(),
        athlete_id: athlete_id.clone(),
        block_id: None,
        week_number: None,
        day_number: None,
        exercise_name,
        scheme_index: None,
        weight: request.weight,
        reps: request.reps,
        notes: request.notes,
        timestamp: Utc::now(),
    };

    let mut batch = WriteBatch::new();
    batch
        .set(Collection::WorkoutLogs, &log.id, to_document(&log)?)
        .update(
            Collection::WorkoutLogs,
            &log.id,
            vec![FieldUpdate::server_timestamp(FieldPath::field(
                fields::TIMESTAMP,
            ))],
        );
    let info = store.commit(batch)?;
    log.timestamp = info.commit_time;

    store
        .update(
            Collection::Users,
            athlete_id.as_str(),
            vec![FieldUpdate::array_union(
                FieldPath::field(fields::WORKOUT_LOGS),
                vec![Value::from(log.id.as_str())],
            )],
        )
        .inspect_err(|e| {
            tracing::warn!(
                athlete_id = %athlete_id,
                log_id = %log.id,
                error = %e,
                "Workout log written but not indexed on athlete"
            );
        })?;

    Ok(log)
}
