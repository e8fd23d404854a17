//! Program assignment: authoring blocks and moving them through their
//! lifecycle.
//!
//! Every status change that touches both the block and the athlete is one
//! atomic batch, so the block's `athleteId`/`status` and the athlete's
//! `activeBlocks`/`previousBlocks` never disagree. Schedule edits are
//! read-modify-write on the whole `weeks` array; concurrent editors race and
//! the last writer wins.

use std::collections::HashSet;

use chrono::Utc;
use liftlog_core::{BlockId, UserId};
use liftlog_store::{
    fields, get_as, query_as, to_document, Block, BlockStatus, Collection, Direction,
    DocumentStore, Exercise, FieldPath, FieldUpdate, Query, Week, WriteBatch,
};
use serde_json::Value;

use crate::error::{CoachError, Result};
use crate::lifecycle;
use crate::profile::{fetch_user, require_athlete, require_coach};
use crate::types::{validate_name, CoachConfig, CreateBlockRequest};

/// Read a block, failing if it is missing.
///
/// # Errors
///
/// Returns `CoachError::BlockNotFound` if there is no such block.
pub fn get_block<S: DocumentStore + ?Sized>(store: &S, block_id: &BlockId) -> Result<Block> {
    get_as(store, Collection::Blocks, block_id.as_str())?
        .ok_or_else(|| CoachError::BlockNotFound(block_id.clone()))
}

fn weeks_value(weeks: &[Week]) -> Result<Value> {
    serde_json::to_value(weeks).map_err(|e| CoachError::Internal(format!("encode weeks: {e}")))
}

fn block_ref(block_id: &BlockId) -> Vec<Value> {
    vec![Value::from(block_id.as_str())]
}

/// Create a block with an empty `week_count` × `sessions_per_week` grid.
///
/// When the request names an athlete, the block is pre-assigned: its
/// `athleteId` is set and the athlete's `activeBlocks` gains the ID in the
/// same batch.
///
/// # Errors
///
/// Returns `CoachError::Validation` for a layout outside the configured
/// bounds, `CoachError::InvalidTransition` for a completed initial status, or
/// an error if the coach or athlete is missing.
pub fn create_block<S: DocumentStore + ?Sized>(
    store: &S,
    config: &CoachConfig,
    coach_id: &UserId,
    request: CreateBlockRequest,
) -> Result<Block> {
    let name = validate_name("block name", &request.name)?.to_string();
    if request.sessions_per_week == 0 || request.sessions_per_week > config.max_sessions_per_week {
        return Err(CoachError::Validation(format!(
            "sessions per week must be between 1 and {}, got {}",
            config.max_sessions_per_week, request.sessions_per_week
        )));
    }
    if request.week_count == 0 || request.week_count > config.max_weeks_per_block {
        return Err(CoachError::Validation(format!(
            "week count must be between 1 and {}, got {}",
            config.max_weeks_per_block, request.week_count
        )));
    }

    let block_id = BlockId::generate();
    let status = request.status.unwrap_or(BlockStatus::Draft);
    if !lifecycle::is_valid_initial(status) {
        return Err(CoachError::InvalidTransition {
            block_id,
            from: BlockStatus::Draft,
            to: status,
        });
    }

    require_coach(store, coach_id)?;
    if let Some(athlete_id) = &request.athlete_id {
        require_athlete(store, athlete_id)?;
    }

    let now = Utc::now();
    let mut block = Block {
        id: block_id,
        name,
        coach_id: coach_id.clone(),
        athlete_id: request.athlete_id,
        status,
        sessions_per_week: request.sessions_per_week,
        weeks: (1..=request.week_count)
            .map(|n| Week::empty(n, request.sessions_per_week))
            .collect(),
        created_at: now,
        updated_at: now,
        sent_at: None,
        completed_at: None,
    };

    let mut batch = WriteBatch::new();
    batch
        .set(Collection::Blocks, &block.id, to_document(&block)?)
        .update(
            Collection::Blocks,
            &block.id,
            vec![
                FieldUpdate::server_timestamp(FieldPath::field(fields::CREATED_AT)),
                FieldUpdate::server_timestamp(FieldPath::field(fields::UPDATED_AT)),
            ],
        );
    if let Some(athlete_id) = &block.athlete_id {
        batch.update(
            Collection::Users,
            athlete_id,
            vec![FieldUpdate::array_union(
                FieldPath::field(fields::ACTIVE_BLOCKS),
                block_ref(&block.id),
            )],
        );
    }
    let info = store.commit(batch)?;

    block.created_at = info.commit_time;
    block.updated_at = info.commit_time;
    Ok(block)
}

/// Replace the exercises of one day.
///
/// Exercise names must be unique within the day, since logging addresses an
/// exercise by name.
///
/// # Errors
///
/// Returns `CoachError::Validation` for a blank or repeated exercise name,
/// `CoachError::NotAllowed` for a completed block, or a not-found error if
/// the block, week or day doesn't exist.
pub fn update_block_exercises<S: DocumentStore + ?Sized>(
    store: &S,
    block_id: &BlockId,
    week_number: u32,
    day_number: u32,
    exercises: Vec<Exercise>,
) -> Result<Block> {
    let mut seen = HashSet::with_capacity(exercises.len());
    for exercise in &exercises {
        validate_name("exercise name", &exercise.name)?;
        if !seen.insert(exercise.name.as_str()) {
            return Err(CoachError::Validation(format!(
                "exercise {:?} appears more than once on the same day",
                exercise.name
            )));
        }
    }

    let mut block = get_block(store, block_id)?;
    if lifecycle::is_terminal(block.status) {
        return Err(CoachError::NotAllowed(
            "Completed blocks cannot be edited".to_string(),
        ));
    }

    let week = block
        .weeks
        .iter_mut()
        .find(|w| w.week_number == week_number)
        .ok_or_else(|| CoachError::WeekNotFound {
            block_id: block_id.clone(),
            week_number,
        })?;
    let day = week
        .days
        .iter_mut()
        .find(|d| d.day_number == day_number)
        .ok_or_else(|| CoachError::DayNotFound {
            block_id: block_id.clone(),
            week_number,
            day_number,
        })?;
    day.exercises = exercises;

    let info = store.update(
        Collection::Blocks,
        block_id.as_str(),
        vec![
            FieldUpdate::set(FieldPath::field(fields::WEEKS), weeks_value(&block.weeks)?),
            FieldUpdate::server_timestamp(FieldPath::field(fields::UPDATED_AT)),
        ],
    )?;

    block.updated_at = info.commit_time;
    Ok(block)
}

/// Append an empty week to a block.
///
/// # Errors
///
/// Returns `CoachError::NotAllowed` for a completed block, or
/// `CoachError::Validation` if the block already has the maximum weeks.
pub fn add_week<S: DocumentStore + ?Sized>(
    store: &S,
    config: &CoachConfig,
    block_id: &BlockId,
) -> Result<Block> {
    let mut block = get_block(store, block_id)?;
    if lifecycle::is_terminal(block.status) {
        return Err(CoachError::NotAllowed(
            "Completed blocks cannot be edited".to_string(),
        ));
    }

    let next = block.weeks.iter().map(|w| w.week_number).max().unwrap_or(0) + 1;
    if next > config.max_weeks_per_block {
        return Err(CoachError::Validation(format!(
            "blocks are limited to {} weeks",
            config.max_weeks_per_block
        )));
    }
    block.weeks.push(Week::empty(next, block.sessions_per_week));

    let info = store.update(
        Collection::Blocks,
        block_id.as_str(),
        vec![
            FieldUpdate::set(FieldPath::field(fields::WEEKS), weeks_value(&block.weeks)?),
            FieldUpdate::server_timestamp(FieldPath::field(fields::UPDATED_AT)),
        ],
    )?;

    block.updated_at = info.commit_time;
    Ok(block)
}

/// Send a block to an athlete, making it active.
///
/// Re-sending an active block to its own athlete refreshes `sentAt`.
///
/// # Errors
///
/// Returns `CoachError::BlockNotFound` or `CoachError::AthleteNotFound` if
/// either is missing, `CoachError::AlreadyAssigned` if the block targets a
/// different athlete, or `CoachError::InvalidTransition` for a completed
/// block. Nothing is written on error.
pub fn send_program_to_athlete<S: DocumentStore + ?Sized>(
    store: &S,
    block_id: &BlockId,
    athlete_id: &UserId,
) -> Result<Block> {
    let mut block = get_block(store, block_id)?;
    require_athlete(store, athlete_id)?;

    if let Some(current) = block.athlete_id.as_ref().filter(|a| *a != athlete_id) {
        return Err(CoachError::AlreadyAssigned {
            subject: block_id.to_string(),
            assigned_to: current.clone(),
        });
    }
    if block.status != BlockStatus::Active {
        lifecycle::validate_transition(block_id, block.status, BlockStatus::Active)?;
    }

    let mut batch = WriteBatch::new();
    batch
        .update(
            Collection::Blocks,
            block_id,
            vec![
                FieldUpdate::set(FieldPath::field(fields::ATHLETE_ID), athlete_id.as_str()),
                FieldUpdate::set(
                    FieldPath::field(fields::STATUS),
                    BlockStatus::Active.as_str(),
                ),
                FieldUpdate::server_timestamp(FieldPath::field(fields::SENT_AT)),
                FieldUpdate::server_timestamp(FieldPath::field(fields::UPDATED_AT)),
            ],
        )
        .update(
            Collection::Users,
            athlete_id,
            vec![FieldUpdate::array_union(
                FieldPath::field(fields::ACTIVE_BLOCKS),
                block_ref(block_id),
            )],
        );
    let info = store.commit(batch)?;

    block.athlete_id = Some(athlete_id.clone());
    block.status = BlockStatus::Active;
    block.sent_at = Some(info.commit_time);
    block.updated_at = info.commit_time;
    Ok(block)
}

/// Close an active block, moving it to the athlete's previous blocks.
///
/// # Errors
///
/// Returns `CoachError::NotAssigned` if the block belongs to a different
/// athlete, or `CoachError::InvalidTransition` unless the block is active.
pub fn close_block<S: DocumentStore + ?Sized>(
    store: &S,
    block_id: &BlockId,
    athlete_id: &UserId,
) -> Result<Block> {
    let mut block = get_block(store, block_id)?;
    if block.athlete_id.as_ref() != Some(athlete_id) {
        return Err(CoachError::NotAssigned {
            block_id: block_id.clone(),
            athlete_id: athlete_id.clone(),
        });
    }
    require_athlete(store, athlete_id)?;
    lifecycle::validate_transition(block_id, block.status, BlockStatus::Completed)?;

    let mut batch = WriteBatch::new();
    batch
        .update(
            Collection::Blocks,
            block_id,
            vec![
                FieldUpdate::set(
                    FieldPath::field(fields::STATUS),
                    BlockStatus::Completed.as_str(),
                ),
                FieldUpdate::server_timestamp(FieldPath::field(fields::COMPLETED_AT)),
                FieldUpdate::server_timestamp(FieldPath::field(fields::UPDATED_AT)),
            ],
        )
        .update(
            Collection::Users,
            athlete_id,
            vec![
                FieldUpdate::array_remove(
                    FieldPath::field(fields::ACTIVE_BLOCKS),
                    block_ref(block_id),
                ),
                FieldUpdate::array_union(
                    FieldPath::field(fields::PREVIOUS_BLOCKS),
                    block_ref(block_id),
                ),
            ],
        );
    let info = store.commit(batch)?;

    block.status = BlockStatus::Completed;
    block.completed_at = Some(info.commit_time);
    block.updated_at = info.commit_time;
    Ok(block)
}

/// Delete a draft block.
///
/// A pre-assigned athlete's `activeBlocks` loses the ID in the same batch.
///
/// # Errors
///
/// Returns `CoachError::NotAllowed` unless the block is a draft.
pub fn delete_block<S: DocumentStore + ?Sized>(store: &S, block_id: &BlockId) -> Result<()> {
    let block = get_block(store, block_id)?;
    if !lifecycle::can_delete(block.status) {
        return Err(CoachError::NotAllowed(
            "Only draft blocks can be deleted".to_string(),
        ));
    }

    let mut batch = WriteBatch::new();
    batch.delete(Collection::Blocks, block_id);
    if let Some(athlete_id) = &block.athlete_id {
        if fetch_user(store, athlete_id)?.is_some() {
            batch.update(
                Collection::Users,
                athlete_id,
                vec![FieldUpdate::array_remove(
                    FieldPath::field(fields::ACTIVE_BLOCKS),
                    block_ref(block_id),
                )],
            );
        }
    }
    store.commit(batch)?;
    Ok(())
}

/// Blocks authored by a coach, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_coach_blocks<S: DocumentStore + ?Sized>(
    store: &S,
    coach_id: &UserId,
) -> Result<Vec<Block>> {
    let query = Query::new(Collection::Blocks)
        .where_eq(fields::COACH_ID, coach_id.as_str())
        .order_by(fields::CREATED_AT, Direction::Descending);
    Ok(query_as(store, &query)?)
}

/// Active blocks assigned to an athlete, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_athlete_blocks<S: DocumentStore + ?Sized>(
    store: &S,
    athlete_id: &UserId,
) -> Result<Vec<Block>> {
    let query = Query::new(Collection::Blocks)
        .where_eq(fields::ATHLETE_ID, athlete_id.as_str())
        .where_eq(fields::STATUS, BlockStatus::Active.as_str())
        .order_by(fields::CREATED_AT, Direction::Descending);
    Ok(query_as(store, &query)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{create_profile, get_user};
    use crate::types::NewProfile;
    use liftlog_store::MemoryStore;

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    fn setup() -> (MemoryStore, CoachConfig) {
        let store = MemoryStore::new();
        create_profile(&store, &uid("c1"), NewProfile::coach("Cole", "cole@example.com")).unwrap();
        create_profile(&store, &uid("a1"), NewProfile::athlete("Ana", "ana@example.com")).unwrap();
        create_profile(&store, &uid("a2"), NewProfile::athlete("Abe", "abe@example.com")).unwrap();
        let config = CoachConfig {
            max_weeks_per_block: 3,
            ..CoachConfig::default()
        };
        (store, config)
    }

    fn draft(store: &MemoryStore, config: &CoachConfig) -> Block {
        create_block(store, config, &uid("c1"), CreateBlockRequest::new("Base", 3, 1)).unwrap()
    }

    #[test]
    fn create_block_builds_grid_and_assigns() {
        let (store, config) = setup();
        let block = create_block(
            &store,
            &config,
            &uid("c1"),
            CreateBlockRequest::new("Base", 3, 1).for_athlete(uid("a1")),
        )
        .unwrap();

        assert_eq!(block.status, BlockStatus::Draft);
        assert_eq!(block.weeks.len(), 1);
        let days: Vec<_> = block.weeks[0].days.iter().map(|d| d.day_number).collect();
        assert_eq!(days, vec![1, 2, 3]);
        assert!(block.weeks[0].days.iter().all(|d| d.exercises.is_empty()));

        assert_eq!(get_block(&store, &block.id).unwrap(), block);
        let athlete = get_user(&store, &uid("a1")).unwrap();
        assert_eq!(athlete.active_blocks, vec![block.id]);
    }

    #[test]
    fn create_block_validates_layout() {
        let (store, config) = setup();
        for request in [
            CreateBlockRequest::new("Base", 0, 1),
            CreateBlockRequest::new("Base", 8, 1),
            CreateBlockRequest::new("Base", 3, 0),
            CreateBlockRequest::new("Base", 3, 4),
            CreateBlockRequest::new("  ", 3, 1),
        ] {
            assert!(matches!(
                create_block(&store, &config, &uid("c1"), request),
                Err(CoachError::Validation(_))
            ));
        }
        assert!(matches!(
            create_block(
                &store,
                &config,
                &uid("c1"),
                CreateBlockRequest::new("Base", 3, 1).with_status(BlockStatus::Completed)
            ),
            Err(CoachError::InvalidTransition { .. })
        ));
        assert_eq!(store.count(Collection::Blocks), 0);
    }

    #[test]
    fn create_block_requires_existing_athlete() {
        let (store, config) = setup();
        let result = create_block(
            &store,
            &config,
            &uid("c1"),
            CreateBlockRequest::new("Base", 3, 1).for_athlete(uid("ghost")),
        );
        assert!(matches!(result, Err(CoachError::AthleteNotFound(_))));
        assert_eq!(store.count(Collection::Blocks), 0);
    }

    #[test]
    fn update_exercises_replaces_day() {
        let (store, config) = setup();
        let block = draft(&store, &config);

        update_block_exercises(
            &store,
            &block.id,
            1,
            2,
            vec![Exercise::new("Squat", ["3x5 @RPE7"])],
        )
        .unwrap();
        let updated = update_block_exercises(
            &store,
            &block.id,
            1,
            2,
            vec![Exercise::new("Bench", ["5x5"]), Exercise::new("Row", ["3x10"])],
        )
        .unwrap();

        let stored = get_block(&store, &block.id).unwrap();
        assert_eq!(stored, updated);
        let names: Vec<_> = stored.weeks[0].days[1]
            .exercises
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bench", "Row"]);
        assert!(stored.weeks[0].days[0].exercises.is_empty());
    }

    #[test]
    fn update_exercises_rejects_repeated_name() {
        let (store, config) = setup();
        let block = draft(&store, &config);

        let result = update_block_exercises(
            &store,
            &block.id,
            1,
            1,
            vec![
                Exercise::new("Squat", ["1x1"]),
                Exercise::new("Squat", ["3x5", "1x8"]),
            ],
        );
        assert!(matches!(result, Err(CoachError::Validation(_))));
        assert!(get_block(&store, &block.id).unwrap().weeks[0].days[0]
            .exercises
            .is_empty());

        // The same name on different days is fine.
        update_block_exercises(&store, &block.id, 1, 1, vec![Exercise::new("Squat", ["1x1"])])
            .unwrap();
        update_block_exercises(&store, &block.id, 1, 2, vec![Exercise::new("Squat", ["3x5"])])
            .unwrap();
    }

    #[test]
    fn update_exercises_missing_slot() {
        let (store, config) = setup();
        let block = draft(&store, &config);

        assert!(matches!(
            update_block_exercises(&store, &block.id, 2, 1, vec![]),
            Err(CoachError::WeekNotFound { week_number: 2, .. })
        ));
        assert!(matches!(
            update_block_exercises(&store, &block.id, 1, 4, vec![]),
            Err(CoachError::DayNotFound { day_number: 4, .. })
        ));
        let missing = BlockId::new("missing").unwrap();
        assert!(matches!(
            update_block_exercises(&store, &missing, 1, 1, vec![]),
            Err(CoachError::BlockNotFound(_))
        ));
    }

    #[test]
    fn add_week_appends_until_limit() {
        let (store, config) = setup();
        let block = draft(&store, &config);

        let block_2 = add_week(&store, &config, &block.id).unwrap();
        assert_eq!(block_2.weeks.len(), 2);
        assert_eq!(block_2.weeks[1].week_number, 2);
        assert_eq!(block_2.weeks[1].days.len(), 3);

        add_week(&store, &config, &block.id).unwrap();
        assert!(matches!(
            add_week(&store, &config, &block.id),
            Err(CoachError::Validation(_))
        ));
        assert_eq!(get_block(&store, &block.id).unwrap().weeks.len(), 3);
    }

    #[test]
    fn send_program_activates_and_assigns() {
        let (store, config) = setup();
        let block = draft(&store, &config);

        let sent = send_program_to_athlete(&store, &block.id, &uid("a1")).unwrap();
        assert_eq!(sent.status, BlockStatus::Active);
        assert!(sent.sent_at.is_some());

        let stored = get_block(&store, &block.id).unwrap();
        assert_eq!(stored.athlete_id, Some(uid("a1")));
        assert_eq!(stored.status, BlockStatus::Active);
        assert_eq!(stored.sent_at, sent.sent_at);
        let athlete = get_user(&store, &uid("a1")).unwrap();
        assert!(athlete.active_blocks.contains(&block.id));
    }

    #[test]
    fn send_program_failure_applies_nothing() {
        let (store, config) = setup();
        let block = draft(&store, &config);
        store.fail_next_commits(1);

        let result = send_program_to_athlete(&store, &block.id, &uid("a1"));
        assert!(matches!(result, Err(CoachError::Store(_))));

        let stored = get_block(&store, &block.id).unwrap();
        assert_eq!(stored.status, BlockStatus::Draft);
        assert!(stored.athlete_id.is_none());
        assert!(get_user(&store, &uid("a1")).unwrap().active_blocks.is_empty());
    }

    #[test]
    fn send_program_prechecks() {
        let (store, config) = setup();
        let block = draft(&store, &config);

        let missing = BlockId::new("missing").unwrap();
        let err = send_program_to_athlete(&store, &missing, &uid("a1")).unwrap_err();
        assert_eq!(err.to_string(), "Block not found: missing");

        let err = send_program_to_athlete(&store, &block.id, &uid("ghost")).unwrap_err();
        assert_eq!(err.to_string(), "Athlete not found: ghost");
    }

    #[test]
    fn send_program_never_reassigns() {
        let (store, config) = setup();
        let block = draft(&store, &config);
        send_program_to_athlete(&store, &block.id, &uid("a1")).unwrap();

        assert!(matches!(
            send_program_to_athlete(&store, &block.id, &uid("a2")),
            Err(CoachError::AlreadyAssigned { .. })
        ));
        assert!(get_user(&store, &uid("a2")).unwrap().active_blocks.is_empty());

        // Re-sending to the same athlete is allowed.
        send_program_to_athlete(&store, &block.id, &uid("a1")).unwrap();
        assert_eq!(get_user(&store, &uid("a1")).unwrap().active_blocks.len(), 1);
    }

    #[test]
    fn close_block_moves_to_previous() {
        let (store, config) = setup();
        let block = draft(&store, &config);
        send_program_to_athlete(&store, &block.id, &uid("a1")).unwrap();

        let closed = close_block(&store, &block.id, &uid("a1")).unwrap();
        assert_eq!(closed.status, BlockStatus::Completed);
        assert!(closed.completed_at.is_some());

        let athlete = get_user(&store, &uid("a1")).unwrap();
        assert!(!athlete.active_blocks.contains(&block.id));
        assert!(athlete.previous_blocks.contains(&block.id));
        assert_eq!(
            get_block(&store, &block.id).unwrap().status,
            BlockStatus::Completed
        );
    }

    #[test]
    fn close_block_failure_applies_nothing() {
        let (store, config) = setup();
        let block = draft(&store, &config);
        send_program_to_athlete(&store, &block.id, &uid("a1")).unwrap();
        store.fail_writes_to(Collection::Users, "a1");

        assert!(close_block(&store, &block.id, &uid("a1")).is_err());
        store.clear_faults();

        assert_eq!(get_block(&store, &block.id).unwrap().status, BlockStatus::Active);
        let athlete = get_user(&store, &uid("a1")).unwrap();
        assert!(athlete.active_blocks.contains(&block.id));
        assert!(athlete.previous_blocks.is_empty());
    }

    #[test]
    fn close_block_requires_active_and_owner() {
        let (store, config) = setup();
        let block = create_block(
            &store,
            &config,
            &uid("c1"),
            CreateBlockRequest::new("Base", 3, 1).for_athlete(uid("a1")),
        )
        .unwrap();

        // Draft cannot skip Active.
        assert!(matches!(
            close_block(&store, &block.id, &uid("a1")),
            Err(CoachError::InvalidTransition {
                from: BlockStatus::Draft,
                to: BlockStatus::Completed,
                ..
            })
        ));
        assert!(matches!(
            close_block(&store, &block.id, &uid("a2")),
            Err(CoachError::NotAssigned { .. })
        ));

        send_program_to_athlete(&store, &block.id, &uid("a1")).unwrap();
        close_block(&store, &block.id, &uid("a1")).unwrap();

        // Completed is terminal.
        assert!(matches!(
            close_block(&store, &block.id, &uid("a1")),
            Err(CoachError::InvalidTransition { .. })
        ));
        assert!(matches!(
            send_program_to_athlete(&store, &block.id, &uid("a1")),
            Err(CoachError::InvalidTransition { .. })
        ));
        assert!(matches!(
            update_block_exercises(&store, &block.id, 1, 1, vec![]),
            Err(CoachError::NotAllowed(_))
        ));
    }

    #[test]
    fn delete_only_drafts() {
        let (store, config) = setup();
        let block = draft(&store, &config);
        send_program_to_athlete(&store, &block.id, &uid("a1")).unwrap();

        let err = delete_block(&store, &block.id).unwrap_err();
        assert!(matches!(err, CoachError::NotAllowed(_)));
        assert_eq!(err.to_string(), "Only draft blocks can be deleted");
        assert!(get_block(&store, &block.id).is_ok());
    }

    #[test]
    fn delete_draft_clears_preassignment() {
        let (store, config) = setup();
        let block = create_block(
            &store,
            &config,
            &uid("c1"),
            CreateBlockRequest::new("Base", 3, 1).for_athlete(uid("a1")),
        )
        .unwrap();

        delete_block(&store, &block.id).unwrap();

        assert!(matches!(
            get_block(&store, &block.id),
            Err(CoachError::BlockNotFound(_))
        ));
        assert!(get_user(&store, &uid("a1")).unwrap().active_blocks.is_empty());
    }

    #[test]
    fn block_listings() {
        let (store, config) = setup();
        let first = draft(&store, &config);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = draft(&store, &config);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let third = draft(&store, &config);
        send_program_to_athlete(&store, &first.id, &uid("a1")).unwrap();
        send_program_to_athlete(&store, &third.id, &uid("a1")).unwrap();

        let coach_ids: Vec<_> = get_coach_blocks(&store, &uid("c1"))
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(coach_ids, vec![third.id.clone(), second.id, first.id.clone()]);

        close_block(&store, &first.id, &uid("a1")).unwrap();
        let athlete_ids: Vec<_> = get_athlete_blocks(&store, &uid("a1"))
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(athlete_ids, vec![third.id]);
    }
}
