//! Coaching service implementation.
//!
//! This module provides the `Coaching` trait and `CoachingService`
//! implementation that runs the roster, program, workout and analytics
//! protocols against an injected document store.

use std::sync::Arc;

use async_trait::async_trait;
use liftlog_auth::{AuthSession, Credentials, IdentityProvider};
use liftlog_core::{BlockId, UserId};
use liftlog_store::{Block, DocumentStore, Exercise, MaxLifts, RocksStore, User, WorkoutLog};

use crate::error::Result;
use crate::types::{
    CoachConfig, CreateBlockRequest, LogFilter, LogSetRequest, LogWorkoutRequest, MaxLiftsInput,
    NewProfile,
};
use crate::{analytics, profile, program, roster, workout};

/// Trait defining the coaching operations.
///
/// This trait provides the complete API for coaches and athletes.
/// Implementations handle validation, persistence and consistency between
/// the documents each operation touches.
#[async_trait]
pub trait Coaching: Send + Sync {
    // =========================================================================
    // Profiles
    // =========================================================================

    /// Write the profile for a newly signed-up user.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::NotAllowed` if the profile already exists.
    async fn create_profile(&self, user_id: &UserId, profile: NewProfile) -> Result<User>;

    /// Get a user profile.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::UserNotFound` if the user has no profile.
    async fn get_user(&self, user_id: &UserId) -> Result<User>;

    /// Sign in through the identity provider and load the user's profile.
    async fn sign_in(
        &self,
        provider: &dyn IdentityProvider,
        credentials: &Credentials,
    ) -> Result<(AuthSession, User)>;

    // =========================================================================
    // Roster Linkage
    // =========================================================================

    /// Link an athlete to a coach.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::AlreadyAssigned` if the athlete has another coach.
    async fn add_client(&self, coach_id: &UserId, athlete_id: &UserId) -> Result<User>;

    /// Unlink an athlete from a coach. Not atomic.
    async fn remove_client(&self, coach_id: &UserId, athlete_id: &UserId) -> Result<()>;

    /// List athletes linked to a coach.
    async fn list_clients(&self, coach_id: &UserId) -> Result<Vec<User>>;

    // =========================================================================
    // Program Assignment
    // =========================================================================

    /// Create a block with an empty schedule grid.
    async fn create_block(&self, coach_id: &UserId, request: CreateBlockRequest) -> Result<Block>;

    /// Get a block by ID.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::BlockNotFound` if the block doesn't exist.
    async fn get_block(&self, block_id: &BlockId) -> Result<Block>;

    /// Replace the exercises of one day of a block.
    async fn update_block_exercises(
        &self,
        block_id: &BlockId,
        week_number: u32,
        day_number: u32,
        exercises: Vec<Exercise>,
    ) -> Result<Block>;

    /// Append an empty week to a block.
    async fn add_week(&self, block_id: &BlockId) -> Result<Block>;

    /// Send a block to an athlete, activating it.
    async fn send_program_to_athlete(&self, block_id: &BlockId, athlete_id: &UserId)
        -> Result<Block>;

    /// Complete an athlete's active block.
    async fn close_block(&self, block_id: &BlockId, athlete_id: &UserId) -> Result<Block>;

    /// Delete a draft block.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::NotAllowed` unless the block is a draft.
    async fn delete_block(&self, block_id: &BlockId) -> Result<()>;

    /// List a coach's blocks, newest first.
    async fn get_coach_blocks(&self, coach_id: &UserId) -> Result<Vec<Block>>;

    /// List an athlete's active blocks, newest first.
    async fn get_athlete_blocks(&self, athlete_id: &UserId) -> Result<Vec<Block>>;

    // =========================================================================
    // Workout Logging
    // =========================================================================

    /// Log a weight against a scheme slot of a block.
    async fn log_workout_weight(
        &self,
        block_id: &BlockId,
        request: LogWorkoutRequest,
    ) -> Result<WorkoutLog>;

    /// Read an athlete's workout history, newest first.
    async fn get_workout_logs(&self, athlete_id: &UserId, filter: LogFilter)
        -> Result<Vec<WorkoutLog>>;

    /// Log a free-form set outside any block. Not atomic.
    async fn log_workout_set(&self, athlete_id: &UserId, request: LogSetRequest)
        -> Result<WorkoutLog>;

    // =========================================================================
    // Max Lifts
    // =========================================================================

    /// Record a max-lift submission.
    async fn submit_max_lifts(&self, user_id: &UserId, input: MaxLiftsInput) -> Result<MaxLifts>;

    /// Read a user's max-lift analytics.
    async fn get_max_lifts(&self, user_id: &UserId) -> Result<Option<MaxLifts>>;
}

/// The main coaching service implementation.
pub struct CoachingService<S: DocumentStore> {
    store: Arc<S>,
    config: CoachConfig,
}

impl<S: DocumentStore> CoachingService<S> {
    /// Create a new coaching service.
    #[must_use]
    pub fn new(store: Arc<S>, config: CoachConfig) -> Self {
        Self { store, config }
    }

    /// Create with default configuration.
    #[must_use]
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, CoachConfig::default())
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CoachConfig {
        &self.config
    }
}

impl CoachingService<RocksStore> {
    /// Open a service backed by the `RocksDB` store in `config.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(config: CoachConfig) -> Result<Self> {
        let store = RocksStore::open(&config.data_dir)?;
        tracing::info!(data_dir = %config.data_dir.display(), "Opened document store");
        Ok(Self::new(Arc::new(store), config))
    }
}

#[async_trait]
impl<S: DocumentStore + 'static> Coaching for CoachingService<S> {
    // =========================================================================
    // Profiles
    // =========================================================================

    async fn create_profile(&self, user_id: &UserId, new_profile: NewProfile) -> Result<User> {
        let user = profile::create_profile(self.store(), user_id, new_profile).inspect_err(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to create profile");
        })?;

        tracing::info!(user_id = %user_id, role = ?user.role, "Created profile");
        Ok(user)
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User> {
        tracing::debug!(user_id = %user_id, "Reading profile");
        profile::get_user(self.store(), user_id)
    }

    async fn sign_in(
        &self,
        provider: &dyn IdentityProvider,
        credentials: &Credentials,
    ) -> Result<(AuthSession, User)> {
        let (session, user) = profile::sign_in(self.store(), provider, credentials)
            .await
            .inspect_err(|e| {
                tracing::warn!(email = %credentials.email, error = %e, "Sign-in failed");
            })?;

        tracing::info!(user_id = %user.id, role = ?user.role, "Signed in");
        Ok((session, user))
    }

    // =========================================================================
    // Roster Linkage
    // =========================================================================

    async fn add_client(&self, coach_id: &UserId, athlete_id: &UserId) -> Result<User> {
        let athlete = roster::add_client(self.store(), coach_id, athlete_id).inspect_err(|e| {
            tracing::warn!(coach_id = %coach_id, athlete_id = %athlete_id, error = %e, "Failed to add client");
        })?;

        tracing::info!(coach_id = %coach_id, athlete_id = %athlete_id, "Added client");
        Ok(athlete)
    }

    async fn remove_client(&self, coach_id: &UserId, athlete_id: &UserId) -> Result<()> {
        roster::remove_client(self.store(), coach_id, athlete_id).inspect_err(|e| {
            tracing::warn!(coach_id = %coach_id, athlete_id = %athlete_id, error = %e, "Failed to remove client");
        })?;

        tracing::info!(coach_id = %coach_id, athlete_id = %athlete_id, "Removed client");
        Ok(())
    }

    async fn list_clients(&self, coach_id: &UserId) -> Result<Vec<User>> {
        tracing::debug!(coach_id = %coach_id, "Listing clients");
        roster::list_clients(self.store(), coach_id)
    }

    // =========================================================================
    // Program Assignment
    // =========================================================================

    async fn create_block(&self, coach_id: &UserId, request: CreateBlockRequest) -> Result<Block> {
        let block = program::create_block(self.store(), &self.config, coach_id, request)
            .inspect_err(|e| {
                tracing::warn!(coach_id = %coach_id, error = %e, "Failed to create block");
            })?;

        tracing::info!(
            block_id = %block.id,
            coach_id = %coach_id,
            name = %block.name,
            weeks = block.weeks.len(),
            "Created block"
        );
        Ok(block)
    }

    async fn get_block(&self, block_id: &BlockId) -> Result<Block> {
        tracing::debug!(block_id = %block_id, "Reading block");
        program::get_block(self.store(), block_id)
    }

    async fn update_block_exercises(
        &self,
        block_id: &BlockId,
        week_number: u32,
        day_number: u32,
        exercises: Vec<Exercise>,
    ) -> Result<Block> {
        let count = exercises.len();
        let block = program::update_block_exercises(
            self.store(),
            block_id,
            week_number,
            day_number,
            exercises,
        )
        .inspect_err(|e| {
            tracing::warn!(block_id = %block_id, week_number, day_number, error = %e, "Failed to update exercises");
        })?;

        tracing::info!(
            block_id = %block_id,
            week_number,
            day_number,
            exercises = count,
            "Updated exercises"
        );
        Ok(block)
    }

    async fn add_week(&self, block_id: &BlockId) -> Result<Block> {
        let block = program::add_week(self.store(), &self.config, block_id).inspect_err(|e| {
            tracing::warn!(block_id = %block_id, error = %e, "Failed to add week");
        })?;

        tracing::info!(block_id = %block_id, weeks = block.weeks.len(), "Added week");
        Ok(block)
    }

    async fn send_program_to_athlete(
        &self,
        block_id: &BlockId,
        athlete_id: &UserId,
    ) -> Result<Block> {
        let block = program::send_program_to_athlete(self.store(), block_id, athlete_id)
            .inspect_err(|e| {
                tracing::warn!(block_id = %block_id, athlete_id = %athlete_id, error = %e, "Failed to send block");
            })?;

        tracing::info!(block_id = %block_id, athlete_id = %athlete_id, "Sent block to athlete");
        Ok(block)
    }

    async fn close_block(&self, block_id: &BlockId, athlete_id: &UserId) -> Result<Block> {
        let block = program::close_block(self.store(), block_id, athlete_id).inspect_err(|e| {
            tracing::warn!(block_id = %block_id, athlete_id = %athlete_id, error = %e, "Failed to close block");
        })?;

        tracing::info!(block_id = %block_id, athlete_id = %athlete_id, "Closed block");
        Ok(block)
    }

    async fn delete_block(&self, block_id: &BlockId) -> Result<()> {
        program::delete_block(self.store(), block_id).inspect_err(|e| {
            tracing::warn!(block_id = %block_id, error = %e, "Failed to delete block");
        })?;

        tracing::info!(block_id = %block_id, "Deleted block");
        Ok(())
    }

    async fn get_coach_blocks(&self, coach_id: &UserId) -> Result<Vec<Block>> {
        tracing::debug!(coach_id = %coach_id, "Listing coach blocks");
        program::get_coach_blocks(self.store(), coach_id)
    }

    async fn get_athlete_blocks(&self, athlete_id: &UserId) -> Result<Vec<Block>> {
        tracing::debug!(athlete_id = %athlete_id, "Listing athlete blocks");
        program::get_athlete_blocks(self.store(), athlete_id)
    }

    // =========================================================================
    // Workout Logging
    // =========================================================================

    async fn log_workout_weight(
        &self,
        block_id: &BlockId,
        request: LogWorkoutRequest,
    ) -> Result<WorkoutLog> {
        let athlete_id = request.athlete_id.clone();
        let log = workout::log_workout_weight(self.store(), block_id, request).inspect_err(|e| {
            tracing::warn!(block_id = %block_id, athlete_id = %athlete_id, error = %e, "Failed to log workout");
        })?;

        tracing::info!(
            log_id = %log.id,
            block_id = %block_id,
            athlete_id = %athlete_id,
            exercise = %log.exercise_name,
            weight = log.weight,
            "Logged workout"
        );
        Ok(log)
    }

    async fn get_workout_logs(
        &self,
        athlete_id: &UserId,
        filter: LogFilter,
    ) -> Result<Vec<WorkoutLog>> {
        tracing::debug!(athlete_id = %athlete_id, ?filter, "Reading workout logs");
        workout::get_workout_logs(self.store(), athlete_id, &filter)
    }

    async fn log_workout_set(
        &self,
        athlete_id: &UserId,
        request: LogSetRequest,
    ) -> Result<WorkoutLog> {
        let log = workout::log_workout_set(self.store(), athlete_id, request).inspect_err(|e| {
            tracing::warn!(athlete_id = %athlete_id, error = %e, "Failed to log set");
        })?;

        tracing::info!(
            log_id = %log.id,
            athlete_id = %athlete_id,
            exercise = %log.exercise_name,
            "Logged set"
        );
        Ok(log)
    }

    // =========================================================================
    // Max Lifts
    // =========================================================================

    async fn submit_max_lifts(&self, user_id: &UserId, input: MaxLiftsInput) -> Result<MaxLifts> {
        let max_lifts = analytics::submit_max_lifts(self.store(), user_id, input).inspect_err(|e| {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to submit max lifts");
        })?;

        tracing::info!(user_id = %user_id, "Submitted max lifts");
        Ok(max_lifts)
    }

    async fn get_max_lifts(&self, user_id: &UserId) -> Result<Option<MaxLifts>> {
        tracing::debug!(user_id = %user_id, "Reading max lifts");
        analytics::get_max_lifts(self.store(), user_id)
    }
}
