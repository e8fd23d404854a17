//! Request types and configuration for coaching operations.
//!
//! These types define the inputs of the roster, program, workout and
//! analytics operations.

use std::path::PathBuf;

use liftlog_core::{BlockId, UserId};
use liftlog_store::{BlockStatus, Lift, Role};
use serde::{Deserialize, Serialize};

use crate::error::{CoachError, Result};

/// Request to create a new block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlockRequest {
    /// Human-readable name for the block.
    pub name: String,
    /// Number of training days in each week.
    pub sessions_per_week: u32,
    /// Number of weeks to lay out.
    #[serde(default = "CreateBlockRequest::default_week_count")]
    pub week_count: u32,
    /// Initial status. Defaults to draft.
    #[serde(default)]
    pub status: Option<BlockStatus>,
    /// Athlete to pre-assign the block to.
    #[serde(default)]
    pub athlete_id: Option<UserId>,
}

impl CreateBlockRequest {
    const fn default_week_count() -> u32 {
        1
    }

    /// Create a draft request with the given layout.
    #[must_use]
    pub fn new(name: impl Into<String>, sessions_per_week: u32, week_count: u32) -> Self {
        Self {
            name: name.into(),
            sessions_per_week,
            week_count,
            status: None,
            athlete_id: None,
        }
    }

    /// Pre-assign the block to an athlete.
    #[must_use]
    pub fn for_athlete(mut self, athlete_id: UserId) -> Self {
        self.athlete_id = Some(athlete_id);
        self
    }

    /// Create the block in a specific status.
    #[must_use]
    pub const fn with_status(mut self, status: BlockStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Request to log a weight against a scheme slot of a block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogWorkoutRequest {
    /// Athlete logging the result.
    pub athlete_id: UserId,
    /// 1-based week number.
    pub week_number: u32,
    /// 1-based day number.
    pub day_number: u32,
    /// Exercise name within the day.
    pub exercise_name: String,
    /// Scheme slot within the exercise.
    pub scheme_index: usize,
    /// Weight lifted.
    pub weight: f64,
    /// Athlete notes.
    #[serde(default)]
    pub notes: String,
}

/// Request to log a free-form set outside any block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSetRequest {
    /// Exercise performed.
    pub exercise_name: String,
    /// Weight lifted.
    pub weight: f64,
    /// Repetitions performed.
    #[serde(default)]
    pub reps: Option<u32>,
    /// Athlete notes.
    #[serde(default)]
    pub notes: String,
}

/// Filters for reading an athlete's workout history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    /// Only logs for this block.
    #[serde(default)]
    pub block_id: Option<BlockId>,
    /// Only logs for this exercise.
    #[serde(default)]
    pub exercise_name: Option<String>,
    /// Return at most this many logs.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LogFilter {
    /// Only logs for `block_id`.
    #[must_use]
    pub fn block(mut self, block_id: BlockId) -> Self {
        self.block_id = Some(block_id);
        self
    }

    /// Only logs for `exercise_name`.
    #[must_use]
    pub fn exercise(mut self, exercise_name: impl Into<String>) -> Self {
        self.exercise_name = Some(exercise_name.into());
        self
    }

    /// Return at most `limit` logs.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A max-lift submission. Lifts left out keep their previous value.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MaxLiftsInput {
    /// Back squat one-rep max.
    #[serde(default)]
    pub squat: Option<f64>,
    /// Bench press one-rep max.
    #[serde(default)]
    pub bench: Option<f64>,
    /// Deadlift one-rep max.
    #[serde(default)]
    pub deadlift: Option<f64>,
}

impl MaxLiftsInput {
    /// A submission with all three lifts.
    #[must_use]
    pub const fn all(squat: f64, bench: f64, deadlift: f64) -> Self {
        Self {
            squat: Some(squat),
            bench: Some(bench),
            deadlift: Some(deadlift),
        }
    }

    /// The submitted weight for one lift.
    #[must_use]
    pub const fn get(&self, lift: Lift) -> Option<f64> {
        match lift {
            Lift::Squat => self.squat,
            Lift::Bench => self.bench,
            Lift::Deadlift => self.deadlift,
        }
    }

    /// Submitted lifts in canonical order.
    pub fn entries(&self) -> impl Iterator<Item = (Lift, f64)> + '_ {
        Lift::ALL
            .into_iter()
            .filter_map(|lift| self.get(lift).map(|weight| (lift, weight)))
    }
}

/// Profile fields written when a user signs up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    /// Coach or athlete.
    pub role: Role,
    /// Display name.
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Optional unique username.
    #[serde(default)]
    pub username: Option<String>,
}

impl NewProfile {
    /// A coach profile.
    #[must_use]
    pub fn coach(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            role: Role::Coach,
            display_name: display_name.into(),
            email: email.into(),
            username: None,
        }
    }

    /// An athlete profile.
    #[must_use]
    pub fn athlete(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            role: Role::Athlete,
            display_name: display_name.into(),
            email: email.into(),
            username: None,
        }
    }
}

/// Check that a weight is a finite, non-negative number.
///
/// # Errors
///
/// Returns `CoachError::Validation` otherwise.
pub fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(CoachError::Validation(format!(
            "weight must be a non-negative number, got {weight}"
        )));
    }
    Ok(())
}

/// Trim a name and reject it if empty.
///
/// # Errors
///
/// Returns `CoachError::Validation` if nothing is left after trimming.
pub fn validate_name<'a>(what: &str, name: &'a str) -> Result<&'a str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoachError::Validation(format!("{what} must not be empty")));
    }
    Ok(trimmed)
}

/// Configuration for the coaching service.
#[derive(Debug, Clone, Deserialize)]
pub struct CoachConfig {
    /// Upper bound on weeks in a block.
    #[serde(default = "CoachConfig::default_max_weeks")]
    pub max_weeks_per_block: u32,

    /// Upper bound on training days per week.
    #[serde(default = "CoachConfig::default_max_sessions")]
    pub max_sessions_per_week: u32,

    /// Directory for the persistent store.
    #[serde(default = "CoachConfig::default_data_dir")]
    pub data_dir: PathBuf,
}

impl CoachConfig {
    const fn default_max_weeks() -> u32 {
        52
    }

    const fn default_max_sessions() -> u32 {
        7
    }

    fn default_data_dir() -> PathBuf {
        PathBuf::from("./data")
    }

    /// Load configuration from environment variables.
    ///
    /// - `LIFTLOG_DATA_DIR`: Directory for the persistent store
    /// - `LIFTLOG_MAX_WEEKS`: Upper bound on weeks per block
    /// - `LIFTLOG_MAX_SESSIONS`: Upper bound on sessions per week
    ///
    /// Unset or unparsable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LIFTLOG_DATA_DIR") {
            config.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("LIFTLOG_MAX_WEEKS") {
            if let Ok(n) = val.parse() {
                config.max_weeks_per_block = n;
            }
        }
        if let Ok(val) = std::env::var("LIFTLOG_MAX_SESSIONS") {
            if let Ok(n) = val.parse() {
                config.max_sessions_per_week = n;
            }
        }

        config
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            max_weeks_per_block: Self::default_max_weeks(),
            max_sessions_per_week: Self::default_max_sessions(),
            data_dir: Self::default_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_block_request_defaults() {
        let req: CreateBlockRequest =
            serde_json::from_str(r#"{"name": "Peaking", "sessionsPerWeek": 4}"#).unwrap();
        assert_eq!(req.week_count, 1);
        assert!(req.status.is_none());
        assert!(req.athlete_id.is_none());
    }

    #[test]
    fn create_block_request_builder() {
        let athlete = UserId::new("a1").unwrap();
        let req = CreateBlockRequest::new("Base", 3, 4)
            .for_athlete(athlete.clone())
            .with_status(BlockStatus::Active);
        assert_eq!(req.athlete_id, Some(athlete));
        assert_eq!(req.status, Some(BlockStatus::Active));
    }

    #[test]
    fn weight_validation() {
        assert!(validate_weight(0.0).is_ok());
        assert!(validate_weight(142.5).is_ok());
        assert!(validate_weight(-1.0).is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert!(validate_weight(f64::INFINITY).is_err());
    }

    #[test]
    fn name_validation() {
        assert_eq!(validate_name("exercise name", "  Squat ").unwrap(), "Squat");
        assert!(matches!(
            validate_name("exercise name", "   "),
            Err(CoachError::Validation(_))
        ));
    }

    #[test]
    fn max_lifts_entries_skip_missing() {
        let input = MaxLiftsInput {
            squat: Some(200.0),
            bench: None,
            deadlift: Some(250.0),
        };
        let entries: Vec<_> = input.entries().collect();
        assert_eq!(entries, vec![(Lift::Squat, 200.0), (Lift::Deadlift, 250.0)]);
    }

    #[test]
    fn coach_config_defaults() {
        let config = CoachConfig::default();
        assert_eq!(config.max_weeks_per_block, 52);
        assert_eq!(config.max_sessions_per_week, 7);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn coach_config_partial_deserialize() {
        let config: CoachConfig = serde_json::from_str(r#"{"max_weeks_per_block": 12}"#).unwrap();
        assert_eq!(config.max_weeks_per_block, 12);
        assert_eq!(config.max_sessions_per_week, 7);
    }
}
