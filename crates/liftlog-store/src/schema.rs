//! Collection and field names.
//!
//! Collections map one-to-one onto `RocksDB` column families. Field names are the
//! camelCase keys used inside documents and in field-path updates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named collection of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// User profiles (coaches and athletes), keyed by user ID.
    Users,
    /// Training blocks, keyed by block ID.
    Blocks,
    /// Append-only workout log records, keyed by log ID.
    WorkoutLogs,
    /// Max-lift snapshots and progressions, keyed by user ID.
    Analytics,
}

impl Collection {
    /// The collection name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Blocks => "blocks",
            Self::WorkoutLogs => "workoutLogs",
            Self::Analytics => "analytics",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns all collections, for database initialization.
#[must_use]
pub fn all_collections() -> Vec<Collection> {
    vec![
        Collection::Users,
        Collection::Blocks,
        Collection::WorkoutLogs,
        Collection::Analytics,
    ]
}

/// Document field names.
pub mod fields {
    /// Document ID, stored inside every document.
    pub const ID: &str = "id";

    // users
    /// User role.
    pub const ROLE: &str = "role";
    /// Athlete's coach back-reference.
    pub const COACH_ID: &str = "coachId";
    /// Athlete roster status.
    pub const STATUS: &str = "status";
    /// Coach's athlete roster.
    pub const ATHLETES: &str = "athletes";
    /// Blocks currently assigned to an athlete.
    pub const ACTIVE_BLOCKS: &str = "activeBlocks";
    /// Blocks an athlete has completed.
    pub const PREVIOUS_BLOCKS: &str = "previousBlocks";
    /// Index of an athlete's workout logs.
    pub const WORKOUT_LOGS: &str = "workoutLogs";
    /// Whether the user has submitted max lifts.
    pub const HAS_ENTERED_MAX_LIFTS: &str = "hasEnteredMaxLifts";

    // blocks
    /// Target athlete of a block.
    pub const ATHLETE_ID: &str = "athleteId";
    /// Week schedule of a block.
    pub const WEEKS: &str = "weeks";
    /// Days within a week.
    pub const DAYS: &str = "days";
    /// Exercises within a day.
    pub const EXERCISES: &str = "exercises";
    /// Exercise name.
    pub const NAME: &str = "name";
    /// Schemes within an exercise.
    pub const SCHEMES: &str = "schemes";
    /// Denormalized logged weight on a scheme.
    pub const LOGGED_WEIGHT: &str = "loggedWeight";
    /// Denormalized logged timestamp on a scheme.
    pub const LOGGED_AT: &str = "loggedAt";
    /// Block creation timestamp.
    pub const CREATED_AT: &str = "createdAt";
    /// Block modification timestamp.
    pub const UPDATED_AT: &str = "updatedAt";
    /// When the block was sent to the athlete.
    pub const SENT_AT: &str = "sentAt";
    /// When the block was closed.
    pub const COMPLETED_AT: &str = "completedAt";

    // workoutLogs
    /// Block a log belongs to.
    pub const BLOCK_ID: &str = "blockId";
    /// Exercise a log belongs to.
    pub const EXERCISE_NAME: &str = "exerciseName";
    /// Server-assigned log timestamp.
    pub const TIMESTAMP: &str = "timestamp";

    // analytics
    /// Current max-lift snapshot.
    pub const CURRENT_MAXES: &str = "currentMaxes";
    /// Squat progression sequence.
    pub const SQUAT_PROGRESSION: &str = "squatProgression";
    /// Bench progression sequence.
    pub const BENCH_PROGRESSION: &str = "benchProgression";
    /// Deadlift progression sequence.
    pub const DEADLIFT_PROGRESSION: &str = "deadliftProgression";
}
