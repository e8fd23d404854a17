//! Domain types stored in the database.
//!
//! These types represent the persisted state of users, training blocks,
//! workout logs and max-lift analytics. Field names serialize as camelCase
//! to match the field paths used in updates (see [`crate::schema::fields`]).

use chrono::{DateTime, Utc};
use liftlog_core::{BlockId, LogId, UserId};
use serde::{Deserialize, Serialize};

/// The role a user plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Authors blocks and manages a roster.
    Coach,
    /// Receives blocks and logs workouts.
    Athlete,
}

/// Roster status of an athlete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Linked to a coach.
    Active,
    /// Removed from a coach's roster.
    Inactive,
}

impl UserStatus {
    /// The status as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// A user profile stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identifier issued by the identity provider.
    pub id: UserId,
    /// Coach or athlete.
    pub role: Role,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Optional unique username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Athlete's coach, if linked.
    #[serde(default)]
    pub coach_id: Option<UserId>,
    /// Athlete's roster status.
    #[serde(default)]
    pub status: Option<UserStatus>,
    /// Coach's roster, in the order athletes were added.
    #[serde(default)]
    pub athletes: Vec<UserId>,
    /// Blocks currently assigned to the athlete.
    #[serde(default)]
    pub active_blocks: Vec<BlockId>,
    /// Blocks the athlete has completed.
    #[serde(default)]
    pub previous_blocks: Vec<BlockId>,
    /// Every workout log the athlete has recorded.
    #[serde(default)]
    pub workout_logs: Vec<LogId>,
    /// Whether max lifts have been submitted at least once.
    #[serde(default)]
    pub has_entered_max_lifts: bool,
    /// Profile creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Lifecycle status of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    /// Being authored by the coach; may be deleted.
    Draft,
    /// Sent to the athlete.
    Active,
    /// Closed. Terminal.
    Completed,
}

impl BlockStatus {
    /// The status as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// A training block (program).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique identifier for the block.
    pub id: BlockId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Owning coach.
    pub coach_id: UserId,
    /// Target athlete, set once.
    #[serde(default)]
    pub athlete_id: Option<UserId>,
    /// Current lifecycle state.
    pub status: BlockStatus,
    /// Number of training days in each week.
    pub sessions_per_week: u32,
    /// Weeks in order, numbered from 1.
    #[serde(default)]
    pub weeks: Vec<Week>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// When the block was sent to the athlete.
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    /// When the block was closed.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// One week of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    /// 1-based, sequential, no gaps.
    pub week_number: u32,
    /// Days in order.
    #[serde(default)]
    pub days: Vec<Day>,
}

impl Week {
    /// A week of `sessions` empty days.
    #[must_use]
    pub fn empty(week_number: u32, sessions: u32) -> Self {
        Self {
            week_number,
            days: (1..=sessions).map(Day::empty).collect(),
        }
    }
}

/// One training day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// 1-based, sequential, no gaps.
    pub day_number: u32,
    /// Prescribed exercises, replaced wholesale on update.
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Day {
    /// A day with no exercises.
    #[must_use]
    pub const fn empty(day_number: u32) -> Self {
        Self {
            day_number,
            exercises: Vec::new(),
        }
    }
}

/// A prescribed exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    /// Exercise name, e.g. "Squat".
    pub name: String,
    /// Set/rep/intensity targets.
    #[serde(default)]
    pub schemes: Vec<Scheme>,
    /// Free-text coaching notes.
    #[serde(default)]
    pub notes: String,
}

impl Exercise {
    /// Create an exercise from scheme descriptions.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            schemes: schemes.into_iter().map(Scheme::new).collect(),
            notes: String::new(),
        }
    }
}

/// One set/rep/intensity target with the latest logged result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    /// Prescription, e.g. "3x5 @RPE7".
    pub description: String,
    /// Latest logged weight for this slot.
    #[serde(default)]
    pub logged_weight: Option<f64>,
    /// When the latest weight was logged.
    #[serde(default)]
    pub logged_at: Option<DateTime<Utc>>,
}

impl Scheme {
    /// A scheme with no logged result.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            logged_weight: None,
            logged_at: None,
        }
    }
}

/// An immutable workout log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLog {
    /// Unique identifier for the log.
    pub id: LogId,
    /// Athlete who performed the work.
    pub athlete_id: UserId,
    /// Block the log belongs to; `None` for free-form sets.
    #[serde(default)]
    pub block_id: Option<BlockId>,
    /// Week within the block.
    #[serde(default)]
    pub week_number: Option<u32>,
    /// Day within the week.
    #[serde(default)]
    pub day_number: Option<u32>,
    /// Exercise name.
    pub exercise_name: String,
    /// Scheme slot within the exercise.
    #[serde(default)]
    pub scheme_index: Option<usize>,
    /// Weight lifted.
    pub weight: f64,
    /// Repetitions, for free-form sets.
    #[serde(default)]
    pub reps: Option<u32>,
    /// Athlete notes.
    #[serde(default)]
    pub notes: String,
    /// Server-assigned timestamp.
    pub timestamp: DateTime<Utc>,
}

/// The three competition lifts tracked for max-lift analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lift {
    /// Back squat.
    Squat,
    /// Bench press.
    Bench,
    /// Deadlift.
    Deadlift,
}

impl Lift {
    /// All tracked lifts.
    pub const ALL: [Self; 3] = [Self::Squat, Self::Bench, Self::Deadlift];

    /// The key of this lift inside `currentMaxes`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Squat => "squat",
            Self::Bench => "bench",
            Self::Deadlift => "deadlift",
        }
    }

    /// The field holding this lift's progression sequence.
    #[must_use]
    pub const fn progression_field(self) -> &'static str {
        match self {
            Self::Squat => crate::schema::fields::SQUAT_PROGRESSION,
            Self::Bench => crate::schema::fields::BENCH_PROGRESSION,
            Self::Deadlift => crate::schema::fields::DEADLIFT_PROGRESSION,
        }
    }
}

/// A one-rep max at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiftRecord {
    /// Weight lifted.
    pub weight: f64,
    /// When it was recorded.
    pub timestamp: DateTime<Utc>,
}

/// The latest one-rep max for each lift.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentMaxes {
    /// Back squat.
    #[serde(default)]
    pub squat: Option<LiftRecord>,
    /// Bench press.
    #[serde(default)]
    pub bench: Option<LiftRecord>,
    /// Deadlift.
    #[serde(default)]
    pub deadlift: Option<LiftRecord>,
}

impl CurrentMaxes {
    /// The record for one lift.
    #[must_use]
    pub const fn get(&self, lift: Lift) -> Option<&LiftRecord> {
        match lift {
            Lift::Squat => self.squat.as_ref(),
            Lift::Bench => self.bench.as_ref(),
            Lift::Deadlift => self.deadlift.as_ref(),
        }
    }
}

/// Max-lift analytics for a user, keyed by user ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxLifts {
    /// Owner of the analytics document.
    pub user_id: UserId,
    /// Latest snapshot; overwritten by each submission.
    #[serde(default)]
    pub current_maxes: CurrentMaxes,
    /// Every squat submission, oldest first.
    #[serde(default)]
    pub squat_progression: Vec<LiftRecord>,
    /// Every bench submission, oldest first.
    #[serde(default)]
    pub bench_progression: Vec<LiftRecord>,
    /// Every deadlift submission, oldest first.
    #[serde(default)]
    pub deadlift_progression: Vec<LiftRecord>,
    /// First submission.
    pub created_at: DateTime<Utc>,
    /// Latest submission.
    pub updated_at: DateTime<Utc>,
}

impl MaxLifts {
    /// The progression sequence for one lift.
    #[must_use]
    pub fn progression(&self, lift: Lift) -> &[LiftRecord] {
        match lift {
            Lift::Squat => &self.squat_progression,
            Lift::Bench => &self.bench_progression,
            Lift::Deadlift => &self.deadlift_progression,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{from_document, to_document};
    use serde_json::json;

    #[test]
    fn user_defaults_missing_sets() {
        let doc = json!({"id": "a1", "role": "athlete"});
        let user: User = from_document(doc).unwrap();
        assert!(user.active_blocks.is_empty());
        assert!(user.coach_id.is_none());
        assert!(!user.has_entered_max_lifts);
    }

    #[test]
    fn null_coach_reads_as_none() {
        let doc = json!({"id": "a1", "role": "athlete", "coachId": null, "status": "inactive"});
        let user: User = from_document(doc).unwrap();
        assert!(user.coach_id.is_none());
        assert_eq!(user.status, Some(UserStatus::Inactive));
    }

    #[test]
    fn block_serializes_camel_case() {
        let now = Utc::now();
        let block = Block {
            id: BlockId::new("b1").unwrap(),
            name: "Hypertrophy".to_string(),
            coach_id: UserId::new("c1").unwrap(),
            athlete_id: None,
            status: BlockStatus::Draft,
            sessions_per_week: 2,
            weeks: vec![Week::empty(1, 2)],
            created_at: now,
            updated_at: now,
            sent_at: None,
            completed_at: None,
        };
        let doc = to_document(&block).unwrap();
        assert_eq!(doc["coachId"], "c1");
        assert_eq!(doc["status"], "draft");
        assert_eq!(doc["sessionsPerWeek"], 2);
        assert_eq!(doc["weeks"][0]["days"][1]["dayNumber"], 2);

        let back: Block = from_document(doc).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn day_lookup() {
        let now = Utc::now();
        let block = Block {
            id: BlockId::new("b1").unwrap(),
            name: String::new(),
            coach_id: UserId::new("c1").unwrap(),
            athlete_id: None,
            status: BlockStatus::Draft,
            sessions_per_week: 3,
            weeks: vec![Wression_field(), "deadliftProgression");
    }
}
