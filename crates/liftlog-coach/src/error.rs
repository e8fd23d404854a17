//! Error types for the coaching protocols.
//!
//! This module defines all errors that can occur during roster, program and
//! workout operations.

use liftlog_core::{BlockId, UserId};
use liftlog_store::{BlockStatus, Role, StoreError};
use thiserror::Error;

/// A result type using `CoachError`.
pub type Result<T> = std::result::Result<T, CoachError>;

/// Errors that can occur in coaching operations.
#[derive(Debug, Error)]
pub enum CoachError {
    /// The requested block was not found.
    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    /// The requested athlete was not found.
    #[error("Athlete not found: {0}")]
    AthleteNotFound(UserId),

    /// The requested user profile was not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The block has no week with this number.
    #[error("block {block_id} has no week {week_number}")]
    WeekNotFound {
        /// The block searched.
        block_id: BlockId,
        /// The requested week.
        week_number: u32,
    },

    /// The week has no day with this number.
    #[error("block {block_id} has no day {day_number} in week {week_number}")]
    DayNotFound {
        /// The block searched.
        block_id: BlockId,
        /// The week searched.
        week_number: u32,
        /// The requested day.
        day_number: u32,
    },

    /// The day has no exercise with this name.
    #[error("block {block_id} has no exercise {name:?} on the requested day")]
    ExerciseNotFound {
        /// The block searched.
        block_id: BlockId,
        /// The requested exercise name.
        name: String,
    },

    /// The exercise has no scheme at this index.
    #[error("exercise {exercise:?} in block {block_id} has no scheme {index}")]
    SchemeNotFound {
        /// The block searched.
        block_id: BlockId,
        /// The exercise searched.
        exercise: String,
        /// The requested scheme index.
        index: usize,
    },

    /// The request was malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation is not permitted in the current state.
    #[error("{0}")]
    NotAllowed(String),

    /// The requested block status transition is not valid.
    #[error("invalid status transition for block {block_id}: cannot transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// The block being transitioned.
        block_id: BlockId,
        /// The current status.
        from: BlockStatus,
        /// The requested target status.
        to: BlockStatus,
    },

    /// The user exists but has the wrong role for this operation.
    #[error("user {user_id} is not a {expected:?}")]
    WrongRole {
        /// The user checked.
        user_id: UserId,
        /// The role the operation requires.
        expected: Role,
    },

    /// The athlete or block is already bound to someone else.
    #[error("{subject} is already assigned to {assigned_to}")]
    AlreadyAssigned {
        /// The athlete or block ID.
        subject: String,
        /// The coach or athlete it is bound to.
        assigned_to: UserId,
    },

    /// The block does not belong to the athlete.
    #[error("block {block_id} is not assigned to athlete {athlete_id}")]
    NotAssigned {
        /// The block checked.
        block_id: BlockId,
        /// The athlete making the request.
        athlete_id: UserId,
    },

    /// Identity provider error.
    #[error("authentication error: {0}")]
    Auth(#[from] liftlog_auth::AuthError),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoachError {
    /// Returns true if a referenced document does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BlockNotFound(_)
                | Self::AthleteNotFound(_)
                | Self::UserNotFound(_)
                | Self::WeekNotFound { .. }
                | Self::DayNotFound { .. }
                | Self::ExerciseNotFound { .. }
                | Self::SchemeNotFound { .. }
                | Self::Store(StoreError::NotFound { .. })
        )
    }

    /// Returns true if this error might be resolved by retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Store(e) => e.is_retriable(),
            Self::Auth(e) => e.is_retriable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_store::Collection;

    #[test]
    fn not_found_classification() {
        let block_id = BlockId::new("b1").unwrap();
        assert!(CoachError::BlockNotFound(block_id.clone()).is_not_found());
        assert!(CoachError::SchemeNotFound {
            block_id: block_id.clone(),
            exercise: "Squat".to_string(),
            index: 3,
        }
        .is_not_found());
        assert!(CoachError::Store(StoreError::NotFound {
            collection: Collection::Users,
            id: "a1".to_string(),
        })
        .is_not_found());
        assert!(!CoachError::Validation("bad".to_string()).is_not_found());
        assert!(!CoachError::InvalidTransition {
            block_id,
            from: BlockStatus::Completed,
            to: BlockStatus::Active,
        }
        .is_not_found());
    }

    #[test]
    fn retriable_classification() {
        assert!(CoachError::Store(StoreError::Unavailable("down".to_string())).is_retriable());
        assert!(!CoachError::Store(StoreError::Database("corrupt".to_string())).is_retriable());
        assert!(CoachError::Auth(liftlog_auth::AuthError::RateLimited).is_retriable());
        assert!(!CoachError::NotAllowed("no".to_string()).is_retriable());
    }

    #[test]
    fn messages_match_protocol_wording() {
        let block_id = BlockId::new("b1").unwrap();
        let athlete_id = UserId::new("a1").unwrap();
        assert_eq!(
            CoachError::BlockNotFound(block_id).to_string(),
            "Block not found: b1"
        );
        assert_eq!(
            CoachError::AthleteNotFound(athlete_id).to_string(),
            "Athlete not found: a1"
        );
    }
}
