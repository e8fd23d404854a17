//! Block status state machine.
//!
//! This module defines the valid status transitions for training blocks and
//! provides validation logic used by the program assignment operations.
//!
//! # State Machine
//!
//! ```text
//!     ┌──────────┐   (send)   ┌──────────┐  (close)  ┌───────────┐
//!     │  Draft   │───────────▶│  Active  │──────────▶│ Completed │
//!     └────┬─────┘            └──────────┘           └───────────┘
//!          │ (delete)
//!          ▼
//!      (removed)
//! ```
//!
//! Nothing skips `Active`, and `Completed` is terminal.

use liftlog_core::BlockId;
use liftlog_store::BlockStatus;

use crate::error::{CoachError, Result};

/// Validates a status transition and returns the target status if valid.
///
/// # Errors
///
/// Returns `CoachError::InvalidTransition` if the transition is not allowed.
pub fn validate_transition(
    block_id: &BlockId,
    from: BlockStatus,
    to: BlockStatus,
) -> Result<BlockStatus> {
    if is_valid_transition(from, to) {
        Ok(to)
    } else {
        Err(CoachError::InvalidTransition {
            block_id: block_id.clone(),
            from,
            to,
        })
    }
}

/// Check if a status transition is valid according to the state machine.
#[must_use]
pub const fn is_valid_transition(from: BlockStatus, to: BlockStatus) -> bool {
    use BlockStatus::{Active, Completed, Draft};

    matches!((from, to), (Draft, Active) | (Active, Completed))
}

/// Returns true if a block may be created directly in this status.
#[must_use]
pub const fn is_valid_initial(status: BlockStatus) -> bool {
    matches!(status, BlockStatus::Draft | BlockStatus::Active)
}

/// Returns true if a block in this status may be deleted.
#[must_use]
pub const fn can_delete(status: BlockStatus) -> bool {
    matches!(status, BlockStatus::Draft)
}

/// Returns true if the block can no longer change.
#[must_use]
pub const fn is_terminal(status: BlockStatus) -> bool {
    matches!(status, BlockStatus::Completed)
}
