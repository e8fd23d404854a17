//! Coaching protocols for liftlog.
//!
//! This crate provides the business logic that keeps coach, athlete, block
//! and workout documents consistent with each other. Every operation runs
//! against an injected [`DocumentStore`]; multi-document changes go through
//! one atomic batch wherever the protocol requires it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Application                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CoachingService                         │
//! │  ┌──────────┐ ┌─────────────┐ ┌──────────┐ ┌─────────────┐  │
//! │  │  Roster  │ │  Program +  │ │ Workout  │ │  Analytics  │  │
//! │  │          │ │  Lifecycle  │ │ Logging  │ │             │  │
//! │  └──────────┘ └─────────────┘ └──────────┘ └─────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                ┌─────────────┴─────────────┐
//!                ▼                           ▼
//!         ┌──────────────┐           ┌──────────────┐
//!         │    Store     │           │     Auth     │
//!         │ (documents)  │           │  (identity)  │
//!         └──────────────┘           └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use liftlog_coach::{CoachConfig, Coaching, CoachingService, CreateBlockRequest, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coaching = CoachingService::open(CoachConfig::from_env())?;
//!
//! let coach_id = UserId::new("coach-uid")?;
//! let athlete_id = UserId::new("athlete-uid")?;
//!
//! let block = coaching
//!     .create_block(&coach_id, CreateBlockRequest::new("Strength", 3, 4))
//!     .await?;
//! coaching.send_program_to_athlete(&block.id, &athlete_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Block Lifecycle
//!
//! - `Draft` → `Active` (sent to the athlete) or deleted
//! - `Active` → `Completed` (closed)
//! - `Completed` is terminal
//!
//! See the [`lifecycle`] module for transition validation helpers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod analytics;
pub mod error;
pub mod lifecycle;
pub mod profile;
pub mod program;
pub mod roster;
pub mod service;
pub mod types;
pub mod workout;

pub use error::{CoachError, Result};
pub use service::{Coaching, CoachingService};
pub use types::{
    CoachConfig, CreateBlockRequest, LogFilter, LogSetRequest, LogWorkoutRequest, MaxLiftsInput,
    NewProfile,
};

// Re-export commonly used types from dependencies for convenience
pub use liftlog_core::{BlockId, LogId, UserId};
pub use liftlog_store::{
    Block, BlockStatus, Day, DocumentStore, Exercise, MaxLifts, Role, Scheme, User, Week,
    WorkoutLog,
};
