//! Core types and utilities for liftlog.
//!
//! This crate provides the foundational types used throughout the liftlog workspace:
//!
//! - **Identifiers**: Strongly-typed IDs for users, blocks, and workout logs
//! - **Validation**: [`IdError`] for values that cannot be document IDs
//!
//! # Example
//!
//! ```
//! use liftlog_core::{BlockId, LogId, UserId};
//!
//! // User IDs come from the identity provider
//! let coach_id = UserId::new("coach-123").unwrap();
//!
//! // Block and log IDs are generated client-side
//! let block_id = BlockId::generate();
//! let log_id = LogId::generate();
//! assert_ne!(block_id.as_str(), log_id.as_str());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{BlockId, IdError, LogId, UserId};
