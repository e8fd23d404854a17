//! Document store boundary for liftlog.
//!
//! This crate models the remote document database the coaching protocols run
//! against: named collections of JSON documents, point reads, filtered and
//! ordered queries, field-path updates with array operators, and atomic
//! multi-document batches.
//!
//! # Architecture
//!
//! The store uses the following collections:
//!
//! - `users`: Coach and athlete profiles, keyed by `user_id`
//! - `blocks`: Training blocks with their nested week/day/exercise schedule
//! - `workoutLogs`: Append-only workout results, keyed by `log_id`
//! - `analytics`: Max-lift snapshots and progressions, keyed by `user_id`
//!
//! Two implementations are provided: [`MemoryStore`] for in-process use and
//! tests (with fault injection), and [`RocksStore`] for persistence.
//!
//! # Example
//!
//! ```
//! use liftlog_store::{Collection, DocumentStore, FieldPath, FieldUpdate, MemoryStore, WriteBatch};
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! store.set(Collection::Users, "athlete-1", json!({"role": "athlete"})).unwrap();
//!
//! let mut batch = WriteBatch::new();
//! batch
//!     .set(Collection::Blocks, "block-1", json!({"status": "draft"}))
//!     .update(
//!         Collection::Users,
//!         "athlete-1",
//!         vec![FieldUpdate::array_union(FieldPath::field("activeBlocks"), vec![json!("block-1")])],
//!     );
//! store.commit(batch).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod batch;
pub mod document;
pub mod error;
pub mod memory;
pub mod query;
pub mod rocks;
pub mod schema;
pub mod types;

pub use batch::{CommitInfo, WriteBatch, WriteOp};
pub use document::{
    from_document, server_now, timestamp_value, to_document, Document, FieldOp, FieldPath,
    FieldUpdate, PathSegment,
};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use query::{Direction, Filter, Query};
pub use rocks::RocksStore;
pub use schema::{fields, Collection};
pub use types::{
    Block, BlockStatus, CurrentMaxes, Day, Exercise, Lift, LiftRecord, MaxLifts, Role, Scheme,
    User, UserStatus, Week, WorkoutLog,
};

use serde::de::DeserializeOwned;

/// The storage trait defining all document operations.
///
/// This trait abstracts the remote store, allowing for different
/// implementations (e.g., `RocksDB`, in-memory for testing). Implementations
/// must commit each [`WriteBatch`] atomically.
pub trait DocumentStore: Send + Sync {
    /// Get a document by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    /// Run a query. Results are a snapshot in deterministic order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn query(&self, query: &Query) -> Result<Vec<Document>>;

    /// Commit a batch atomically: every operation applies, or none does.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if an update targets a missing document,
    /// `StoreError::InvalidPath` if a field path cannot be applied, or a
    /// database error. No operation is applied on error.
    fn commit(&self, batch: WriteBatch) -> Result<CommitInfo>;

    /// Create or replace a single document.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn set(&self, collection: Collection, id: &str, document: Document) -> Result<CommitInfo> {
        let mut batch = WriteBatch::new();
        batch.set(collection, id, document);
        self.commit(batch)
    }

    /// Update fields of a single existing document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the document doesn't exist.
    fn update(
        &self,
        collection: Collection,
        id: &str,
        updates: Vec<FieldUpdate>,
    ) -> Result<CommitInfo> {
        let mut batch = WriteBatch::new();
        batch.update(collection, id, updates);
        self.commit(batch)
    }

    /// Delete a single document. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn delete(&self, collection: Collection, id: &str) -> Result<CommitInfo> {
        let mut batch = WriteBatch::new();
        batch.delete(collection, id);
        self.commit(batch)
    }
}

/// Get a document and decode it into a typed record.
///
/// # Errors
///
/// Returns an error if the read fails or the document doesn't match `T`.
pub fn get_as<T, S>(store: &S, collection: Collection, id: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    store.get(collection, id)?.map(from_document).transpose()
}

/// Run a query and decode every result into a typed record.
///
/// # Errors
///
/// Returns an error if the query fails or any document doesn't match `T`.
pub fn query_as<T, S>(store: &S, query: &Query) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    store.query(query)?.into_iter().map(from_document).collect()
}
