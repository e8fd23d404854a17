//! Error types for the storage layer.

use thiserror::Error;

use crate::schema::Collection;

/// A result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document targeted by an update was not found.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection the document was expected in.
        collection: Collection,
        /// Document ID.
        id: String,
    },

    /// A field path could not be resolved against the document.
    #[error("invalid field path {path}: {reason}")]
    InvalidPath {
        /// The rendered field path.
        path: String,
        /// Why the path could not be applied.
        reason: String,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store could not be reached or refused the write.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns true if this error might be resolved by retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
