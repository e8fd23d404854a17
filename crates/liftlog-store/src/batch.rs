//! Atomic multi-document write batches.
//!
//! A [`WriteBatch`] collects `set`, `update` and `delete` operations across any
//! number of collections. A store commits the whole batch or none of it, and
//! every `ServerTimestamp` in the batch resolves to the same commit time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::document::{apply_update, Document, FieldUpdate};
use crate::error::{Result, StoreError};
use crate::schema::{fields, Collection};

/// A single operation within a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or fully replace a document.
    Set {
        /// Target collection.
        collection: Collection,
        /// Document ID.
        id: String,
        /// New document contents.
        document: Document,
    },
    /// Apply field updates to an existing document.
    Update {
        /// Target collection.
        collection: Collection,
        /// Document ID.
        id: String,
        /// Updates applied in order.
        updates: Vec<FieldUpdate>,
    },
    /// Delete a document. Deleting a missing document is a no-op.
    Delete {
        /// Target collection.
        collection: Collection,
        /// Document ID.
        id: String,
    },
}

impl WriteOp {
    /// The document this operation targets.
    #[must_use]
    pub fn target(&self) -> (Collection, &str) {
        match self {
            Self::Set { collection, id, .. }
            | Self::Update { collection, id, .. }
            | Self::Delete { collection, id } => (*collection, id),
        }
    }
}

/// An ordered set of writes committed atomically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a document.
    pub fn set(&mut self, collection: Collection, id: impl AsRef<str>, document: Document) -> &mut Self {
        self.ops.push(WriteOp::Set {
            collection,
            id: id.as_ref().to_string(),
            document,
        });
        self
    }

    /// Update fields of an existing document.
    pub fn update(
        &mut self,
        collection: Collection,
        id: impl AsRef<str>,
        updates: Vec<FieldUpdate>,
    ) -> &mut Self {
        self.ops.push(WriteOp::Update {
            collection,
            id: id.as_ref().to_string(),
            updates,
        });
        self
    }

    /// Delete a document.
    pub fn delete(&mut self, collection: Collection, id: impl AsRef<str>) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection,
            id: id.as_ref().to_string(),
        });
        self
    }

    /// The operations in this batch, in order.
    #[must_use]
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Number of operations in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether this batch has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitInfo {
    /// Server timestamp assigned to every `ServerTimestamp` in the batch.
    pub commit_time: DateTime<Utc>,
    /// Number of documents written or deleted.
    pub documents: usize,
}

/// The final state of one document after staging a batch.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StagedWrite {
    pub collection: Collection,
    pub id: String,
    /// `None` means the document is deleted.
    pub document: Option<Document>,
}

/// Resolve a batch against current state without writing anything.
///
/// `read` loads the committed version of a document. Later operations in the
/// batch see the effects of earlier ones. Any failure aborts the whole batch.
pub(crate) fn stage<F>(batch: &WriteBatch, now: DateTime<Utc>, mut read: F) -> Result<Vec<StagedWrite>>
where
    F: FnMut(Collection, &str) -> Result<Option<Document>>,
{
    let mut staged: BTreeMap<(Collection, String), Option<Document>> = BTreeMap::new();

    for op in &batch.ops {
        let (collection, id) = op.target();
        let key = (collection, id.to_string());

        match op {
            WriteOp::Set { document, .. } => {
                let mut document = document.clone();
                let Value::Object(map) = &mut document else {
                    return Err(StoreError::Serialization(format!(
                        "document {collection}/{id} must be an object"
                    )));
                };
                map.insert(fields::ID.to_string(), Value::String(id.to_string()));
                staged.insert(key, Some(document));
            }
            WriteOp::Update { updates, .. } => {
                let current = match staged.get(&key) {
                    Some(doc) => doc.clone(),
                    None => read(collection, id)?,
                };
                let mut document = current.ok_or_else(|| StoreError::NotFound {
                    collection,
                    id: id.to_string(),
                })?;
                for update in updates {
                    apply_update(&mut document, update, now)?;
                }
                staged.insert(key, Some(document));
            }
            WriteOp::Delete { .. } => {
                staged.insert(key, None);
            }
        }
    }

    Ok(staged
        .into_iter()
        .map(|((collection, id), document)| StagedWrite {
            collection,
            id,
            document,
        })
        .collect())
}
