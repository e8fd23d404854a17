//! In-process document store.
//!
//! `MemoryStore` keeps every collection in a `BTreeMap` behind a single lock, so
//! a commit is trivially atomic. It also supports fault injection, which lets
//! tests observe exactly which writes survive when a commit is refused.

use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::{Mutex, RwLock};

use crate::batch::{stage, CommitInfo, WriteBatch};
use crate::document::{server_now, Document};
use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::schema::Collection;
use crate::DocumentStore;

#[derive(Debug, Default)]
struct FaultPlan {
    /// Number of upcoming commits to refuse.
    failing_commits: usize,
    /// Any commit touching one of these documents is refused.
    poisoned: HashSet<(Collection, String)>,
}

/// A document store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, Document>>>,
    faults: Mutex<FaultPlan>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the next `count` commits with `StoreError::Unavailable`.
    pub fn fail_next_commits(&self, count: usize) {
        self.faults.lock().failing_commits = count;
    }

    /// Refuse every commit that writes to the given document.
    pub fn fail_writes_to(&self, collection: Collection, id: impl AsRef<str>) {
        self.faults
            .lock()
            .poisoned
            .insert((collection, id.as_ref().to_string()));
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        *self.faults.lock() = FaultPlan::default();
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn count(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    fn check_faults(&self, batch: &WriteBatch) -> Result<()> {
        let mut faults = self.faults.lock();
        if faults.failing_commits > 0 {
            faults.failing_commits -= 1;
            return Err(StoreError::Unavailable("injected commit failure".to_string()));
        }
        for op in batch.ops() {
            let (collection, id) = op.target();
            if faults.poisoned.contains(&(collection, id.to_string())) {
                return Err(StoreError::Unavailable(format!(
                    "injected write failure for {collection}/{id}"
                )));
            }
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .read()
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let docs = collections
            .get(&query.collection())
            .map(|docs| docs.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(query.evaluate(docs))
    }

    fn commit(&self, batch: WriteBatch) -> Result<CommitInfo> {
        self.check_faults(&batch)?;

        let now = server_now();
        let mut collections = self.collections.write();
        let staged = stage(&batch, now, |collection, id| {
            Ok(collections
                .get(&collection)
                .and_then(|docs| docs.get(id))
                .cloned())
        })?;

        let documents = staged.len();
        for write in staged {
            let docs = collections.entry(write.collection).or_default();
            match write.document {
                Some(doc) => {
                    docs.insert(write.id, doc);
                }
                None => {
                    docs.remove(&write.id);
                }
            }
        }

        tracing::trace!(ops = batch.len(), documents, "Committed batch");

        Ok(CommitInfo {
            commit_time: now,
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FieldPath, FieldUpdate};
    use serde_json::json;

    #[test]
    fn set_get_delete() {
        let store = MemoryStore::new();
        store
            .set(Collection::Users, "u1", json!({"role": "athlete"}))
            .unwrap();

        let doc = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(doc["role"], "athlete");
        assert_eq!(doc["id"], "u1");

        store.delete(Collection::Users, "u1").unwrap();
        assert!(store.get(Collection::Users, "u1").unwrap().is_none());
    }

    #[test]
    fn failed_batch_applies_nothing() {
        let store = MemoryStore::new();
        store
            .set(Collection::Users, "u1", json!({"activeBlocks": []}))
            .unwrap();

        let mut batch = WriteBatch::new();
        batch
            .set(Collection::Blocks, "b1", json!({"status": "draft"}))
            .update(
                Collection::Users,
                "u1",
                vec![FieldUpdate::array_union(
                    FieldPath::field("activeBlocks"),
                    vec![json!("b1")],
                )],
            )
            // Fails: no such document
            .update(
                Collection::Users,
                "u2",
                vec![FieldUpdate::set(FieldPath::field("status"), "x")],
            );

        assert!(store.commit(batch).is_err());
        assert!(store.get(Collection::Blocks, "b1").unwrap().is_none());
        let user = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(user["activeBlocks"], json!([]));
    }

    #[test]
    fn injected_commit_failure() {
        let store = MemoryStore::new();
        store.fail_next_commits(1);

        let result = store.set(Collection::Users, "u1", json!({}));
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.count(Collection::Users), 0);

        // Only the next commit was refused
        store.set(Collection::Users, "u1", json!({})).unwrap();
        assert_eq!(store.count(Collection::Users), 1);
    }

    #[test]
    fn injected_document_failure() {
        let store = MemoryStore::new();
        store.fail_writes_to(Collection::Users, "u2");

        store.set(Collection::Users, "u1", json!({})).unwrap();
        assert!(store.set(Collection::Users, "u2", json!({})).is_err());

        store.clear_faults();
        store.set(Collection::Users, "u2", json!({})).unwrap();
    }

    #[test]
    fn server_timestamp_shared_across_batch() {
        let store = MemoryStore::new();
        store.set(Collection::Users, "u1", json!({})).unwrap();

        let mut batch = WriteBatch::new();
        batch
            .set(Collection::WorkoutLogs, "l1", json!({}))
            .update(
                Collection::WorkoutLogs,
                "l1",
                vec![FieldUpdate::server_timestamp(FieldPath::field("timestamp"))],
            )
            .update(
                Collection::Users,
                "u1",
                vec![FieldUpdate::server_timestamp(FieldPath::field("seenAt"))],
            );
        store.commit(batch).unwrap();

        let log = store.get(Collection::WorkoutLogs, "l1").unwrap().unwrap();
        let user = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(log["timestamp"], user["seenAt"]);
    }

    #[test]
    fn query_scans_collection() {
        let store = MemoryStore::new();
        store
            .set(Collection::Blocks, "b1", json!({"coachId": "c1"}))
            .unwrap();
        store
            .set(Collection::Blocks, "b2", json!({"coachId": "c2"}))
            .unwrap();
        store
            .set(Collection::Blocks, "b3", json!({"coachId": "c1"}))
            .unwrap();

        let results = store
            .query(&Query::new(Collection::Blocks).where_eq("coachId", "c1"))
            .unwrap();
        assert_eq!(results.len(), 2);
    }
}
