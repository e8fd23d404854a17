//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `DocumentStore`
//! trait. Each collection is a column family keyed by document ID; values are
//! CBOR-encoded documents.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch as RocksBatch,
};

use crate::batch::{stage, CommitInfo, WriteBatch};
use crate::document::{server_now, Document};
use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::schema::{all_collections, Collection};
use crate::DocumentStore;

/// RocksDB-backed document store.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Serializes commits so staging reads and the final write see one state.
    commit_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_collections()
            .into_iter()
            .map(|collection| ColumnFamilyDescriptor::new(collection.as_str(), Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, collection: Collection) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db.cf_handle(collection.as_str()).ok_or_else(|| {
            StoreError::Database(format!("column family not found: {collection}"))
        })
    }

    /// Serialize a document using CBOR.
    fn serialize(document: &Document) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(document, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a document from CBOR.
    fn deserialize(data: &[u8]) -> Result<Document> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl DocumentStore for RocksStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let cf = self.cf(collection)?;

        self.db
            .get_cf(&cf, id.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let cf = self.cf(query.collection())?;

        let mut docs = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            docs.push(Self::deserialize(&value)?);
        }

        Ok(query.evaluate(docs))
    }

    fn commit(&self, batch: WriteBatch) -> Result<CommitInfo> {
        let _guard = self.commit_lock.lock();

        let now = server_now();
        let staged = stage(&batch, now, |collection, id| self.get(collection, id))?;

        let mut rocks_batch = RocksBatch::default();
        for write in &staged {
            let cf = self.cf(write.collection)?;
            match &write.document {
                Some(doc) => rocks_batch.put_cf(&cf, write.id.as_bytes(), Self::serialize(doc)?),
                None => rocks_batch.delete_cf(&cf, write.id.as_bytes()),
            }
        }

        self.db
            .write(rocks_batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::trace!(ops = batch.len(), documents = staged.len(), "Committed batch");

        Ok(CommitInfo {
            commit_time: now,
            documents: staged.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FieldPath, FieldUpdate};
    use crate::query::Direction;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksStore::open(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn document_crud() {
        let (store, _dir) = create_test_store();

        // Create
        store
            .set(
                Collection::Users,
                "u1",
                json!({"role": "coach", "athletes": []}),
            )
            .unwrap();

        // Read
        let doc = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(doc["role"], "coach");

        // Update
        store
            .update(
                Collection::Users,
                "u1",
                vec![FieldUpdate::array_union(
                    FieldPath::field("athletes"),
                    vec![json!("a1")],
                )],
            )
            .unwrap();
        let doc = store.get(Collection::Users, "u1").unwrap().unwrap();
        assert_eq!(doc["athletes"], json!(["a1"]));

        // Delete
        store.delete(Collection::Users, "u1").unwrap();
        assert!(store.get(Collection::Users, "u1").unwrap().is_none());
    }

    #[test]
    fn collections_are_isolated() {
        let (store, _dir) = create_test_store();
        store.set(Collection::Users, "x", json!({"a": 1})).unwrap();
        assert!(store.get(Collection::Blocks, "x").unwrap().is_none());
    }

    #[test]
    fn failed_batch_applies_nothing() {
        let (store, _dir) = create_test_store();

        let mut batch = WriteBatch::new();
        batch
            .set(Collection::Blocks, "b1", json!({"status": "draft"}))
            .update(
                Collection::Users,
                "missing",
                vec![FieldUpdate::set(FieldPath::field("status"), "x")],
            );

        let result = store.commit(batch);
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(store.get(Collection::Blocks, "b1").unwrap().is_none());
    }

    #[test]
    fn floats_survive_cbor() {
        let (store, _dir) = create_test_store();
        store
            .set(Collection::WorkoutLogs, "l1", json!({"weight": 102.5}))
            .unwrap();
        let doc = store.get(Collection::WorkoutLogs, "l1").unwrap().unwrap();
        assert_eq!(doc["weight"].as_f64(), Some(102.5));
    }

    #[test]
    fn ordered_query() {
        let (store, _dir) = create_test_store();
        for (id, ts) in [
            ("l1", "2024-05-01T08:00:00Z"),
            ("l2", "2024-05-03T08:00:00Z"),
            ("l3", "2024-05-02T08:00:00Z"),
        ] {
            store
                .set(
                    Collection::WorkoutLogs,
                    id,
                    json!({"athleteId": "a", "timestamp": ts}),
                )
                .unwrap();
        }

        let query = Query::new(Collection::WorkoutLogs)
            .where_eq("athleteId", "a")
            .order_by("timestamp", Direction::Descending);
        let results = store.query(&query).unwrap();
        let ids: Vec<_> = results.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["l2", "l3", "l1"]);
    }

    #[test]
    fn reopen_preserves_documents() {
        let dir = TempDir::new().unwrap();
        {
            let store = RocksStore::open(dir.path()).unwrap();
            store
                .set(Collection::Analytics, "u1", json!({"userId": "u1"}))
                .unwrap();
        }
        let store = RocksStore::open(dir.path()).unwrap();
        assert!(store.get(Collection::Analytics, "u1").unwrap().is_some());
    }
}
