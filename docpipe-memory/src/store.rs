//! In-memory storage backend.
//!
//! Stores documents as BSON values in insertion-ordered vectors behind an
//! async read-write lock. Unsorted reads preserve insertion order, so paging
//! over an unmodified collection is stable. Each backend call takes the lock
//! once, which gives the per-document atomicity the repository contract
//! relies on; bulk operations are not atomic as a unit.
//!
//! Queries scan the whole collection (no indexing). Intended for tests and
//! development; use the MongoDB backend for persistent data.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use mea::rwlock::RwLock;

use docpipe_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocPipeError, DocPipeResult},
    filter::{DocumentQuery, Filter, SortDirection},
};

use crate::evaluator::{DocumentEvaluator, compare_field};

/// Documents of one collection, in insertion order.
type Entries = Vec<(ObjectId, Document)>;
type StoreMap = HashMap<String, Entries>;

/// Thread-safe in-memory document storage backend.
///
/// Cloneable; clones share the same underlying state, so the store can be
/// handed to several owners like a shared connection.
#[derive(Default, Clone, Debug)]
pub struct MemoryStore {
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(StoreMap::new())) }
    }

    /// Creates a builder for constructing a `MemoryStore`.
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder
    }

    fn entry_id(document: &Document) -> DocPipeResult<Option<ObjectId>> {
        match document.get("_id") {
            None => Ok(None),
            Some(Bson::ObjectId(id)) => Ok(Some(*id)),
            Some(other) => Err(DocPipeError::Serialization(format!(
                "_id must be an object id, got {other}"
            ))),
        }
    }

    fn matching_positions(entries: &Entries, filter: &Filter) -> DocPipeResult<Vec<usize>> {
        let mut positions = Vec::new();

        for (position, (_, document)) in entries.iter().enumerate() {
            if DocumentEvaluator::matches(document, filter)? {
                positions.push(position);
            }
        }

        Ok(positions)
    }
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn find_by_id(
        &self,
        id: ObjectId,
        collection: &str,
    ) -> DocPipeResult<Option<Document>> {
        let store = self.store.read().await;

        Ok(store.get(collection).and_then(|entries| {
            entries
                .iter()
                .find(|(entry_id, _)| *entry_id == id)
                .map(|(_, document)| document.clone())
        }))
    }

    async fn insert_document(
        &self,
        mut document: Document,
        collection: &str,
    ) -> DocPipeResult<ObjectId> {
        let id = Self::entry_id(&document)?.unwrap_or_else(ObjectId::new);
        document.insert("_id", id);

        let mut store = self.store.write().await;
        let entries = store.entry(collection.to_string()).or_default();

        if entries.iter().any(|(entry_id, _)| *entry_id == id) {
            return Err(DocPipeError::InvalidArgument(format!(
                "document {id} already exists in collection {collection}"
            )));
        }

        entries.push((id, document));
        tracing::debug!(collection, id = %id, "inserted document");

        Ok(id)
    }

    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> DocPipeResult<Vec<ObjectId>> {
        let mut ids = Vec::with_capacity(documents.len());

        // Sequential inserts under one guard: earlier documents stay in
        // place when a later one is rejected.
        let mut store = self.store.write().await;
        let entries = store.entry(collection.to_string()).or_default();

        for mut document in documents {
            let id = Self::entry_id(&document)?.unwrap_or_else(ObjectId::new);

            if entries.iter().any(|(entry_id, _)| *entry_id == id) {
                return Err(DocPipeError::InvalidArgument(format!(
                    "document {id} already exists in collection {collection}"
                )));
            }

            document.insert("_id", id);
            entries.push((id, document));
            ids.push(id);
        }

        Ok(ids)
    }

    async fn replace_document(
        &self,
        id: ObjectId,
        mut document: Document,
        collection: &str,
    ) -> DocPipeResult<bool> {
        document.insert("_id", id);

        let mut store = self.store.write().await;
        let Some(entries) = store.get_mut(collection) else {
            return Ok(false);
        };
        let Some(slot) = entries
            .iter_mut()
            .find(|(entry_id, _)| *entry_id == id)
        else {
            return Ok(false);
        };

        // Matched-and-modified semantics: replacing with identical content
        // reports false, like a driver's modified count.
        if slot.1 == document {
            return Ok(false);
        }

        slot.1 = document;
        Ok(true)
    }

    async fn delete_by_id(&self, id: ObjectId, collection: &str) -> DocPipeResult<()> {
        let mut store = self.store.write().await;

        if let Some(entries) = store.get_mut(collection) {
            entries.retain(|(entry_id, _)| *entry_id != id);
        }

        Ok(())
    }

    async fn delete_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64> {
        let mut store = self.store.write().await;
        let Some(entries) = store.get_mut(collection) else {
            return Ok(0);
        };

        let deleted = match filter {
            None => {
                let deleted = entries.len();
                entries.clear();
                deleted
            }
            Some(filter) => {
                let positions = Self::matching_positions(entries, &filter)?;
                for position in positions.iter().rev() {
                    entries.remove(*position);
                }
                positions.len()
            }
        };

        tracing::debug!(collection, deleted, "deleted documents");

        Ok(deleted as u64)
    }

    async fn count_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64> {
        let store = self.store.read().await;
        let Some(entries) = store.get(collection) else {
            return Ok(0);
        };

        match filter {
            None => Ok(entries.len() as u64),
            Some(filter) => {
                Ok(Self::matching_positions(entries, &filter)?.len() as u64)
            }
        }
    }

    async fn query_documents(
        &self,
        query: DocumentQuery,
        collection: &str,
    ) -> DocPipeResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(entries) = store.get(collection) else {
            return Ok(Vec::new());
        };

        // Filter first, in insertion order.
        let mut documents = Vec::new();
        for (_, document) in entries {
            let keep = match &query.filter {
                Some(filter) => DocumentEvaluator::matches(document, filter)?,
                None => true,
            };
            if keep {
                documents.push(document.clone());
            }
        }

        // Then sort, then the window: skip before take.
        if let Some(sort) = &query.sort {
            documents.sort_by(|a, b| {
                let ordering = compare_field(a, b, &sort.field);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        Ok(documents
            .into_iter()
            .skip(query.skip as usize)
            .take(query.take.map(|take| take as usize).unwrap_or(usize::MAX))
            .collect())
    }
}

/// Builder for constructing [`MemoryStore`] instances.
#[derive(Default)]
pub struct MemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for MemoryStoreBuilder {
    type Backend = MemoryStore;

    async fn build(self) -> DocPipeResult<Self::Backend> {
        Ok(MemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use docpipe_core::filter::Sort;

    #[tokio::test]
    async fn insert_assigns_an_id_when_absent() {
        let store = MemoryStore::new();

        let id = store
            .insert_document(doc! { "name": "a" }, "things")
            .await
            .unwrap();
        let found = store.find_by_id(id, "things").await.unwrap().unwrap();

        assert_eq!(found.get_str("name").unwrap(), "a");
        assert_eq!(found.get_object_id("_id").unwrap(), id);
    }

    #[tokio::test]
    async fn insert_honors_a_provided_id_once() {
        let store = MemoryStore::new();
        let id = ObjectId::new();

        let assigned = store
            .insert_document(doc! { "_id": id, "name": "a" }, "things")
            .await
            .unwrap();
        assert_eq!(assigned, id);

        let duplicate = store
            .insert_document(doc! { "_id": id, "name": "b" }, "things")
            .await;
        assert!(matches!(duplicate, Err(DocPipeError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn replace_reports_matched_and_modified() {
        let store = MemoryStore::new();
        let id = store
            .insert_document(doc! { "name": "a" }, "things")
            .await
            .unwrap();

        assert!(
            store
                .replace_document(id, doc! { "name": "b" }, "things")
                .await
                .unwrap()
        );
        // Identical content: matched but not modified.
        assert!(
            !store
                .replace_document(id, doc! { "name": "b" }, "things")
                .await
                .unwrap()
        );
        // Unmatched id: no insert happens.
        assert!(
            !store
                .replace_document(ObjectId::new(), doc! { "name": "c" }, "things")
                .await
                .unwrap()
        );
        assert_eq!(store.count_documents(None, "things").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn missing_collections_read_as_empty() {
        let store = MemoryStore::new();

        assert!(store.find_by_id(ObjectId::new(), "nope").await.unwrap().is_none());
        assert_eq!(store.count_documents(None, "nope").await.unwrap(), 0);
        assert_eq!(store.delete_documents(None, "nope").await.unwrap(), 0);
        assert!(
            store
                .query_documents(DocumentQuery::default(), "nope")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn query_applies_filter_sort_skip_take_in_order() {
        let store = MemoryStore::new();
        for size in 1..=6 {
            store
                .insert_document(doc! { "size": size }, "things")
                .await
                .unwrap();
        }

        let documents = store
            .query_documents(
                DocumentQuery {
                    filter: Some(Filter::gt("size", 2)),
                    sort: Some(Sort::desc("size")),
                    skip: 1,
                    take: Some(2),
                },
                "things",
            )
            .await
            .unwrap();

        let sizes: Vec<i32> = documents
            .iter()
            .map(|document| document.get_i32("size").unwrap())
            .collect();
        assert_eq!(sizes, vec![5, 4]);
    }

    #[tokio::test]
    async fn unsorted_queries_preserve_insertion_order() {
        let store = MemoryStore::new();
        for name in ["c", "a", "b"] {
            store
                .insert_document(doc! { "name": name }, "things")
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .query_documents(DocumentQuery::default(), "things")
            .await
            .unwrap()
            .iter()
            .map(|document| document.get_str("name").unwrap().to_string())
            .collect();

        assert_eq!(names, vec!["c", "a", "b"]);
    }
}
