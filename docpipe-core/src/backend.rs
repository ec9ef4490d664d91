//! Storage backend abstraction for the document store.
//!
//! [`StoreBackend`] is the unified async interface every storage
//! implementation provides: point lookups, id-assigning inserts, full
//! replaces, idempotent deletes, counts and windowed queries. Repositories
//! never talk to a database directly; they delegate to a backend through
//! this trait.
//!
//! [`DynStoreBackend`] is the object-safe mirror, blanket-implemented for
//! every `StoreBackend + 'static`, so a backend chosen at runtime can sit
//! behind `Box<dyn DynStoreBackend>` without generic plumbing.
//! [`StoreBackendBuilder`] is the async factory each backend's builder
//! implements.
//!
//! Implementations must be thread-safe (`Send + Sync`): the backend is a
//! process-wide, long-lived resource borrowed concurrently by per-request
//! repositories. Consistency relies on the backend's own per-document
//! atomicity; multi-document operations are not atomic as a unit.

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use std::fmt::Debug;

use crate::{error::DocPipeResult, filter::{DocumentQuery, Filter}};

/// Abstract interface for document storage backends.
///
/// All methods are suspension points. Cancellation is cooperative: dropping
/// the returned future aborts the operation best-effort, without rolling
/// back work the store already committed.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Retrieves the document with the given id, or `None` when no document
    /// matches.
    async fn find_by_id(
        &self,
        id: ObjectId,
        collection: &str,
    ) -> DocPipeResult<Option<Document>>;

    /// Inserts one document and returns its id.
    ///
    /// When the document carries no `_id` field the backend assigns a fresh
    /// [`ObjectId`]; a caller-provided `_id` is honored. The collection is
    /// created implicitly if it does not exist.
    async fn insert_document(
        &self,
        document: Document,
        collection: &str,
    ) -> DocPipeResult<ObjectId>;

    /// Inserts documents in order and returns their ids.
    ///
    /// NOT atomic as a unit: documents inserted before a mid-batch fault
    /// remain in the collection and the fault is surfaced.
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> DocPipeResult<Vec<ObjectId>>;

    /// Replaces the document with the given id entirely.
    ///
    /// Returns `true` iff a document was matched and modified. An unmatched
    /// id is not a fault — the method returns `false` and never inserts.
    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> DocPipeResult<bool>;

    /// Deletes the document with the given id.
    ///
    /// Deleting an id that matches nothing is a no-op (idempotent).
    async fn delete_by_id(&self, id: ObjectId, collection: &str) -> DocPipeResult<()>;

    /// Deletes every document matching the filter and returns the deleted
    /// count. `None` deletes the whole collection.
    async fn delete_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64>;

    /// Counts documents matching the filter, or all documents when the
    /// filter is absent.
    async fn count_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64>;

    /// Runs a windowed read.
    ///
    /// The query parts apply strictly in the order filter, then sort, then
    /// skip, then take. Implementations must preserve that order — repeated
    /// reads over an unmodified collection page stably only because of it.
    async fn query_documents(
        &self,
        query: DocumentQuery,
        collection: &str,
    ) -> DocPipeResult<Vec<Document>>;

    /// Cleanly shuts down the backend, releasing connections and caches.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocPipeResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Object-safe mirror of [`StoreBackend`] for runtime backend selection.
#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    /// See [`StoreBackend::find_by_id`].
    async fn find_by_id(
        &self,
        id: ObjectId,
        collection: &str,
    ) -> DocPipeResult<Option<Document>>;
    /// See [`StoreBackend::insert_document`].
    async fn insert_document(
        &self,
        document: Document,
        collection: &str,
    ) -> DocPipeResult<ObjectId>;
    /// See [`StoreBackend::insert_documents`].
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> DocPipeResult<Vec<ObjectId>>;
    /// See [`StoreBackend::replace_document`].
    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> DocPipeResult<bool>;
    /// See [`StoreBackend::delete_by_id`].
    async fn delete_by_id(&self, id: ObjectId, collection: &str) -> DocPipeResult<()>;
    /// See [`StoreBackend::delete_documents`].
    async fn delete_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64>;
    /// See [`StoreBackend::count_documents`].
    async fn count_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64>;
    /// See [`StoreBackend::query_documents`].
    async fn query_documents(
        &self,
        query: DocumentQuery,
        collection: &str,
    ) -> DocPipeResult<Vec<Document>>;
    /// See [`StoreBackend::shutdown`].
    async fn shutdown_boxed(self: Box<Self>) -> DocPipeResult<()>;
}

#[async_trait]
impl<B: StoreBackend + 'static> DynStoreBackend for B {
    async fn find_by_id(
        &self,
        id: ObjectId,
        collection: &str,
    ) -> DocPipeResult<Option<Document>> {
        StoreBackend::find_by_id(self, id, collection).await
    }

    async fn insert_document(
        &self,
        document: Document,
        collection: &str,
    ) -> DocPipeResult<ObjectId> {
        StoreBackend::insert_document(self, document, collection).await
    }

    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> DocPipeResult<Vec<ObjectId>> {
        StoreBackend::insert_documents(self, documents, collection).await
    }

    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> DocPipeResult<bool> {
        StoreBackend::replace_document(self, id, document, collection).await
    }

    async fn delete_by_id(&self, id: ObjectId, collection: &str) -> DocPipeResult<()> {
        StoreBackend::delete_by_id(self, id, collection).await
    }

    async fn delete_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64> {
        StoreBackend::delete_documents(self, filter, collection).await
    }

    async fn count_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64> {
        StoreBackend::count_documents(self, filter, collection).await
    }

    async fn query_documents(
        &self,
        query: DocumentQuery,
        collection: &str,
    ) -> DocPipeResult<Vec<Document>> {
        StoreBackend::query_documents(self, query, collection).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> DocPipeResult<()> {
        StoreBackend::shutdown(*self).await
    }
}

/// Async factory trait for constructing backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    /// The backend type this builder produces.
    type Backend: StoreBackend;

    /// Builds the backend, establishing whatever state it needs.
    async fn build(self) -> DocPipeResult<Self::Backend>;
}
