//! Document store entry points.
//!
//! A store owns the backend for the life of the process and hands out
//! short-lived, per-request [`Repository`] values that borrow it. Two
//! flavors exist:
//!
//! - [`DocumentStore`] - typed store bound to a concrete backend
//! - [`DynDocumentStore`] - boxed backend selected at runtime
//!
//! ```ignore
//! let store = DocumentStore::new(backend).into_dyn();
//! let products = store.repository::<Product>();
//! ```

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    entity::Entity,
    error::DocPipeResult,
    repository::Repository,
};

/// A document store bound to a concrete backend implementation.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns a repository for the entity type, bound to its collection.
    ///
    /// The repository borrows the store and is meant to live for one
    /// request.
    pub fn repository<E: Entity>(&self) -> Repository<'_, E>
    where
        B: 'static,
    {
        Repository::new(&self.backend)
    }

    /// Converts this store into a boxed-backend store.
    pub fn into_dyn(self) -> DynDocumentStore
    where
        B: 'static,
    {
        DynDocumentStore::new(Box::new(self.backend))
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> DocPipeResult<()> {
        self.backend.shutdown().await
    }
}

/// A document store over a backend chosen at runtime.
///
/// Handlers typically hold an `Arc<DynDocumentStore>` so wiring can swap the
/// in-memory backend for MongoDB without touching domain code.
#[derive(Debug)]
pub struct DynDocumentStore {
    backend: Box<dyn DynStoreBackend>,
}

impl DynDocumentStore {
    /// Creates a store over the given backend trait object.
    pub fn new(backend: Box<dyn DynStoreBackend>) -> Self {
        Self { backend }
    }

    /// Returns a repository for the entity type, bound to its collection.
    pub fn repository<E: Entity>(&self) -> Repository<'_, E> {
        Repository::new(&*self.backend)
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> DocPipeResult<()> {
        self.backend.shutdown_boxed().await
    }
}
