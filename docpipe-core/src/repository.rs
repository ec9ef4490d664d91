//! Generic CRUD repository over one entity collection.
//!
//! A [`Repository`] borrows a backend reference for the duration of one
//! request and binds to the entity's collection; it never owns the
//! collection's lifecycle. Beyond requiring an id field it is independent of
//! the entity's shape.
//!
//! Argument validation (id shape, paging window) happens here, before any
//! store access; connectivity faults from the backend propagate unchanged.
//! No operation retries internally — retry policy belongs to the caller.

use bson::oid::ObjectId;
use std::marker::PhantomData;

use crate::{
    backend::DynStoreBackend,
    entity::{Entity, EntityExt, parse_entity_id},
    error::{DocPipeError, DocPipeResult},
    filter::{DocumentQuery, Filter, Sort},
};

/// CRUD and query operations over one entity collection.
pub struct Repository<'a, E: Entity> {
    collection: &'static str,
    backend: &'a dyn DynStoreBackend,
    _marker: PhantomData<E>,
}

impl<'a, E: Entity> Repository<'a, E> {
    pub(crate) fn new(backend: &'a dyn DynStoreBackend) -> Self {
        Self {
            collection: E::collection_name(),
            backend,
            _marker: PhantomData,
        }
    }

    /// Returns the name of the collection this repository is bound to.
    pub fn collection_name(&self) -> &'static str {
        self.collection
    }

    /// Returns the entity with the given id.
    ///
    /// # Errors
    ///
    /// - [`DocPipeError::InvalidArgument`] when `id` is empty or not a
    ///   well-formed 24-hex-digit identifier (checked before store access)
    /// - [`DocPipeError::NotFound`] when no document matches
    pub async fn get_by_id(&self, id: &str) -> DocPipeResult<E> {
        let object_id = parse_entity_id(id)?;

        match self.backend.find_by_id(object_id, self.collection).await? {
            Some(document) => E::from_document(document),
            None => Err(DocPipeError::NotFound {
                collection: self.collection,
                id: id.to_string(),
            }),
        }
    }

    /// Persists one new entity and returns it with its store-assigned id
    /// populated.
    pub async fn add(&self, entity: E) -> DocPipeResult<E> {
        let document = entity.to_document()?;
        let id = self.backend.insert_document(document, self.collection).await?;

        tracing::debug!(collection = self.collection, id = %id, "inserted document");

        let mut entity = entity;
        entity.set_id(id);
        Ok(entity)
    }

    /// Bulk insert, returning the entities with their assigned ids.
    ///
    /// Not atomic as a unit: entities inserted before a mid-batch fault
    /// remain in the collection and the fault is surfaced.
    pub async fn add_many(&self, entities: Vec<E>) -> DocPipeResult<Vec<E>> {
        let documents = entities
            .iter()
            .map(EntityExt::to_document)
            .collect::<DocPipeResult<Vec<_>>>()?;
        let ids = self
            .backend
            .insert_documents(documents, self.collection)
            .await?;

        tracing::debug!(collection = self.collection, count = ids.len(), "bulk inserted documents");

        Ok(entities
            .into_iter()
            .zip(ids)
            .map(|(mut entity, id)| {
                entity.set_id(id);
                entity
            })
            .collect())
    }

    /// Replaces the stored entity sharing this entity's id.
    ///
    /// Returns `true` iff a document was matched and modified. An id that
    /// matches nothing returns `false` — no error, and no insert.
    ///
    /// # Errors
    ///
    /// [`DocPipeError::InvalidArgument`] when the entity has no assigned id.
    pub async fn update(&self, entity: &E) -> DocPipeResult<bool> {
        let id = *self.require_id(entity)?;

        self.backend
            .replace_document(id, entity.to_document()?, self.collection)
            .await
    }

    /// Sequentially replaces each entity by id.
    ///
    /// Individual unmatched ids are not surfaced per item; the first backend
    /// fault aborts the remainder.
    pub async fn update_many(&self, entities: &[E]) -> DocPipeResult<()> {
        for entity in entities {
            self.update(entity).await?;
        }

        Ok(())
    }

    /// Deletes the entity with the given id.
    ///
    /// Deleting an id that matches nothing is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// [`DocPipeError::InvalidArgument`] when `id` is empty or malformed.
    pub async fn delete_by_id(&self, id: &str) -> DocPipeResult<()> {
        let object_id = parse_entity_id(id)?;

        self.backend.delete_by_id(object_id, self.collection).await
    }

    /// Deletes the given entity by its id.
    ///
    /// # Errors
    ///
    /// [`DocPipeError::InvalidArgument`] when the entity has no assigned id.
    pub async fn delete(&self, entity: &E) -> DocPipeResult<()> {
        let id = *self.require_id(entity)?;

        self.backend.delete_by_id(id, self.collection).await
    }

    /// Deletes every entity matching the predicate and returns the deleted
    /// count.
    pub async fn delete_matching(&self, filter: Filter) -> DocPipeResult<u64> {
        self.backend
            .delete_documents(Some(filter), self.collection)
            .await
    }

    /// Removes every entity in the collection and returns the deleted count.
    ///
    /// Used primarily for test and reset scenarios.
    pub async fn delete_all(&self) -> DocPipeResult<u64> {
        self.backend.delete_documents(None, self.collection).await
    }

    /// Counts entities matching the filter, or all entities when the filter
    /// is absent.
    pub async fn count(&self, filter: Option<Filter>) -> DocPipeResult<u64> {
        self.backend.count_documents(filter, self.collection).await
    }

    /// Returns `true` iff at least one entity matches the predicate.
    pub async fn exists(&self, filter: Filter) -> DocPipeResult<bool> {
        let matches = self
            .backend
            .query_documents(
                DocumentQuery {
                    filter: Some(filter),
                    sort: None,
                    skip: 0,
                    take: Some(1),
                },
                self.collection,
            )
            .await?;

        Ok(!matches.is_empty())
    }

    /// Returns a page of entities.
    ///
    /// The window applies after the filter and sort: filter, then sort, then
    /// skip, then take. When `take` is absent, everything from `skip` on is
    /// returned.
    ///
    /// # Errors
    ///
    /// [`DocPipeError::InvalidArgument`] when `take <= 0` or `skip < 0`,
    /// raised before any store access.
    pub async fn get(
        &self,
        take: Option<i64>,
        skip: i64,
        filter: Option<Filter>,
        sort: Option<Sort>,
    ) -> DocPipeResult<Vec<E>> {
        if let Some(take) = take {
            if take <= 0 {
                return Err(DocPipeError::InvalidArgument(format!(
                    "take must be greater than 0, got {take}"
                )));
            }
        }
        if skip < 0 {
            return Err(DocPipeError::InvalidArgument(format!(
                "skip must not be negative, got {skip}"
            )));
        }

        let query = DocumentQuery {
            filter,
            sort,
            skip: skip as u64,
            take: take.map(|take| take as u64),
        };

        self.backend
            .query_documents(query, self.collection)
            .await?
            .into_iter()
            .map(E::from_document)
            .collect()
    }

    fn require_id<'e>(&self, entity: &'e E) -> DocPipeResult<&'e ObjectId> {
        entity.id().ok_or_else(|| {
            DocPipeError::InvalidArgument(format!(
                "entity in collection {} has no assigned id",
                self.collection
            ))
        })
    }
}
