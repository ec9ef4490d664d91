use async_trait::async_trait;
use bson::{Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    options::{ClientOptions, FindOptions},
};

use docpipe_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{DocPipeError, DocPipeResult},
    filter::{DocumentQuery, Filter, FilterVisitor, SortDirection},
};

use crate::filter::MongoFilterTranslator;

/// MongoDB storage backend over the official driver.
///
/// The client is a process-wide connection pool; repositories borrow it per
/// request. Single-document operations are atomic on the server; bulk
/// inserts are ordered and not atomic as a unit.
#[derive(Debug)]
pub struct MongoStore {
    client: Client,
    database: String,
}

impl MongoStore {
    /// Creates a store over an already-connected client.
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    /// Creates a builder that connects from a DSN string.
    pub fn builder(dsn: &str, database: &str) -> MongoStoreBuilder {
        MongoStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> Collection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    fn translate_filter(filter: &Option<Filter>) -> DocPipeResult<Document> {
        match filter {
            Some(filter) => MongoFilterTranslator.visit_filter(filter),
            None => Ok(doc! {}),
        }
    }
}

// Driver faults are transport faults from the contract's point of view:
// fatal for the current request, surfaced as-is, never retried here.
fn store_unavailable(err: mongodb::error::Error) -> DocPipeError {
    DocPipeError::StoreUnavailable(err.to_string())
}

#[async_trait]
impl StoreBackend for MongoStore {
    async fn find_by_id(
        &self,
        id: ObjectId,
        collection: &str,
    ) -> DocPipeResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(doc! { "_id": id })
            .await
            .map_err(store_unavailable)
    }

    async fn insert_document(
        &self,
        mut document: Document,
        collection: &str,
    ) -> DocPipeResult<ObjectId> {
        let id = match document.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        self.get_collection(collection)
            .insert_one(document)
            .await
            .map_err(store_unavailable)?;

        tracing::debug!(collection, id = %id, "inserted document");

        Ok(id)
    }

    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
    ) -> DocPipeResult<Vec<ObjectId>> {
        let mut documents = documents;
        let mut ids = Vec::with_capacity(documents.len());

        for document in &mut documents {
            let id = match document.get_object_id("_id") {
                Ok(id) => id,
                Err(_) => {
                    let id = ObjectId::new();
                    document.insert("_id", id);
                    id
                }
            };
            ids.push(id);
        }

        // Ordered insert: documents before a mid-batch fault remain.
        self.get_collection(collection)
            .insert_many(documents)
            .await
            .map_err(store_unavailable)?;

        tracing::debug!(collection, count = ids.len(), "bulk inserted documents");

        Ok(ids)
    }

    async fn replace_document(
        &self,
        id: ObjectId,
        document: Document,
        collection: &str,
    ) -> DocPipeResult<bool> {
        let result = self
            .get_collection(collection)
            .replace_one(doc! { "_id": id }, document)
            .await
            .map_err(store_unavailable)?;

        Ok(result.modified_count > 0)
    }

    async fn delete_by_id(&self, id: ObjectId, collection: &str) -> DocPipeResult<()> {
        self.get_collection(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(store_unavailable)?;

        Ok(())
    }

    async fn delete_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64> {
        let result = self
            .get_collection(collection)
            .delete_many(Self::translate_filter(&filter)?)
            .await
            .map_err(store_unavailable)?;

        tracing::debug!(collection, deleted = result.deleted_count, "deleted documents");

        Ok(result.deleted_count)
    }

    async fn count_documents(
        &self,
        filter: Option<Filter>,
        collection: &str,
    ) -> DocPipeResult<u64> {
        self.get_collection(collection)
            .count_documents(Self::translate_filter(&filter)?)
            .await
            .map_err(store_unavailable)
    }

    async fn query_documents(
        &self,
        query: DocumentQuery,
        collection: &str,
    ) -> DocPipeResult<Vec<Document>> {
        // The server applies filter, sort, skip and limit in that order,
        // which is exactly the paging-stability contract.
        let mut options = FindOptions::default();

        if query.skip > 0 {
            options.skip = Some(query.skip);
        }
        if let Some(take) = query.take {
            options.limit = Some(take as i64);
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(doc! {
                sort.field.clone(): match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            });
        }

        self.get_collection(collection)
            .find(Self::translate_filter(&query.filter)?)
            .with_options(options)
            .await
            .map_err(store_unavailable)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(store_unavailable)
    }

    async fn shutdown(self) -> DocPipeResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// Builder connecting a [`MongoStore`] from a DSN and database name.
pub struct MongoStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoStoreBuilder {
    /// Creates a builder from connection settings.
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoStoreBuilder {
    type Backend = MongoStore;

    async fn build(self) -> DocPipeResult<Self::Backend> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| DocPipeError::Configuration(e.to_string()))?;
        let client = Client::with_options(options)
            .map_err(|e| DocPipeError::Configuration(e.to_string()))?;

        Ok(MongoStore::new(client, self.database))
    }
}
