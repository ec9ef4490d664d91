//! Main docpipe crate: a thin document-repository and request-pipeline layer
//! for building CRUD services.
//!
//! This crate is the primary entry point. It re-exports the core contracts
//! and the storage backends:
//!
//! - **Generic repository** - CRUD, counts and windowed reads over one
//!   entity collection, independent of the entity's shape beyond an id
//! - **Request pipeline** - typed requests routed to exactly one handler,
//!   wrapped by an ordered behavior chain (logging, validation)
//! - **Backends** - in-memory ([`memory`]) and MongoDB ([`mongodb`], behind
//!   the `mongodb` feature)
//!
//! # Quick Start
//!
//! ```ignore
//! use docpipe::{prelude::*, memory::MemoryStore};
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub name: String,
//! }
//!
//! impl Entity for User {
//!     fn id(&self) -> Option<&ObjectId> { self.id.as_ref() }
//!     fn set_id(&mut self, id: ObjectId) { self.id = Some(id); }
//!     fn collection_name() -> &'static str { "users" }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // One long-lived store; repositories borrow it per request.
//!     let store = Arc::new(DocumentStore::new(MemoryStore::new()).into_dyn());
//!
//!     let users = store.repository::<User>();
//!     let stored = users
//!         .add(User { id: None, name: "Alice".to_string() })
//!         .await
//!         .unwrap();
//!
//!     let found = users.get_by_id(&stored.id.unwrap().to_hex()).await.unwrap();
//!     assert_eq!(found.name, "Alice");
//! }
//! ```
//!
//! # Dispatching requests
//!
//! Handlers never get called directly: the caller builds a request value and
//! hands it to the dispatcher, which runs the behavior chain registered for
//! that request type (first registered is outermost) and returns the
//! handler's response or the innermost fault.
//!
//! ```ignore
//! use docpipe::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(dispatcher: Dispatcher) -> DocPipeResult<()> {
//! let token = CancellationToken::new();
//! let page = dispatcher.dispatch(ListWidgets::default(), &token).await?;
//! # Ok(()) }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb` feature)

pub mod prelude;

pub use docpipe_core::{
    backend, dispatch, entity, error, filter, logging, page, repository, request, store, validate,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docpipe_memory::{MemoryStore, MemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docpipe_mongodb::{MongoStore, MongoStoreBuilder};
}
