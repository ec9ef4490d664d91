//! Core contracts for a thin CRUD layer: a generic document repository over
//! pluggable store backends, and a request pipeline that wraps each handler
//! in an ordered chain of cross-cutting behaviors.
//!
//! This crate provides:
//!
//! - **Entity traits** ([`entity`]) - Persisted records with store-assigned ids
//! - **Store backend abstraction** ([`backend`]) - Traits for storage implementations
//! - **Filters and queries** ([`filter`]) - Structural predicates, sorting, paging windows
//! - **Repository** ([`repository`]) - CRUD and windowed reads over one collection
//! - **Document stores** ([`store`]) - Backend owners handing out per-request repositories
//! - **Request pipeline** ([`request`], [`dispatch`]) - Typed requests, handlers, behaviors
//! - **Validation** ([`validate`]) - Validators and the short-circuiting validation behavior
//! - **Logging** ([`logging`]) - Request-scoped tracing behavior
//! - **Error handling** ([`error`]) - The failure taxonomy and result alias
//! - **Paging** ([`page`]) - Items-plus-total page shape
//!
//! # Example
//!
//! ```ignore
//! use docpipe_core::{entity::Entity, store::DynDocumentStore};
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct Product {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub name: String,
//! }
//!
//! impl Entity for Product {
//!     fn id(&self) -> Option<&ObjectId> {
//!         self.id.as_ref()
//!     }
//!
//!     fn set_id(&mut self, id: ObjectId) {
//!         self.id = Some(id);
//!     }
//!
//!     fn collection_name() -> &'static str {
//!         "products"
//!     }
//! }
//!
//! # async fn example(store: &DynDocumentStore) -> docpipe_core::error::DocPipeResult<()> {
//! let products = store.repository::<Product>();
//! let stored = products.add(Product { id: None, name: "Prod1".to_string() }).await?;
//! assert!(stored.id().is_some());
//! # Ok(()) }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docpipe_core;

pub mod backend;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod filter;
pub mod logging;
pub mod page;
pub mod repository;
pub mod request;
pub mod store;
pub mod validate;
