//! In-memory storage backend for docpipe.
//!
//! Provides [`MemoryStore`], a fully functional [`StoreBackend`]
//! (docpipe_core::backend::StoreBackend) that keeps every collection in
//! process memory behind async read-write locks. It is the backend of choice
//! for tests and local development.

mod evaluator;
mod store;

pub use store::{MemoryStore, MemoryStoreBuilder};
