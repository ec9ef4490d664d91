//! MongoDB storage backend for docpipe.
//!
//! Provides [`MongoStore`], a persistent
//! [`StoreBackend`](docpipe_core::backend::StoreBackend) over the official
//! MongoDB driver. Entities map one-to-one to documents with the id under
//! the native `_id` key; ids are assigned client-side on insert, the way the
//! drivers themselves do it.

mod filter;
mod store;

pub use store::{MongoStore, MongoStoreBuilder};
