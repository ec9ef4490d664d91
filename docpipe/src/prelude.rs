//! Convenient re-exports of commonly used types from docpipe.
//!
//! ```ignore
//! use docpipe::prelude::*;
//! ```

pub use docpipe_core::{
    backend::{DynStoreBackend, StoreBackend, StoreBackendBuilder},
    dispatch::{Dispatcher, DispatcherBuilder, Pipeline},
    entity::{Entity, EntityExt},
    error::{DocPipeError, DocPipeResult},
    filter::{DocumentQuery, FieldOp, Filter, FilterVisitor, Sort, SortDirection},
    logging::LoggingBehavior,
    page::Page,
    repository::Repository,
    request::{Behavior, Handler, Next, Request},
    store::{DocumentStore, DynDocumentStore},
    validate::{
        IdentifiedRequest, IdentifierValidator, PagingRequest, PagingValidator,
        ValidationBehavior, ValidationFailure, Validator,
    },
};
