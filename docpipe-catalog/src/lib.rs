//! Sample product-catalog domain built on the docpipe core.
//!
//! Demonstrates the intended shape of a consumer: one entity
//! ([`product::Product`]), a write request ([`commands::AddProduct`]), two
//! read requests ([`queries::GetProducts`], [`queries::GetProduct`]) and the
//! startup wiring that binds each request to its handler, validators and the
//! logging behavior.

pub mod commands;
pub mod product;
pub mod queries;

use std::sync::Arc;

use docpipe_core::{
    dispatch::{Dispatcher, Pipeline},
    error::DocPipeResult,
    logging::LoggingBehavior,
    store::DynDocumentStore,
    validate::{IdentifierValidator, PagingValidator, ValidationBehavior},
};

use crate::{
    commands::{AddProduct, AddProductHandler, AddProductValidator},
    queries::{GetProduct, GetProductHandler, GetProducts, GetProductsHandler},
};

/// Builds the dispatcher for the catalog domain.
///
/// Every pipeline gets the logging behavior outermost, then validation, then
/// its handler. Called once at startup; a duplicate registration would
/// surface here as a configuration error.
pub fn catalog_dispatcher(store: Arc<DynDocumentStore>) -> DocPipeResult<Dispatcher> {
    Ok(Dispatcher::builder()
        .register(
            Pipeline::new(AddProductHandler::new(store.clone()))
                .with_behavior(LoggingBehavior)
                .with_behavior(
                    ValidationBehavior::<AddProduct>::new().with_validator(AddProductValidator),
                ),
        )?
        .register(
            Pipeline::new(GetProductsHandler::new(store.clone()))
                .with_behavior(LoggingBehavior)
                .with_behavior(
                    ValidationBehavior::<GetProducts>::new().with_validator(PagingValidator),
                ),
        )?
        .register(
            Pipeline::new(GetProductHandler::new(store))
                .with_behavior(LoggingBehavior)
                .with_behavior(
                    ValidationBehavior::<GetProduct>::new().with_validator(IdentifierValidator),
                ),
        )?
        .build())
}
