//! Error types and result types for repository and pipeline operations.
//!
//! Every fallible operation in the crate returns [`DocPipeResult<T>`]. The
//! variants split into conditions the caller can act on (`InvalidArgument`,
//! `NotFound`, `DomainValidation`), faults that are fatal for the current
//! request (`StoreUnavailable`, `Serialization`, `Cancelled`) and wiring
//! mistakes detected at startup (`Configuration`).

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::validate::ValidationFailure;

/// Represents all failure kinds surfaced by the repository and the request
/// pipeline.
#[derive(Error, Debug)]
pub enum DocPipeError {
    /// A caller-supplied argument was rejected before any store access
    /// (malformed entity id, non-positive take, negative skip).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A point lookup matched no document.
    #[error("no document with id {id} in collection {collection}")]
    NotFound {
        /// Collection the lookup ran against.
        collection: &'static str,
        /// The id that matched nothing.
        id: String,
    },
    /// One or more validators rejected the request before its handler ran.
    /// Carries every failure, ordered by validator registration.
    #[error("validation failed for {request} ({} failure(s))", failures.len())]
    DomainValidation {
        /// Name of the rejected request type.
        request: &'static str,
        /// The full ordered failure list.
        failures: Vec<ValidationFailure>,
    },
    /// The document store could not be reached or the driver reported a
    /// transport fault. Fatal for the current request; never retried
    /// internally.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),
    /// Serialization/deserialization error when converting between entity
    /// and document representations (BSON, JSON).
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Startup wiring error: duplicate or missing handler registration,
    /// malformed connection settings.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The dispatch observed a cancelled token and abandoned its work.
    #[error("request cancelled")]
    Cancelled,
}

/// A specialized `Result` type for repository and pipeline operations.
pub type DocPipeResult<T> = Result<T, DocPipeError>;

impl From<BsonError> for DocPipeError {
    fn from(err: BsonError) -> Self {
        DocPipeError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocPipeError {
    fn from(err: SerdeJsonError) -> Self {
        DocPipeError::Serialization(err.to_string())
    }
}
