//! Request validation: failures, validators and the validation behavior.
//!
//! Validators are registered per request type at wiring time. The
//! [`ValidationBehavior`] runs every validator registered for the request
//! concurrently, collects the union of their failures and either lets the
//! chain continue (empty union) or short-circuits with
//! [`DomainValidation`](crate::error::DocPipeError::DomainValidation)
//! carrying the full ordered list. A request type with no validators always
//! passes.
//!
//! Validators read only the request value; they must not mutate it or have
//! side effects observable outside validation. They are async so a validator
//! can consult the store for existence checks.
//!
//! The module also ships the two reusable rules the sample domain needs:
//! paging windows ([`PagingValidator`]) and entity ids
//! ([`IdentifierValidator`]).

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{DocPipeError, DocPipeResult},
    request::{Behavior, Next, Request},
};

/// A single reason a request was rejected: the offending field and a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// The request field the rule applies to.
    pub field: String,
    /// Why the field was rejected.
    pub message: String,
}

impl ValidationFailure {
    /// Creates a failure for the given field.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A rule set producing zero or more failures for one request type.
#[async_trait]
pub trait Validator<R: Request>: Send + Sync {
    /// Checks the request and returns every failure found.
    ///
    /// Fallible so a validator that needs the store (existence checks) can
    /// surface backend faults; pure validators simply return `Ok`.
    async fn validate(
        &self,
        request: &R,
        token: &CancellationToken,
    ) -> DocPipeResult<Vec<ValidationFailure>>;
}

/// Pipeline behavior enforcing validation before business logic executes.
///
/// Registered validators run concurrently; their failure lists are reported
/// in validator-registration order regardless of completion order, so error
/// output is reproducible across runs.
pub struct ValidationBehavior<R: Request> {
    validators: Vec<Arc<dyn Validator<R>>>,
}

impl<R: Request> ValidationBehavior<R> {
    /// Creates a behavior with no validators (every request passes).
    pub fn new() -> Self {
        Self { validators: Vec::new() }
    }

    /// Appends a validator; order of registration is the reporting order.
    pub fn with_validator(mut self, validator: impl Validator<R> + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }
}

impl<R: Request> Default for ValidationBehavior<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Request> Behavior<R> for ValidationBehavior<R> {
    async fn handle(
        &self,
        request: &R,
        token: &CancellationToken,
        next: Next<'_, R::Response>,
    ) -> DocPipeResult<R::Response> {
        if self.validators.is_empty() {
            return next().await;
        }

        tracing::debug!(request = R::name(), "validating request");

        // join_all yields results in input order, which restores
        // validator-registration order after the concurrent run.
        let results = join_all(
            self.validators
                .iter()
                .map(|validator| validator.validate(request, token)),
        )
        .await;

        let mut failures = Vec::new();
        for result in results {
            failures.extend(result?);
        }

        if failures.is_empty() {
            return next().await;
        }

        tracing::warn!(
            request = R::name(),
            failures = failures.len(),
            "request rejected by validation"
        );

        Err(DocPipeError::DomainValidation { request: R::name(), failures })
    }
}

/// Capability trait for requests that carry a paging window.
pub trait PagingRequest {
    /// Requested page size.
    fn page_size(&self) -> i64;
    /// Zero-based page index.
    fn page_index(&self) -> i64;
}

/// Validates the paging window of any [`PagingRequest`].
pub struct PagingValidator;

#[async_trait]
impl<R: Request + PagingRequest> Validator<R> for PagingValidator {
    async fn validate(
        &self,
        request: &R,
        _token: &CancellationToken,
    ) -> DocPipeResult<Vec<ValidationFailure>> {
        let mut failures = Vec::new();

        if request.page_size() <= 0 {
            failures.push(ValidationFailure::new("page_size", "must be greater than 0"));
        }
        if request.page_index() < 0 {
            failures.push(ValidationFailure::new(
                "page_index",
                "must be greater than or equal to 0",
            ));
        }

        Ok(failures)
    }
}

/// Capability trait for requests addressing one entity by id.
pub trait IdentifiedRequest {
    /// The entity id the request targets.
    fn id(&self) -> &str;
}

/// Validates the id of any [`IdentifiedRequest`]: non-empty and a
/// well-formed 24-hex-digit identifier.
pub struct IdentifierValidator;

#[async_trait]
impl<R: Request + IdentifiedRequest> Validator<R> for IdentifierValidator {
    async fn validate(
        &self,
        request: &R,
        _token: &CancellationToken,
    ) -> DocPipeResult<Vec<ValidationFailure>> {
        let id = request.id();

        if id.trim().is_empty() {
            return Ok(vec![ValidationFailure::new("id", "must not be empty")]);
        }
        if ObjectId::parse_str(id).is_err() {
            return Ok(vec![ValidationFailure::new(
                "id",
                "must be a 24-character hexadecimal string",
            )]);
        }

        Ok(Vec::new())
    }
}
