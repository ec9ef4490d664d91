//! Request, handler and behavior contracts for the dispatch pipeline.
//!
//! A [`Request`] is an immutable intent value (create, query) with exactly
//! one response type and exactly one [`Handler`]. [`Behavior`]s wrap handler
//! execution to add cross-cutting concerns; each receives the request, the
//! cancellation token and a [`Next`] continuation standing for the remainder
//! of the chain, handler included.

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::error::DocPipeResult;

/// An intent value routed through the pipeline to its single handler.
///
/// Requests are constructed by the caller, consumed by one dispatch and
/// discarded once the response is produced.
pub trait Request: Send + Sync + 'static {
    /// The single response type this request produces.
    type Response: Send + 'static;

    /// A stable name for logs and error reports.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Business logic for one request type.
#[async_trait]
pub trait Handler<R: Request>: Send + Sync {
    /// Produces the response for the request.
    ///
    /// The token lets the handler abandon in-flight store work when the
    /// caller gives up; dropping the future is the cancellation mechanism
    /// for the store calls themselves.
    async fn handle(
        &self,
        request: &R,
        token: &CancellationToken,
    ) -> DocPipeResult<R::Response>;
}

/// The remainder of a behavior chain, handler included.
///
/// Calling it consumes it; a behavior that never calls it short-circuits the
/// chain.
pub type Next<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, DocPipeResult<T>> + Send + 'a>;

/// A composable unit wrapping handler execution.
///
/// A behavior may call `next()` and return its result unchanged or
/// transformed, return without calling `next()` at all, or run work after
/// `next()` resolves. The first error anywhere in the chain propagates
/// straight to the caller; work done before the faulting call is not undone.
#[async_trait]
pub trait Behavior<R: Request>: Send + Sync {
    /// Runs this behavior around the rest of the chain.
    async fn handle(
        &self,
        request: &R,
        token: &CancellationToken,
        next: Next<'_, R::Response>,
    ) -> DocPipeResult<R::Response>;
}
