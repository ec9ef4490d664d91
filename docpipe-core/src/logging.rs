//! Logging behavior: request-scoped tracing around the rest of the chain.

use async_trait::async_trait;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{
    error::DocPipeResult,
    request::{Behavior, Next, Request},
};

/// Emits a tracing event when a request is dispatched and another when it
/// completes or fails, with the elapsed time.
///
/// Applies to every request type; register it outermost so the timing spans
/// the whole chain.
pub struct LoggingBehavior;

#[async_trait]
impl<R: Request> Behavior<R> for LoggingBehavior {
    async fn handle(
        &self,
        _request: &R,
        _token: &CancellationToken,
        next: Next<'_, R::Response>,
    ) -> DocPipeResult<R::Response> {
        let started = Instant::now();
        tracing::info!(request = R::name(), "dispatching request");

        match next().await {
            Ok(response) => {
                tracing::info!(
                    request = R::name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "request completed"
                );
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(
                    request = R::name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "request failed"
                );
                Err(err)
            }
        }
    }
}
