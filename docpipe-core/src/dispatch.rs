//! Request dispatch: pipelines and the dispatcher registry.
//!
//! A [`Pipeline`] binds one handler to an ordered behavior list and composes
//! them by continuation passing: the first-registered behavior is outermost,
//! the handler innermost. The [`Dispatcher`] maps each request type to its
//! pipeline; registration happens once at startup through
//! [`DispatcherBuilder`], and registering two handlers for the same request
//! type is a configuration error caught there, not at dispatch time.

use futures::future::BoxFuture;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::{DocPipeError, DocPipeResult},
    request::{Behavior, Handler, Next, Request},
};

/// One handler wrapped by an ordered behavior chain.
pub struct Pipeline<R: Request> {
    handler: Arc<dyn Handler<R>>,
    behaviors: Vec<Arc<dyn Behavior<R>>>,
}

impl<R: Request> Pipeline<R> {
    /// Creates a pipeline around the request type's single handler.
    pub fn new(handler: impl Handler<R> + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            behaviors: Vec::new(),
        }
    }

    /// Appends a behavior to the chain.
    ///
    /// Behaviors run in registration order: the first added is outermost.
    pub fn with_behavior(mut self, behavior: impl Behavior<R> + 'static) -> Self {
        self.behaviors.push(Arc::new(behavior));
        self
    }

    /// Runs the request through the behavior chain and handler.
    pub async fn send(
        &self,
        request: R,
        token: &CancellationToken,
    ) -> DocPipeResult<R::Response> {
        if token.is_cancelled() {
            return Err(DocPipeError::Cancelled);
        }

        Self::invoke(&request, token, &self.behaviors, &*self.handler).await
    }

    fn invoke<'a>(
        request: &'a R,
        token: &'a CancellationToken,
        behaviors: &'a [Arc<dyn Behavior<R>>],
        handler: &'a dyn Handler<R>,
    ) -> BoxFuture<'a, DocPipeResult<R::Response>> {
        match behaviors.split_first() {
            Some((outer, rest)) => {
                let next: Next<'a, R::Response> =
                    Box::new(move || Self::invoke(request, token, rest, handler));
                outer.handle(request, token, next)
            }
            None => handler.handle(request, token),
        }
    }
}

/// Routes each request value to the pipeline registered for its type.
///
/// The registry is immutable after [`DispatcherBuilder::build`]; dispatching
/// is lock-free and safe to share across tasks.
pub struct Dispatcher {
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Dispatcher {
    /// Starts building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Dispatches a request to its registered pipeline and returns the
    /// response, failing with the innermost unhandled fault.
    ///
    /// # Errors
    ///
    /// [`DocPipeError::Configuration`] when no pipeline is registered for
    /// the request type; otherwise whatever the chain raises.
    pub async fn dispatch<R: Request>(
        &self,
        request: R,
        token: &CancellationToken,
    ) -> DocPipeResult<R::Response> {
        let pipeline = self
            .pipelines
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.downcast_ref::<Pipeline<R>>())
            .ok_or_else(|| {
                DocPipeError::Configuration(format!(
                    "no handler registered for request type {}",
                    R::name()
                ))
            })?;

        pipeline.send(request, token).await
    }
}

/// Builder assembling the dispatch registry at startup.
#[derive(Default)]
pub struct DispatcherBuilder {
    pipelines: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl DispatcherBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the pipeline for a request type.
    ///
    /// # Errors
    ///
    /// [`DocPipeError::Configuration`] when a pipeline for the same request
    /// type was already registered.
    pub fn register<R: Request>(mut self, pipeline: Pipeline<R>) -> DocPipeResult<Self> {
        if self.pipelines.contains_key(&TypeId::of::<R>()) {
            return Err(DocPipeError::Configuration(format!(
                "a handler is already registered for request type {}",
                R::name()
            )));
        }

        self.pipelines.insert(TypeId::of::<R>(), Box::new(pipeline));
        Ok(self)
    }

    /// Finalizes the registry.
    pub fn build(self) -> Dispatcher {
        Dispatcher { pipelines: self.pipelines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Echo {
        value: String,
    }

    impl Request for Echo {
        type Response = String;

        fn name() -> &'static str {
            "Echo"
        }
    }

    struct EchoHandler {
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Handler<Echo> for EchoHandler {
        async fn handle(
            &self,
            request: &Echo,
            _token: &CancellationToken,
        ) -> DocPipeResult<String> {
            self.calls.lock().unwrap().push("handler");
            Ok(request.value.clone())
        }
    }

    struct Recording {
        label: &'static str,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Behavior<Echo> for Recording {
        async fn handle(
            &self,
            _request: &Echo,
            _token: &CancellationToken,
            next: Next<'_, String>,
        ) -> DocPipeResult<String> {
            self.calls.lock().unwrap().push(self.label);
            let result = next().await;
            self.calls.lock().unwrap().push(self.label);
            result
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl Behavior<Echo> for ShortCircuit {
        async fn handle(
            &self,
            _request: &Echo,
            _token: &CancellationToken,
            _next: Next<'_, String>,
        ) -> DocPipeResult<String> {
            Err(DocPipeError::InvalidArgument("rejected".to_string()))
        }
    }

    fn request(value: &str) -> Echo {
        Echo { value: value.to_string() }
    }

    #[tokio::test]
    async fn handler_result_flows_back_unchanged() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(EchoHandler { calls });

        let response = pipeline
            .send(request("hello"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response, "hello");
    }

    #[tokio::test]
    async fn first_registered_behavior_is_outermost() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(EchoHandler { calls: calls.clone() })
            .with_behavior(Recording { label: "outer", calls: calls.clone() })
            .with_behavior(Recording { label: "inner", calls: calls.clone() });

        pipeline
            .send(request("x"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["outer", "inner", "handler", "inner", "outer"]
        );
    }

    #[tokio::test]
    async fn short_circuiting_behavior_skips_the_handler() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(EchoHandler { calls: calls.clone() })
            .with_behavior(ShortCircuit)
            .with_behavior(Recording { label: "inner", calls: calls.clone() });

        let result = pipeline.send(request("x"), &CancellationToken::new()).await;

        assert!(matches!(result, Err(DocPipeError::InvalidArgument(_))));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_is_observed_before_the_chain_runs() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(EchoHandler { calls: calls.clone() });
        let token = CancellationToken::new();
        token.cancel();

        let result = pipeline.send(request("x"), &token).await;

        assert!(matches!(result, Err(DocPipeError::Cancelled)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dispatcher_routes_to_the_registered_pipeline() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = Dispatcher::builder()
            .register(Pipeline::new(EchoHandler { calls }))
            .unwrap()
            .build();

        let response = dispatcher
            .dispatch(request("routed"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(response, "routed");
    }

    #[tokio::test]
    async fn dispatching_an_unregistered_request_is_a_configuration_error() {
        let dispatcher = Dispatcher::builder().build();

        let result = dispatcher
            .dispatch(request("lost"), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(DocPipeError::Configuration(_))));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected_at_startup() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let builder = Dispatcher::builder()
            .register(Pipeline::new(EchoHandler { calls: calls.clone() }))
            .unwrap();

        let result = builder.register(Pipeline::new(EchoHandler { calls }));

        assert!(matches!(result, Err(DocPipeError::Configuration(_))));
    }
}
