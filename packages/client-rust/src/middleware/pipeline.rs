//! Pipeline composition: combines all middleware layers into a single service stack.

use std::time::Duration;

use switchyard_core::Action;
use tower::{Service, ServiceBuilder};

use super::load_shed::LoadShedLayer;
use super::metrics::MetricsLayer;
use super::timeout::TimeoutLayer;
use super::validate::ValidateLayer;
use crate::config::ClientConfig;
use crate::error::ActionError;
use crate::handler::{BoxFuture, ServiceHandler};
use crate::thread_pool::ThreadPool;

/// Wraps the service implementing action `A` with the middleware layers.
///
/// Layer order (outermost to innermost):
/// 1. `LoadShedLayer` -- reject when overloaded (fail fast before doing any work)
/// 2. `ValidateLayer` -- reject malformed requests
/// 3. `MetricsLayer` -- record timing and outcome, timeouts included
/// 4. `TimeoutLayer` -- enforce per-call timeouts (closest to the actual service)
///
/// Clones of the returned service share one concurrency limit.
pub fn build_action_pipeline<A, S>(
    service: S,
    config: &ClientConfig,
) -> impl Service<A::Request, Response = A::Response, Error = ActionError, Future = BoxFuture<A::Response>>
       + Clone
       + Send
       + Sync
       + 'static
where
    A: Action,
    S: Service<A::Request, Response = A::Response, Error = ActionError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    ServiceBuilder::new()
        .layer(LoadShedLayer::new(A::NAME, config.max_concurrent_actions))
        .layer(ValidateLayer)
        .layer(MetricsLayer::new(A::NAME, config.node_name.as_str()))
        .layer(TimeoutLayer::new(
            A::NAME,
            Duration::from_millis(config.default_action_timeout_ms),
        ))
        .service(service)
}

/// Builds the pipeline for `service` and binds it to the named executor of
/// `pool`, ready to register as the handler for `A`.
pub fn pipeline_handler<A, S>(
    pool: &ThreadPool,
    executor: &str,
    service: S,
    config: &ClientConfig,
) -> ServiceHandler<
    A,
    impl Service<A::Request, Response = A::Response, Error = ActionError, Future = BoxFuture<A::Response>>
        + Clone
        + Send
        + Sync
        + 'static,
>
where
    A: Action,
    S: Service<A::Request, Response = A::Response, Error = ActionError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    ServiceHandler::new(
        pool.executor_or_generic(executor),
        build_action_pipeline::<A, S>(service, config),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
