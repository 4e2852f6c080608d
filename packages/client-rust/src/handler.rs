//! The contract every action handler satisfies, plus the stock adapters.
//!
//! A handler receives a typed request and a [`Completer`] and must settle the
//! completer exactly once, inline or later from a worker. Handlers own all
//! validation of their requests.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;
use switchyard_core::Action;
use tower::{Service, ServiceExt};

use crate::completion::Completer;
use crate::error::{ActionError, ActionResult};
use crate::thread_pool::Executor;

/// Boxed future returned by type-erased action services.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = ActionResult<T>> + Send>>;

// ---------------------------------------------------------------------------
// ActionHandler trait
// ---------------------------------------------------------------------------

/// Executes one action.
///
/// Object safe, so handlers are stored as `Arc<dyn ActionHandler<A>>` and
/// resolved from the [`ActionRegistry`](crate::ActionRegistry).
pub trait ActionHandler<A: Action>: Send + Sync + 'static {
    /// Starts executing `request` and eventually settles `completer`.
    fn execute(&self, request: A::Request, completer: Completer<A::Response>);
}

// ---------------------------------------------------------------------------
// ServiceHandler
// ---------------------------------------------------------------------------

/// Runs a `tower::Service` on a worker-pool executor for each call.
///
/// The service is cloned per call and driven with `oneshot`, so it must be
/// cheap to clone (an `Arc` inside, or a middleware stack over one).
pub struct ServiceHandler<A, S> {
    service: S,
    executor: Executor,
    _action: PhantomData<fn() -> A>,
}

impl<A, S> ServiceHandler<A, S>
where
    A: Action,
{
    pub fn new(executor: Executor, service: S) -> Self {
        Self {
            service,
            executor,
            _action: PhantomData,
        }
    }
}

impl<A, S> ActionHandler<A> for ServiceHandler<A, S>
where
    A: Action,
    S: Service<A::Request, Response = A::Response, Error = ActionError>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    fn execute(&self, request: A::Request, completer: Completer<A::Response>) {
        let service = self.service.clone();
        let slot = Arc::new(Mutex::new(Some(completer)));
        let task_slot = slot.clone();
        let spawned = self.executor.spawn(async move {
            let completer = task_slot.lock().take();
            if let Some(completer) = completer {
                completer.set(service.oneshot(request).await);
            }
        });
        // A rejected task was dropped unrun, so the completer is still here.
        if let Err(rejected) = spawned {
            let completer = slot.lock().take();
            if let Some(completer) = completer {
                completer.fail(rejected);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unimplemented
// ---------------------------------------------------------------------------

/// Stand-in for an action a deployment deliberately leaves unwired. Every
/// call fails with [`ActionError::NotImplemented`].
pub struct Unimplemented<A>(PhantomData<fn() -> A>);

impl<A> Unimplemented<A> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<A> Default for Unimplemented<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> ActionHandler<A> for Unimplemented<A> {
    fn execute(&self, _request: A::Request, completer: Completer<A::Response>) {
        completer.fail(ActionError::NotImplemented { action: A::NAME });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use switchyard_core::messages::{IndexRequest, IndexResponse, PercolateRequest};
    use switchyard_core::action::{IndexAction, PercolateAction};
    use tower::service_fn;

    use super::*;
    use crate::completion::channel;
    use crate::config::ThreadPoolConfig;
    use crate::thread_pool::{executor_names, ThreadPool};

    fn index_service(
    ) -> impl Service<IndexRequest, Response = IndexResponse, Error = ActionError, Future = BoxFuture<IndexResponse>>
           + Clone
           + Send
           + Sync
           + 'static {
        service_fn(|req: IndexRequest| -> BoxFuture<IndexResponse> {
            Box::pin(async move {
                Ok(IndexResponse {
                    index: req.index,
                    id: req.id.unwrap_or_else(|| "generated".to_string()),
                    version: 1,
                    created: true,
                })
            })
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn service_handler_settles_on_executor() {
        let pool = ThreadPool::from_current(&ThreadPoolConfig::default()).unwrap();
        let handler = ServiceHandler::<IndexAction, _>::new(
            pool.executor_or_generic(executor_names::INDEX),
            index_service(),
        );

        let (completer, completion) = channel();
        handler.execute(IndexRequest::new("users", json!({"a": 1})).with_id("1"), completer);

        let resp = tokio::time::timeout(Duration::from_secs(1), completion)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resp.id, "1");
        assert!(resp.created);
    }

    #[tokio::test]
    async fn service_handler_rejects_after_shutdown() {
        let pool = ThreadPool::from_current(&ThreadPoolConfig::default()).unwrap();
        let handler = ServiceHandler::<IndexAction, _>::new(
            pool.executor_or_generic(executor_names::INDEX),
            index_service(),
        );
        pool.shutdown();

        let (completer, completion) = channel();
        handler.execute(IndexRequest::new("users", json!({})), completer);
        assert!(matches!(
            completion.try_get(),
            Some(Err(ActionError::Rejected { executor: "index" }))
        ));
    }

    #[test]
    fn unimplemented_fails_inline() {
        let handler = Unimplemented::<PercolateAction>::new();
        let (completer, completion) = channel();
        handler.execute(PercolateRequest::new("queries", json!({"msg": "hi"})), completer);
        assert!(matches!(
            completion.try_get(),
            Some(Err(ActionError::NotImplemented { action: "percolate" }))
        ));
    }
}
