//! Load-shedding middleware for actions.
//!
//! Rejects calls when more than `max_concurrent_actions` are already in
//! flight with `ActionError::Overloaded`.

use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::Semaphore;
use tower::{Layer, Service};

use crate::error::ActionError;
use crate::handler::BoxFuture;

// ---------------------------------------------------------------------------
// LoadShedLayer
// ---------------------------------------------------------------------------

/// Tower layer that limits concurrent calls to one action via a semaphore.
///
/// When all permits are taken, incoming calls are rejected immediately
/// rather than queued.
#[derive(Debug, Clone)]
pub struct LoadShedLayer {
    action: &'static str,
    semaphore: Arc<Semaphore>,
}

impl LoadShedLayer {
    #[must_use]
    pub fn new(action: &'static str, max_concurrent: u32) -> Self {
        Self {
            action,
            semaphore: Arc::new(Semaphore::new(max_concurrent as usize)),
        }
    }
}

impl<S> Layer<S> for LoadShedLayer {
    type Service = LoadShedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoadShedService {
            inner,
            action: self.action,
            semaphore: self.semaphore.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoadShedService
// ---------------------------------------------------------------------------

/// Clones share the layer's semaphore, so the limit holds across every
/// clone of the pipeline.
#[derive(Debug, Clone)]
pub struct LoadShedService<S> {
    inner: S,
    action: &'static str,
    semaphore: Arc<Semaphore>,
}

impl<S, R> Service<R> for LoadShedService<S>
where
    S: Service<R, Error = ActionError>,
    S::Response: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = ActionError;
    type Future = BoxFuture<S::Response>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: R) -> Self::Future {
        let Ok(permit) = self.semaphore.clone().try_acquire_owned() else {
            let action = self.action;
            return Box::pin(async move { Err(ActionError::Overloaded { action }) });
        };

        let fut = self.inner.call(request);
        Box::pin(async move {
            let result = fut.await;
            drop(permit);
            result
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use switchyard_core::messages::{CountRequest, CountResponse};
    use tower::{service_fn, ServiceExt};

    use super::*;

    fn slow_count(delay_ms: u64) -> impl Service<
        CountRequest,
        Response = CountResponse,
        Error = ActionError,
        Future = BoxFuture<CountResponse>,
    > + Clone {
        service_fn(move |_req: CountRequest| -> BoxFuture<CountResponse> {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(CountResponse::default())
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn allows_calls_under_limit() {
        let svc = LoadShedLayer::new("count", 10).layer(slow_count(1));
        let resp = svc.oneshot(CountRequest::default()).await.unwrap();
        assert_eq!(resp.count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_when_overloaded() {
        let svc = LoadShedLayer::new("count", 1).layer(slow_count(500));

        // First call takes the single permit.
        let in_flight = tokio::spawn(svc.clone().oneshot(CountRequest::default()));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let err = svc.oneshot(CountRequest::default()).await.unwrap_err();
        assert!(matches!(err, ActionError::Overloaded { action: "count" }));
        in_flight.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn permit_is_released_after_completion() {
        let svc = LoadShedLayer::new("count", 1).layer(slow_count(1));
        svc.clone().oneshot(CountRequest::default()).await.unwrap();
        svc.oneshot(CountRequest::default()).await.unwrap();
    }
}
