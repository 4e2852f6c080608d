//! Timeout middleware for actions.
//!
//! Fails calls that run longer than their request's own timeout, or the
//! configured default, with `ActionError::Timeout`.

use std::task::{Context, Poll};
use std::time::Duration;

use switchyard_core::ActionRequest;
use tower::{Layer, Service};

use crate::error::ActionError;
use crate::handler::BoxFuture;

// ---------------------------------------------------------------------------
// TimeoutLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps services with per-call timeout enforcement.
///
/// The timeout is read from each request's [`ActionRequest::timeout`],
/// falling back to `default_timeout`.
#[derive(Debug, Clone)]
pub struct TimeoutLayer {
    action: &'static str,
    default_timeout: Duration,
}

impl TimeoutLayer {
    #[must_use]
    pub fn new(action: &'static str, default_timeout: Duration) -> Self {
        Self {
            action,
            default_timeout,
        }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            action: self.action,
            default_timeout: self.default_timeout,
        }
    }
}

// ---------------------------------------------------------------------------
// TimeoutService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
    action: &'static str,
    default_timeout: Duration,
}

impl<S, R> Service<R> for TimeoutService<S>
where
    R: ActionRequest,
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
        let duration = request.timeout().unwrap_or(self.default_timeout);
        let action = self.action;
        let fut = self.inner.call(request);
        Box::pin(async move {
            match tokio::time::timeout(duration, fut).await {
                Ok(result) => result,
                Err(_elapsed) => Err(ActionError::Timeout {
                    action,
                    timeout_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                }),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
