//! Validation middleware: runs [`ActionRequest::validate`] and fails the
//! call with `ActionError::Validation` without reaching the inner service.

use std::task::{Context, Poll};

use switchyard_core::ActionRequest;
use tower::{Layer, Service};

use crate::error::ActionError;
use crate::handler::BoxFuture;

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateLayer;

impl<S> Layer<S> for ValidateLayer {
    type Service = ValidateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidateService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct ValidateService<S> {
    inner: S,
}

impl<S, R> Service<R> for ValidateService<S>
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
        if let Err(errors) = request.validate() {
            return Box::pin(async move { Err(ActionError::from(errors)) });
        }
        let fut = self.inner.call(request);
        Box::pin(fut)
    }
}
