//! Metrics middleware for actions.
//!
//! Records call duration and outcome on a `tracing` span and as `metrics`
//! counters and histograms. Without an installed recorder the `metrics`
//! calls are no-ops.

use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::time::Instant;
use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::error::ActionError;
use crate::handler::BoxFuture;

/// Counter of finished calls, labelled by `action` and `outcome`.
pub const ACTIONS_TOTAL: &str = "switchyard_actions_total";
/// Histogram of call durations in seconds, labelled by `action`.
pub const ACTION_DURATION_SECONDS: &str = "switchyard_action_duration_seconds";

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments one action with timing and counting.
///
/// Spans carry the action name and the name of the node the client runs on.
#[derive(Debug, Clone)]
pub struct MetricsLayer {
    action: &'static str,
    node: Arc<str>,
}

impl MetricsLayer {
    #[must_use]
    pub fn new(action: &'static str, node: impl Into<Arc<str>>) -> Self {
        Self {
            action,
            node: node.into(),
        }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            action: self.action,
            node: self.node.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
    action: &'static str,
    node: Arc<str>,
}

impl<S, R> Service<R> for MetricsService<S>
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
        let action = self.action;
        let span = info_span!(
            "action",
            action = action,
            node = %self.node,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(request);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();

                let outcome = match &result {
                    Ok(_) => "ok",
                    Err(err) if err.is_timeout() => "timeout",
                    Err(_) => "error",
                };

                let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
                tracing::Span::current().record("duration_ms", duration_ms);
                tracing::Span::current().record("outcome", outcome);

                metrics::counter!(ACTIONS_TOTAL, "action" => action, "outcome" => outcome)
                    .increment(1);
                metrics::histogram!(ACTION_DURATION_SECONDS, "action" => action)
                    .record(elapsed.as_secs_f64());

                tracing::debug!(action, duration_ms, outcome, "action complete");

                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
