//! Callback side of an action call.
//!
//! A listener receives exactly one of `on_response` / `on_failure`. It runs
//! on whichever thread settles the call, usually a worker-pool thread, so it
//! must not block for long.

use crate::error::{ActionError, ActionResult};

/// Receives the outcome of one action call.
pub trait ActionListener<T>: Send + 'static {
    fn on_response(self, response: T);

    fn on_failure(self, error: ActionError);

    /// Dispatches a result to the matching callback.
    fn on_result(self, result: ActionResult<T>)
    where
        Self: Sized,
    {
        match result {
            Ok(response) => self.on_response(response),
            Err(error) => self.on_failure(error),
        }
    }
}

/// Listener assembled from a success closure and a failure closure.
pub struct FnListener<S, F> {
    on_success: S,
    on_failure: F,
}

/// Builds a listener from two closures.
pub fn listener<T, S, F>(on_success: S, on_failure: F) -> FnListener<S, F>
where
    S: FnOnce(T) + Send + 'static,
    F: FnOnce(ActionError) + Send + 'static,
{
    FnListener {
        on_success,
        on_failure,
    }
}

impl<T, S, F> ActionListener<T> for FnListener<S, F>
where
    S: FnOnce(T) + Send + 'static,
    F: FnOnce(ActionError) + Send + 'static,
{
    fn on_response(self, response: T) {
        (self.on_success)(response);
    }

    fn on_failure(self, error: ActionError) {
        (self.on_failure)(error);
    }
}
