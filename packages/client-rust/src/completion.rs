//! One-shot result delivery shared by every action call.
//!
//! [`channel`] returns a write half ([`Completer`]) for the handler and a
//! read half ([`Completion`]) for the caller. The completion starts pending
//! and settles exactly once, to a response or an [`ActionError`]. Every
//! observer sees that one recorded outcome:
//!
//! - blocking: [`Completion::get`] / [`Completion::get_timeout`]
//! - callback: [`Completion::add_listener`] / [`Completion::on_complete`]
//! - async: `completion.await`
//!
//! Callbacks registered before settlement run on the settling thread;
//! callbacks registered afterwards run immediately on the registering thread.

use std::future::Future;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{error, warn};

use crate::error::{ActionError, ActionResult};
use crate::listener::ActionListener;

type Callback<T> = Box<dyn FnOnce(ActionResult<T>) + Send>;

enum State<T> {
    Pending {
        callbacks: Vec<Callback<T>>,
        wakers: Vec<Waker>,
    },
    Done(ActionResult<T>),
}

struct Shared<T> {
    state: Mutex<State<T>>,
    settled: Condvar,
}

impl<T: Clone + Send + 'static> Shared<T> {
    fn pending() -> Self {
        Self {
            state: Mutex::new(State::Pending {
                callbacks: Vec::new(),
                wakers: Vec::new(),
            }),
            settled: Condvar::new(),
        }
    }

    /// Records the outcome and notifies every observer. The first outcome
    /// wins; later attempts are dropped and return `false`.
    fn settle(&self, result: ActionResult<T>) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, State::Done(_)) {
            drop(state);
            warn!(
                rejected_ok = result.is_ok(),
                "completion already settled, ignoring second result"
            );
            return false;
        }
        let previous = mem::replace(&mut *state, State::Done(result.clone()));
        drop(state);
        let State::Pending { callbacks, wakers } = previous else {
            return false;
        };

        self.settled.notify_all();
        for waker in wakers {
            waker.wake();
        }
        for callback in callbacks {
            invoke(callback, result.clone());
        }
        true
    }
}

fn invoke<T>(callback: Callback<T>, result: ActionResult<T>) {
    if panic::catch_unwind(AssertUnwindSafe(|| callback(result))).is_err() {
        error!("completion listener panicked");
    }
}

/// Creates a pending completion and the handle that settles it.
#[must_use]
pub fn channel<T: Clone + Send + 'static>() -> (Completer<T>, Completion<T>) {
    let shared = Arc::new(Shared::pending());
    (
        Completer {
            shared: Some(shared.clone()),
        },
        Completion { shared },
    )
}

// ---------------------------------------------------------------------------
// Completion (read half)
// ---------------------------------------------------------------------------

/// Observer handle for the eventual outcome of one action call.
///
/// Cheap to clone; all clones observe the same outcome.
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let done = matches!(*self.shared.state.lock(), State::Done(_));
        f.debug_struct("Completion").field("done", &done).finish()
    }
}

impl<T: Clone + Send + 'static> Completion<T> {
    /// A completion that is already settled.
    #[must_use]
    pub fn ready(result: ActionResult<T>) -> Self {
        let shared = Shared::pending();
        shared.settle(result);
        Self {
            shared: Arc::new(shared),
        }
    }

    /// `true` once the outcome has been recorded.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(*self.shared.state.lock(), State::Done(_))
    }

    /// Returns the outcome if already recorded, without blocking.
    #[must_use]
    pub fn try_get(&self) -> Option<ActionResult<T>> {
        match &*self.shared.state.lock() {
            State::Done(result) => Some(result.clone()),
            State::Pending { .. } => None,
        }
    }

    /// Blocks the calling thread until the outcome is recorded.
    ///
    /// Do not call this from a runtime thread the handler needs in order to
    /// finish; `.await` the completion there instead.
    ///
    /// # Errors
    ///
    /// Returns the failure the handler reported.
    pub fn get(&self) -> ActionResult<T> {
        let mut state = self.shared.state.lock();
        loop {
            if let State::Done(result) = &*state {
                return result.clone();
            }
            self.shared.settled.wait(&mut state);
        }
    }

    /// Blocks for at most `timeout`.
    ///
    /// Giving up only affects this caller: the handler keeps running and the
    /// outcome stays observable through any other observer.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::WaitTimeout`] if nothing was recorded in time,
    /// otherwise the failure the handler reported.
    pub fn get_timeout(&self, timeout: Duration) -> ActionResult<T> {
        let mut state = self.shared.state.lock();
        if let State::Done(result) = &*state {
            return result.clone();
        }
        // A deadline past the end of `Instant` is the same as no deadline.
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            drop(state);
            return self.get();
        };
        loop {
            if let State::Done(result) = &*state {
                return result.clone();
            }
            if self
                .shared
                .settled
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                if let State::Done(result) = &*state {
                    return result.clone();
                }
                return Err(ActionError::WaitTimeout {
                    waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
        }
    }

    /// Runs `callback` once with the outcome.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce(ActionResult<T>) + Send + 'static,
    {
        let mut state = self.shared.state.lock();
        let result = match &mut *state {
            State::Pending { callbacks, .. } => {
                callbacks.push(Box::new(callback));
                return;
            }
            State::Done(result) => result.clone(),
        };
        drop(state);
        invoke(Box::new(callback), result);
    }

    /// Delivers the outcome to `listener`.
    pub fn add_listener<L>(&self, listener: L)
    where
        L: ActionListener<T>,
    {
        self.on_complete(move |result| listener.on_result(result));
    }
}

impl<T: Clone + Send + 'static> Future for Completion<T> {
    type Output = ActionResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.shared.state.lock();
        match &mut *state {
            State::Done(result) => Poll::Ready(result.clone()),
            State::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Completer (write half)
// ---------------------------------------------------------------------------

/// Settles a [`Completion`]. Consumed by settling, so one completer can
/// settle at most once.
///
/// Dropping a completer without settling fails the completion with
/// [`ActionError::Abandoned`].
pub struct Completer<T: Clone + Send + 'static> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T: Clone + Send + 'static> Completer<T> {
    /// Records `result`. Returns `false` if the completion was already settled.
    pub fn set(mut self, result: ActionResult<T>) -> bool {
        match self.shared.take() {
            Some(shared) => shared.settle(result),
            None => false,
        }
    }

    pub fn complete(self, response: T) -> bool {
        self.set(Ok(response))
    }

    pub fn fail(self, error: impl Into<ActionError>) -> bool {
        self.set(Err(error.into()))
    }

    /// A read half for the same call.
    #[must_use]
    pub fn completion(&self) -> Option<Completion<T>> {
        self.shared.as_ref().map(|shared| Completion {
            shared: shared.clone(),
        })
    }
}

impl<T: Clone + Send + 'static> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            warn!("completer dropped without a result");
            shared.settle(Err(ActionError::Abandoned));
        }
    }
}

impl<T: Clone + Send + 'static> ActionListener<T> for Completer<T> {
    fn on_response(self, response: T) {
        self.complete(response);
    }

    fn on_failure(self, error: ActionError) {
        self.fail(error);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
