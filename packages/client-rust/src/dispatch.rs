use std::sync::Arc;

use switchyard_core::Action;

use crate::completion::{channel, Completion};
use crate::handler::ActionHandler;
use crate::listener::ActionListener;

/// A handler resolved for action `A`.
///
/// Resolution happens once, in [`ActionRegistry::resolve`](crate::ActionRegistry::resolve);
/// every call through a `BoundAction` reaches the same handler instance.
pub struct BoundAction<A: Action> {
    handler: Arc<dyn ActionHandler<A>>,
}

impl<A: Action> BoundAction<A> {
    pub(crate) fn new(handler: Arc<dyn ActionHandler<A>>) -> Self {
        Self { handler }
    }

    /// Starts the call and returns a handle to its eventual result.
    pub fn execute(&self, request: A::Request) -> Completion<A::Response> {
        let (completer, completion) = channel();
        self.handler.execute(request, completer);
        completion
    }

    /// Starts the call and reports its result to `listener`.
    ///
    /// The listener runs on whichever thread settles the call.
    pub fn execute_with<L>(&self, request: A::Request, listener: L)
    where
        L: ActionListener<A::Response>,
    {
        self.execute(request).add_listener(listener);
    }

    /// The bound handler.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn ActionHandler<A>> {
        &self.handler
    }
}

impl<A: Action> Clone for BoundAction<A> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<A: Action> std::fmt::Debug for BoundAction<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundAction")
            .field("action", &A::NAME)
            .finish_non_exhaustive()
    }
}
