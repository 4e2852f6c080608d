use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use switchyard_core::Action;
use tracing::debug;

use crate::dispatch::BoundAction;
use crate::error::ConfigError;
use crate::handler::ActionHandler;

// ---------------------------------------------------------------------------
// HandlerBinding
// ---------------------------------------------------------------------------

/// A handler erased to `Any`, remembering which action type it was built for.
///
/// The erased value is an `Arc<dyn ActionHandler<A>>`; resolution downcasts
/// it back once, when a facade is constructed.
#[derive(Clone)]
pub struct HandlerBinding {
    action_type: TypeId,
    action_type_name: &'static str,
    handler: Arc<dyn Any + Send + Sync>,
}

impl HandlerBinding {
    /// Binds a handler for action `A`.
    pub fn new<A: Action>(handler: impl ActionHandler<A>) -> Self {
        Self::from_arc::<A>(Arc::new(handler))
    }

    /// Binds an already shared handler for action `A`.
    #[must_use]
    pub fn from_arc<A: Action>(handler: Arc<dyn ActionHandler<A>>) -> Self {
        Self {
            action_type: TypeId::of::<A>(),
            action_type_name: type_name::<A>(),
            handler: Arc::new(handler),
        }
    }

    /// Type name of the action this binding was built for.
    #[must_use]
    pub fn action_type_name(&self) -> &'static str {
        self.action_type_name
    }

    fn downcast<A: Action>(&self) -> Option<Arc<dyn ActionHandler<A>>> {
        if self.action_type != TypeId::of::<A>() {
            return None;
        }
        self.handler
            .downcast_ref::<Arc<dyn ActionHandler<A>>>()
            .cloned()
    }
}

impl std::fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("action", &self.action_type_name)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// ActionRegistryBuilder
// ---------------------------------------------------------------------------

/// Collects handler bindings. The only place bindings can be added.
#[derive(Debug, Default)]
pub struct ActionRegistryBuilder {
    bindings: Vec<(String, HandlerBinding)>,
}

impl ActionRegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` under `A::NAME`.
    #[must_use]
    pub fn register<A: Action>(self, handler: impl ActionHandler<A>) -> Self {
        self.bind(A::NAME, HandlerBinding::new::<A>(handler))
    }

    /// Binds a shared handler under `A::NAME`.
    #[must_use]
    pub fn register_arc<A: Action>(self, handler: Arc<dyn ActionHandler<A>>) -> Self {
        self.bind(A::NAME, HandlerBinding::from_arc::<A>(handler))
    }

    /// Binds `binding` under an arbitrary identifier. Whether the binding fits
    /// the action that identifier names is checked when a facade resolves it.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>, binding: HandlerBinding) -> Self {
        self.bindings.push((name.into(), binding));
        self
    }

    /// Freezes the bindings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateHandler`] if an identifier was bound twice.
    pub fn build(self) -> Result<ActionRegistry, ConfigError> {
        let mut bindings = HashMap::with_capacity(self.bindings.len());
        for (name, binding) in self.bindings {
            if bindings.contains_key(&name) {
                return Err(ConfigError::DuplicateHandler { action: name });
            }
            bindings.insert(name, binding);
        }
        debug!(actions = bindings.len(), "action registry built");
        Ok(ActionRegistry { bindings })
    }
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

/// Immutable map from action identifier to handler.
///
/// Nothing can be added or replaced after [`ActionRegistryBuilder::build`],
/// so reads need no locking.
#[derive(Debug)]
pub struct ActionRegistry {
    bindings: HashMap<String, HandlerBinding>,
}

impl ActionRegistry {
    #[must_use]
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::new()
    }

    /// Resolves the handler bound under `A::NAME`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingHandler`] if nothing is bound under that
    /// name, or [`ConfigError::HandlerTypeMismatch`] if the binding was built
    /// for a different action type.
    pub fn resolve<A: Action>(&self) -> Result<BoundAction<A>, ConfigError> {
        let binding = self
            .bindings
            .get(A::NAME)
            .ok_or(ConfigError::MissingHandler { action: A::NAME })?;
        let handler = binding
            .downcast::<A>()
            .ok_or(ConfigError::HandlerTypeMismatch {
                action: A::NAME,
                expected: type_name::<A>(),
                found: binding.action_type_name,
            })?;
        debug!(action = A::NAME, "resolved action handler");
        Ok(BoundAction::new(handler))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bound identifiers, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use switchyard_core::action::{CountAction, GetAction, SearchAction};
    use switchyard_core::messages::{CountRequest, CountResponse};

    use super::*;
    use crate::completion::Completer;
    use crate::handler::Unimplemented;

    /// Counts calls and answers with the running total.
    struct CountingHandler {
        calls: AtomicU32,
    }

    impl ActionHandler<CountAction> for CountingHandler {
        fn execute(&self, _request: CountRequest, completer: Completer<CountResponse>) {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            completer.complete(CountResponse {
                count: u64::from(n),
                ..CountResponse::default()
            });
        }
    }

    #[test]
    fn register_and_resolve() {
        let registry = ActionRegistry::builder()
            .register::<CountAction>(CountingHandler {
                calls: AtomicU32::new(0),
            })
            .build()
            .unwrap();

        let count = registry.resolve::<CountAction>().unwrap();
        let resp = count.execute(CountRequest::default()).get().unwrap();
        assert_eq!(resp.count, 1);
        assert!(registry.contains("count"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolve_unbound_action_is_missing() {
        let registry = ActionRegistry::builder().build().unwrap();
        assert!(registry.is_empty());
        let err = registry.resolve::<SearchAction>().unwrap_err();
        assert_eq!(err, ConfigError::MissingHandler { action: "search" });
    }

    #[test]
    fn binding_for_wrong_action_is_a_type_mismatch() {
        let registry = ActionRegistry::builder()
            .bind(
                "search",
                HandlerBinding::new::<GetAction>(Unimplemented::<GetAction>::new()),
            )
            .build()
            .unwrap();

        let err = registry.resolve::<SearchAction>().unwrap_err();
        match err {
            ConfigError::HandlerTypeMismatch {
                action,
                expected,
                found,
            } => {
                assert_eq!(action, "search");
                assert!(expected.ends_with("SearchAction"));
                assert!(found.ends_with("GetAction"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_binding_fails_build() {
        let err = ActionRegistry::builder()
            .register::<GetAction>(Unimplemented::new())
            .register::<GetAction>(Unimplemented::new())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateHandler {
                action: "get".to_string()
            }
        );
    }

    #[test]
    fn resolve_returns_the_bound_instance() {
        let shared: Arc<dyn ActionHandler<CountAction>> = Arc::new(CountingHandler {
            calls: AtomicU32::new(0),
        });
        let registry = ActionRegistry::builder()
            .register_arc::<CountAction>(shared.clone())
            .build()
            .unwrap();

        let first = registry.resolve::<CountAction>().unwrap();
        let second = registry.resolve::<CountAction>().unwrap();
        assert!(Arc::ptr_eq(first.handler(), &shared));
        assert!(Arc::ptr_eq(second.handler(), &shared));
    }

    #[test]
    fn names_are_sorted() {
        let registry = ActionRegistry::builder()
            .register::<SearchAction>(Unimplemented::new())
            .register::<CountAction>(Unimplemented::new())
            .register::<GetAction>(Unimplemented::new())
            .build()
            .unwrap();
        assert_eq!(registry.names(), vec!["count", "get", "search"]);
    }
}
