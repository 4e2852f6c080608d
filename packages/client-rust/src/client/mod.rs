//! Typed facades over the action registry.
//!
//! Each facade resolves every action it exposes once, at construction, and
//! exposes a method pair per action:
//!
//! - `op(request) -> Completion<Response>`
//! - `op_with(request, listener)`
//!
//! plus the generic `execute::<A>` / `execute_with::<A>` for any action the
//! facade implements [`Dispatch`] for.

use switchyard_core::Action;

use crate::completion::Completion;
use crate::dispatch::BoundAction;
use crate::listener::ActionListener;

/// Access to the handler a facade resolved for action `A`.
pub trait Dispatch<A: Action> {
    fn bound(&self) -> &BoundAction<A>;

    fn dispatch(&self, request: A::Request) -> Completion<A::Response> {
        self.bound().execute(request)
    }

    fn dispatch_with<L>(&self, request: A::Request, listener: L)
    where
        L: ActionListener<A::Response>,
    {
        self.bound().execute_with(request, listener);
    }
}

/// Generates a facade struct holding one [`BoundAction`] per listed action,
/// its construction-time resolution, the typed method pairs, the generic
/// dispatchers, and a [`Dispatch`] impl per action.
///
/// Extra non-action fields go in an optional `fields { .. }` block and are
/// passed to the generated `resolve_actions` in declaration order.
macro_rules! action_facade {
    (
        $(#[$meta:meta])*
        $vis:vis struct $facade:ident {
            $(fields { $( $extra:ident : $extra_ty:ty ),* $(,)? })?
            actions {
                $(
                    $(#[$op_meta:meta])*
                    $op:ident / $op_with:ident => $action:ty
                ),+ $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $facade {
            $($( $extra: $extra_ty, )*)?
            $( $op: $crate::dispatch::BoundAction<$action>, )+
        }

        impl $facade {
            fn resolve_actions(
                registry: &$crate::registry::ActionRegistry,
                $($( $extra: $extra_ty, )*)?
            ) -> ::std::result::Result<Self, $crate::error::ConfigError> {
                let facade = Self {
                    $($( $extra, )*)?
                    $( $op: registry.resolve::<$action>()?, )+
                };
                ::tracing::debug!(facade = stringify!($facade), "facade constructed");
                Ok(facade)
            }

            $(
                $(#[$op_meta])*
                pub fn $op(
                    &self,
                    request: <$action as ::switchyard_core::Action>::Request,
                ) -> $crate::completion::Completion<<$action as ::switchyard_core::Action>::Response> {
                    self.$op.execute(request)
                }

                #[doc = concat!("Callback form of [`Self::", stringify!($op), "`].")]
                pub fn $op_with<L>(
                    &self,
                    request: <$action as ::switchyard_core::Action>::Request,
                    listener: L,
                ) where
                    L: $crate::listener::ActionListener<<$action as ::switchyard_core::Action>::Response>,
                {
                    self.$op.execute_with(request, listener);
                }
            )+

            /// Runs any action this facade exposes.
            pub fn execute<A>(&self, request: A::Request) -> $crate::completion::Completion<A::Response>
            where
                A: ::switchyard_core::Action,
                Self: $crate::client::Dispatch<A>,
            {
                <Self as $crate::client::Dispatch<A>>::dispatch(self, request)
            }

            /// Callback form of [`Self::execute`].
            pub fn execute_with<A, L>(&self, request: A::Request, listener: L)
            where
                A: ::switchyard_core::Action,
                Self: $crate::client::Dispatch<A>,
                L: $crate::listener::ActionListener<A::Response>,
            {
                <Self as $crate::client::Dispatch<A>>::dispatch_with(self, request, listener);
            }
        }

        $(
            impl $crate::client::Dispatch<$action> for $facade {
                fn bound(&self) -> &$crate::dispatch::BoundAction<$action> {
                    &self.$op
                }
            }
        )+
    };
}

mod admin;
mod node;

pub use admin::{AdminClient, ClusterAdminClient, IndicesAdminClient};
pub use node::NodeClient;
