//! Switchyard core: action identifiers, request/response messages, and request validation.

pub mod action;
pub mod messages;
pub mod validation;

pub use action::{action_names, Action, ActionRequest};
pub use validation::ValidationError;
