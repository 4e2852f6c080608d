//! Request validation failures.
//!
//! Requests validate themselves and report every problem at once rather than
//! stopping at the first one, so callers can fix a request in a single pass.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Accumulated validation failures for a single request.
///
/// Renders as `Validation Failed: 1: <first>;2: <second>;`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationError {
    errors: Vec<String>,
}

impl ValidationError {
    /// Creates an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failure message.
    pub fn add(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Records every failure of `nested`, each prefixed with `prefix`.
    ///
    /// Used by composite requests (bulk, multi-get) to report which item failed.
    pub fn extend_prefixed(&mut self, prefix: &str, nested: ValidationError) {
        self.errors
            .extend(nested.errors.into_iter().map(|e| format!("{prefix}{e}")));
    }

    /// Returns the recorded failure messages in insertion order.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns `true` when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts the accumulated failures into a validation result.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation Failed: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "{}: {error};", i + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Records `"<field> is missing"` when `value` is empty or whitespace only.
pub(crate) fn require(errors: &mut ValidationError, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(format!("{field} is missing"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_error_set_is_ok() {
        assert!(ValidationError::new().into_result().is_ok());
    }

    #[test]
    fn display_numbers_each_failure() {
        let mut errors = ValidationError::new();
        errors.add("index is missing");
        errors.add("id is missing");

        assert_eq!(
            errors.to_string(),
            "Validation Failed: 1: index is missing;2: id is missing;"
        );
    }

    #[test]
    fn extend_prefixed_keeps_order() {
        let mut nested = ValidationError::new();
        nested.add("id is missing");

        let mut errors = ValidationError::new();
        errors.add("first");
        errors.extend_prefixed("item 3: ", nested);

        assert_eq!(errors.errors(), ["first", "item 3: id is missing"]);
    }

    #[test]
    fn require_flags_blank_values() {
        let mut errors = ValidationError::new();
        require(&mut errors, "index", "  ");
        require(&mut errors, "id", "1");
        assert_eq!(errors.errors(), ["index is missing"]);
    }
}
