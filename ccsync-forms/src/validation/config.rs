//! Validator configuration

/// What a rule does when it cannot be evaluated.
///
/// This covers a `custom:` pattern that failed to compile and a `match:`,
/// `time-before:` or `time-after:` reference to a field the form does not have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Unresolved {
    /// Treat the rule as passing. Existing forms rely on this.
    #[default]
    Pass,
    /// Treat the rule as failing with [`ValidatorConfig::unresolved_message`].
    Fail,
}

/// Configuration for a [`FormValidator`](super::FormValidator).
///
/// # Example
///
/// ```
/// use ccsync_forms::validation::{Unresolved, ValidatorConfig};
///
/// let config = ValidatorConfig::default().with_unresolved(Unresolved::Fail);
/// ```
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Behavior for rules that cannot be evaluated.
    ///
    /// Default: [`Unresolved::Pass`]
    pub unresolved: Unresolved,

    /// Message reported when an unresolvable rule fails closed.
    pub unresolved_message: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            unresolved: Unresolved::Pass,
            unresolved_message: "This field cannot be validated".to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the behavior for unresolvable rules.
    pub fn with_unresolved(mut self, unresolved: Unresolved) -> Self {
        self.unresolved = unresolved;
        self
    }

    /// Sets the message used when an unresolvable rule fails closed.
    pub fn with_unresolved_message(mut self, message: impl Into<String>) -> Self {
        self.unresolved_message = message.into();
        self
    }
}
