//! Rule parsing errors

/// Errors produced while parsing a single rule from an annotation string.
///
/// The validator never surfaces these to the user: a rule that fails to parse is
/// logged and dropped from the field's rule list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
    /// The annotation segment was empty (e.g. `"required||min:3"`).
    #[error("Empty rule")]
    Empty,

    /// The rule keyword is not known.
    #[error("Unknown rule '{0}'")]
    UnknownRule(String),

    /// The rule needs a parameter (`min:3`) but none was given.
    #[error("Rule '{rule}' requires a parameter")]
    MissingParameter { rule: String },

    /// The parameter could not be interpreted for this rule.
    #[error("Rule '{rule}' has invalid parameter '{param}'")]
    InvalidParameter { rule: String, param: String },
}

impl RuleParseError {
    /// Creates a new missing parameter error.
    pub fn missing(rule: impl Into<String>) -> Self {
        Self::MissingParameter { rule: rule.into() }
    }

    /// Creates a new invalid parameter error.
    pub fn invalid(rule: impl Into<String>, param: impl Into<String>) -> Self {
        Self::InvalidParameter {
            rule: rule.into(),
            param: param.into(),
        }
    }
}
