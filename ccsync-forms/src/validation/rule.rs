//! Validation rules and their evaluation.

use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};
use regex::Regex;

use super::config::Unresolved;
use super::surface::FormSurface;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email shape pattern"));

static PHONE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?\(?\d{3}\)?[-\s.]?\d{3}[-\s.]?\d{4,6}$").expect("phone shape pattern")
});

/// Type alias for host-supplied predicates.
type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// A single declarative constraint on a field value.
///
/// Rules are normally parsed from an annotation with
/// [`parse_rules`](super::parse_rules). [`Rule::Check`] is the exception: it wraps
/// a closure and can only be added in code.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Value must be non-empty.
    Required,
    /// Non-empty value must have at least this many characters.
    Min(usize),
    /// Non-empty value must have at most this many characters.
    Max(usize),
    /// `local@domain.tld`.
    Email,
    /// A valid calendar date.
    Date,
    /// A date strictly after today.
    DateFuture,
    /// A date other than today.
    DateNotToday,
    /// Sorts before the named field's value. Compares untrimmed values.
    TimeBefore(String),
    /// Sorts at or after the named field's value. Compares untrimmed values.
    TimeAfter(String),
    /// ASCII digits only.
    Numeric,
    /// Letters and spaces only.
    Alpha,
    /// Letters, digits and underscores only.
    Alphanumeric,
    /// Loose local/international phone number.
    Phone,
    /// Absolute URL.
    Url,
    /// Identical to the named field's value.
    Match(String),
    /// Matches a user-supplied regular expression.
    Custom(CustomPattern),
    /// Host-supplied predicate.
    Check(Check),
}

impl Rule {
    /// The annotation keyword for this rule.
    pub fn keyword(&self) -> &str {
        match self {
            Rule::Required => "required",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::Email => "email",
            Rule::Date => "date",
            Rule::DateFuture => "date-future",
            Rule::DateNotToday => "date-not-today",
            Rule::TimeBefore(_) => "time-before",
            Rule::TimeAfter(_) => "time-after",
            Rule::Numeric => "numeric",
            Rule::Alpha => "alpha",
            Rule::Alphanumeric => "alphanumeric",
            Rule::Phone => "phone",
            Rule::Url => "url",
            Rule::Match(_) => "match",
            Rule::Custom(_) => "custom",
            Rule::Check(check) => &check.name,
        }
    }

    /// Returns `true` for [`Rule::Required`].
    pub fn is_required(&self) -> bool {
        matches!(self, Rule::Required)
    }

    /// Evaluates the rule against an already-trimmed value.
    ///
    /// Returns the error message if the rule fails. Every rule except `required`
    /// and host checks passes on an empty value. `time-before` and `time-after`
    /// compare the untrimmed values, taken from the context when it has one.
    pub fn check(&self, value: &str, cx: &RuleContext<'_>) -> Option<String> {
        if let Rule::Check(check) = self {
            return check.run(value);
        }
        if value.is_empty() {
            return self
                .is_required()
                .then(|| "This field is required".to_string());
        }

        match self {
            Rule::Required | Rule::Check(_) => None,
            Rule::Min(min) => (value.chars().count() < *min)
                .then(|| format!("Must be at least {min} characters")),
            Rule::Max(max) => (value.chars().count() > *max)
                .then(|| format!("Must be no more than {max} characters")),
            Rule::Email => (!EMAIL_SHAPE.is_match(value))
                .then(|| "Please enter a valid email address".to_string()),
            Rule::Date => parse_date(value)
                .is_none()
                .then(|| "Please enter a valid date".to_string()),
            Rule::DateFuture => parse_date(value)
                .filter(|date| *date <= cx.today)
                .map(|_| "Date must be in the future".to_string()),
            Rule::DateNotToday => parse_date(value)
                .filter(|date| *date == cx.today)
                .map(|_| "Date cannot be today".to_string()),
            Rule::TimeBefore(other) => match cx.raw_sibling(other) {
                None => cx.unresolved(self),
                Some(other_value) if other_value.is_empty() => None,
                Some(other_value) => (cx.raw_value(value) >= other_value.as_str())
                    .then(|| format!("Must be before {}", cx.label_of(other))),
            },
            Rule::TimeAfter(other) => match cx.raw_sibling(other) {
                None => cx.unresolved(self),
                Some(other_value) if other_value.is_empty() => None,
                Some(other_value) => (cx.raw_value(value) < other_value.as_str())
                    .then(|| format!("Must be after {}", cx.label_of(other))),
            },
            Rule::Numeric => (!value.chars().all(|c| c.is_ascii_digit()))
                .then(|| "Must contain only numbers".to_string()),
            Rule::Alpha => (!value.chars().all(|c| c.is_alphabetic() || c.is_whitespace()))
                .then(|| "Must contain only letters and spaces".to_string()),
            Rule::Alphanumeric => (!value.chars().all(|c| c.is_alphanumeric() || c == '_'))
                .then(|| "Must contain only letters, numbers, and underscores".to_string()),
            Rule::Phone => (!PHONE_SHAPE.is_match(value))
                .then(|| "Please enter a valid phone number".to_string()),
            Rule::Url => url::Url::parse(value)
                .is_err()
                .then(|| "Please enter a valid URL".to_string()),
            Rule::Match(other) => match cx.sibling(other) {
                None => cx.unresolved(self),
                Some(other_value) => (value != other_value)
                    .then(|| format!("Must match {}", cx.label_of(other))),
            },
            Rule::Custom(pattern) => match &pattern.regex {
                None => cx.unresolved(self),
                Some(re) => (!re.is_match(value)).then(|| "Invalid format".to_string()),
            },
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Min(n) | Rule::Max(n) => write!(f, "{}:{}", self.keyword(), n),
            Rule::TimeBefore(other) | Rule::TimeAfter(other) | Rule::Match(other) => {
                write!(f, "{}:{}", self.keyword(), other)
            }
            Rule::Custom(pattern) => write!(f, "custom:{}", pattern.source),
            _ => f.write_str(self.keyword()),
        }
    }
}

/// A `custom:` pattern, compiled once.
///
/// A pattern that fails to compile is kept (so it still shows up in the rule
/// list) but can never fail a value unless the validator is configured to fail
/// closed.
#[derive(Debug, Clone)]
pub struct CustomPattern {
    source: String,
    regex: Option<Regex>,
}

impl CustomPattern {
    /// Compiles a pattern, logging and keeping it uncompiled on error.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let regex = match Regex::new(&source) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Ignoring malformed custom pattern '{}': {}", source, e);
                None
            }
        };
        Self { source, regex }
    }

    /// The pattern as written in the annotation.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the pattern compiled.
    pub fn is_compiled(&self) -> bool {
        self.regex.is_some()
    }
}

/// A named predicate with its failure message.
#[derive(Clone)]
pub struct Check {
    name: String,
    predicate: Predicate,
    message: String,
}

impl Check {
    /// Creates a check that fails with `message` when `predicate` returns `false`.
    pub fn new<F>(name: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }

    fn run(&self, value: &str) -> Option<String> {
        if (self.predicate)(value) {
            None
        } else {
            Some(self.message.clone())
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// What a rule can see while it is evaluated.
pub struct RuleContext<'a> {
    form: &'a dyn FormSurface,
    raw_value: Option<&'a str>,
    today: NaiveDate,
    unresolved: Unresolved,
    unresolved_message: &'a str,
}

impl<'a> RuleContext<'a> {
    /// Creates a context over `form`, failing open on unresolvable rules.
    pub fn new(form: &'a dyn FormSurface, today: NaiveDate) -> Self {
        Self {
            form,
            raw_value: None,
            today,
            unresolved: Unresolved::Pass,
            unresolved_message: "",
        }
    }

    /// Sets how unresolvable rules behave.
    pub fn with_unresolved(mut self, unresolved: Unresolved, message: &'a str) -> Self {
        self.unresolved = unresolved;
        self.unresolved_message = message;
        self
    }

    /// Sets the untrimmed value of the field being validated.
    pub fn with_raw_value(mut self, raw: &'a str) -> Self {
        self.raw_value = Some(raw);
        self
    }

    fn raw_value<'v>(&self, trimmed: &'v str) -> &'v str
    where
        'a: 'v,
    {
        self.raw_value.unwrap_or(trimmed)
    }

    fn sibling(&self, id: &str) -> Option<String> {
        self.form.value(id).map(|v| v.trim().to_string())
    }

    fn raw_sibling(&self, id: &str) -> Option<String> {
        self.form.value(id)
    }

    fn label_of(&self, id: &str) -> String {
        self.form
            .label(id)
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| id.to_string())
    }

    fn unresolved(&self, rule: &Rule) -> Option<String> {
        debug!("Rule '{}' cannot be evaluated ({:?})", rule, self.unresolved);
        match self.unresolved {
            Unresolved::Pass => None,
            Unresolved::Fail => Some(self.unresolved_message.to_string()),
        }
    }
}

/// Parses the date shapes form controls produce: `YYYY-MM-DD`,
/// `YYYY-MM-DDTHH:MM[:SS]` and RFC 3339. Time is discarded.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}
