//! Annotation parsing: `"required|min:3|custom:^[A-Z]+$"` into [`Rule`]s.

use std::str::FromStr;

use log::warn;

use super::error::RuleParseError;
use super::rule::{CustomPattern, Rule};

impl FromStr for Rule {
    type Err = RuleParseError;

    /// Parses one annotation segment. The parameter is everything after the first `:`.
    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(RuleParseError::Empty);
        }

        let (keyword, param) = match segment.split_once(':') {
            Some((keyword, param)) => (keyword.trim(), Some(param)),
            None => (segment, None),
        };

        let field_ref = |param: Option<&str>| -> Result<String, RuleParseError> {
            let param = param.map(str::trim).unwrap_or_default();
            if param.is_empty() {
                Err(RuleParseError::missing(keyword))
            } else {
                Ok(param.to_string())
            }
        };
        let length = |param: Option<&str>| -> Result<usize, RuleParseError> {
            let param = param.map(str::trim).ok_or_else(|| RuleParseError::missing(keyword))?;
            param
                .parse()
                .map_err(|_| RuleParseError::invalid(keyword, param))
        };

        match keyword {
            "required" => Ok(Rule::Required),
            "min" => length(param).map(Rule::Min),
            "max" => length(param).map(Rule::Max),
            "email" => Ok(Rule::Email),
            "date" => Ok(Rule::Date),
            "date-future" => Ok(Rule::DateFuture),
            "date-not-today" => Ok(Rule::DateNotToday),
            "time-before" => field_ref(param).map(Rule::TimeBefore),
            "time-after" => field_ref(param).map(Rule::TimeAfter),
            "numeric" => Ok(Rule::Numeric),
            "alpha" => Ok(Rule::Alpha),
            "alphanumeric" => Ok(Rule::Alphanumeric),
            "phone" => Ok(Rule::Phone),
            "url" => Ok(Rule::Url),
            "match" => field_ref(param).map(Rule::Match),
            "custom" => match param {
                Some(pattern) if !pattern.is_empty() => Ok(Rule::Custom(CustomPattern::new(pattern))),
                _ => Err(RuleParseError::missing(keyword)),
            },
            other => Err(RuleParseError::UnknownRule(other.to_string())),
        }
    }
}

/// Parses a pipe-delimited annotation into rules, in declaration order.
///
/// Segments that fail to parse are logged and dropped. A `custom:` segment takes the
/// rest of the annotation as its pattern, so patterns may contain `|`; it has to be
/// the last rule.
///
/// # Example
///
/// ```
/// use ccsync_forms::validation::{parse_rules, Rule};
///
/// let rules = parse_rules("required|min:3|custom:^(CS|MA)\\d+$");
/// assert_eq!(rules.len(), 3);
/// assert!(matches!(rules[1], Rule::Min(3)));
/// ```
pub fn parse_rules(annotation: &str) -> Vec<Rule> {
    let mut rules = Vec::new();
    let mut rest = annotation;

    while !rest.is_empty() {
        let segment = if rest.trim_start().starts_with("custom:") {
            std::mem::take(&mut rest)
        } else {
            match rest.split_once('|') {
                Some((segment, tail)) => {
                    rest = tail;
                    segment
                }
                None => std::mem::take(&mut rest),
            }
        };

        match segment.parse::<Rule>() {
            Ok(rule) => rules.push(rule),
            Err(RuleParseError::Empty) => {}
            Err(e) => warn!("Dropping rule in annotation '{}': {}", annotation, e),
        }
    }

    rules
}
