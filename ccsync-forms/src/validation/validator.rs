//! FormValidator: binds parsed rules to a form surface.

use std::sync::Arc;

use log::{debug, trace};

use super::calendar::{Calendar, LocalCalendar};
use super::config::ValidatorConfig;
use super::parse::parse_rules;
use super::result::{FieldError, ValidationErrorSet, ValidationResult};
use super::rule::{Rule, RuleContext};
use super::surface::{FormSurface, VisualState};

/// Field events that trigger re-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Input,
    Change,
    Blur,
}

/// Validation state of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    /// Trimmed value seen by the latest validation.
    pub value: String,
    /// Message from the latest validation, if it failed.
    pub last_error: Option<String>,
    /// Visual state last applied to the field.
    pub visual: VisualState,
}

/// Internal representation of a field being validated.
struct FieldEntry {
    id: String,
    rules: Vec<Rule>,
    state: FieldState,
}

impl FieldEntry {
    fn is_required(&self) -> bool {
        self.rules.iter().any(Rule::is_required)
    }
}

/// Validates the annotated fields of a form and gates its submit control.
///
/// Built once per form. Every field with a rule annotation gets a parsed rule list
/// and a [`FieldState`]; the host forwards field events through
/// [`handle_event`](Self::handle_event) and calls
/// [`validate_form`](Self::validate_form) from its submit handler, aborting the
/// submission when it returns `false`.
///
/// Nothing here returns an error: outcomes surface as booleans, the
/// [`ValidationErrorSet`] and visual state pushed to the [`FormSurface`].
///
/// # Example
///
/// ```
/// use ccsync_forms::validation::{FieldEvent, FormValidator, MemoryForm, VisualState};
///
/// let form = MemoryForm::new().field("username", "Username", "required|min:3|alphanumeric");
/// let mut validator = FormValidator::new(form.clone());
///
/// form.set_value("username", "ab");
/// validator.handle_event("username", FieldEvent::Input);
/// assert_eq!(form.visual_state("username"), Some(VisualState::Invalid));
/// assert_eq!(form.message("username").as_deref(), Some("Must be at least 3 characters"));
/// ```
pub struct FormValidator<F: FormSurface> {
    form: F,
    config: ValidatorConfig,
    calendar: Arc<dyn Calendar>,
    fields: Vec<FieldEntry>,
    errors: ValidationErrorSet,
    submit_enabled: bool,
}

impl<F: FormSurface> FormValidator<F> {
    /// Create a validator with the default configuration.
    pub fn new(form: F) -> Self {
        Self::with_config(form, ValidatorConfig::default())
    }

    /// Create a validator with a custom configuration.
    ///
    /// Parses every field annotation and applies the initial submit state, so a
    /// fresh form with empty required fields starts with submission disabled.
    pub fn with_config(form: F, config: ValidatorConfig) -> Self {
        let fields = form
            .field_ids()
            .into_iter()
            .filter_map(|id| {
                let annotation = form.annotation(&id)?;
                let rules = parse_rules(&annotation);
                debug!("Field '{}' annotated with '{}' ({} rules)", id, annotation, rules.len());
                Some(FieldEntry {
                    state: FieldState {
                        value: form.value(&id).unwrap_or_default().trim().to_string(),
                        ..Default::default()
                    },
                    id,
                    rules,
                })
            })
            .collect();

        let mut validator = Self {
            form,
            config,
            calendar: Arc::new(LocalCalendar),
            fields,
            errors: ValidationErrorSet::default(),
            submit_enabled: false,
        };
        validator.update_submit();
        validator
    }

    /// Use a different source for "today" in date rules.
    pub fn with_calendar(mut self, calendar: impl Calendar + 'static) -> Self {
        self.calendar = Arc::new(calendar);
        self
    }

    /// Append a rule to a field.
    ///
    /// Fields without an annotation are picked up as long as the form has them.
    /// Returns `false` if the form has no such field.
    pub fn add_rule(&mut self, field_id: &str, rule: Rule) -> bool {
        match self.position(field_id) {
            Some(index) => self.fields[index].rules.push(rule),
            None if self.form.value(field_id).is_some() => self.fields.push(FieldEntry {
                id: field_id.to_string(),
                rules: vec![rule],
                state: FieldState::default(),
            }),
            None => {
                debug!("Cannot add rule to unknown field '{}'", field_id);
                return false;
            }
        }
        self.update_submit();
        true
    }

    /// React to an input, change or blur event on a field.
    pub fn handle_event(&mut self, field_id: &str, event: FieldEvent) -> bool {
        trace!("{:?} on '{}'", event, field_id);
        self.validate_field(field_id)
    }

    /// Validate a single field and refresh the submit state.
    ///
    /// Returns `true` if the field is valid. Fields without rules are always valid.
    pub fn validate_field(&mut self, field_id: &str) -> bool {
        let Some(index) = self.position(field_id) else {
            trace!("Field '{}' has no rules", field_id);
            return true;
        };

        let (value, error) = self.evaluate(index);
        let valid = error.is_none();
        self.apply(index, value, error);
        self.update_submit();
        valid
    }

    /// Validate every field, rebuilding the error set from scratch.
    ///
    /// Returns `true` if no field failed.
    pub fn validate_form(&mut self) -> bool {
        self.errors.clear();
        for index in 0..self.fields.len() {
            let (value, error) = self.evaluate(index);
            self.apply(index, value, error);
        }
        self.update_submit();

        let valid = self.errors.is_empty();
        debug!("Form validated: {} field(s) invalid", self.errors.len());
        valid
    }

    /// Errors from the latest validations, in field order.
    pub fn result(&self) -> ValidationResult {
        let errors: Vec<_> = self
            .fields
            .iter()
            .filter_map(|entry| {
                let message = self.errors.get(&entry.id)?;
                Some(FieldError {
                    field_id: entry.id.clone(),
                    label: self.form.label(&entry.id).unwrap_or_else(|| entry.id.clone()),
                    message: message.to_string(),
                })
            })
            .collect();

        if errors.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    pub fn errors(&self) -> &ValidationErrorSet {
        &self.errors
    }

    pub fn field_state(&self, field_id: &str) -> Option<&FieldState> {
        self.position(field_id).map(|index| &self.fields[index].state)
    }

    /// Parsed rules of a field.
    pub fn rules(&self, field_id: &str) -> Option<&[Rule]> {
        self.position(field_id)
            .map(|index| self.fields[index].rules.as_slice())
    }

    /// Whether the submit control is currently enabled.
    pub fn submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    fn position(&self, field_id: &str) -> Option<usize> {
        self.fields.iter().position(|entry| entry.id == field_id)
    }

    /// Run a field's rules in order, stopping at the first failure.
    fn evaluate(&self, index: usize) -> (String, Option<String>) {
        let entry = &self.fields[index];
        let raw = self.form.value(&entry.id).unwrap_or_default();
        let value = raw.trim();

        let cx = RuleContext::new(&self.form, self.calendar.today())
            .with_raw_value(&raw)
            .with_unresolved(self.config.unresolved, &self.config.unresolved_message);
        let error = entry.rules.iter().find_map(|rule| rule.check(value, &cx));

        (value.to_string(), error)
    }

    fn apply(&mut self, index: usize, value: String, error: Option<String>) {
        let visual = match (&error, value.is_empty()) {
            (Some(_), _) => VisualState::Invalid,
            (None, false) => VisualState::Valid,
            (None, true) => VisualState::Untouched,
        };

        let entry = &mut self.fields[index];
        self.form.set_visual_state(&entry.id, visual, error.as_deref());
        self.errors.record(&entry.id, error.as_deref());
        entry.state = FieldState {
            value,
            last_error: error,
            visual,
        };
    }

    /// Disabled while any error is recorded or any required field is empty.
    fn update_submit(&mut self) {
        let required_filled = self
            .fields
            .iter()
            .filter(|entry| entry.is_required())
            .all(|entry| {
                self.form
                    .value(&entry.id)
                    .is_some_and(|value| !value.trim().is_empty())
            });
        let enabled = self.errors.is_empty() && required_filled;

        if enabled != self.submit_enabled {
            debug!("Submit {}", if enabled { "enabled" } else { "disabled" });
        }
        self.submit_enabled = enabled;
        self.form.set_submit_enabled(enabled);
    }
}
