//! Tests for FormValidator against an in-memory form.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ccsync_forms::validation::{
    Check, FieldEvent, FixedCalendar, FormValidator, MemoryForm, Rule, Unresolved,
    ValidatorConfig, VisualState,
};
use chrono::NaiveDate;

fn init_logging() {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Debug, simplelog::Config::default());
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

fn event_form() -> MemoryForm {
    MemoryForm::new()
        .field("event_name", "Event Name", "required|min:3|max:60")
        .field("event_date", "Event Date", "required|date|date-future")
        .field("start_time", "Start Time", "required|time-before:end_time")
        .field("end_time", "End Time", "required|time-after:start_time")
        .field("contact", "Contact Email", "email")
}

#[test]
fn test_fresh_form_blocks_submit() {
    init_logging();
    let form = event_form();
    let validator = FormValidator::new(form.clone());

    assert!(validator.errors().is_empty());
    assert!(!validator.submit_enabled());
    assert!(!form.submit_enabled());
    assert_eq!(form.visual_state("event_name"), Some(VisualState::Untouched));
}

#[test]
fn test_short_circuits_on_first_failure() {
    init_logging();
    let calls = Arc::new(AtomicUsize::new(0));
    let form = MemoryForm::new().field("code", "Code", "min:3");
    let mut validator = FormValidator::new(form.clone());

    let counter = Arc::clone(&calls);
    validator.add_rule(
        "code",
        Rule::Check(Check::new(
            "counted",
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            },
            "never shown",
        )),
    );

    form.set_value("code", "ab");
    assert!(!validator.validate_field("code"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    form.set_value("code", "abc");
    assert!(validator.validate_field("code"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_min_length_cases() {
    let form = MemoryForm::new().field("name", "Name", "min:3");
    let mut validator = FormValidator::new(form.clone());

    form.set_value("name", "ab");
    assert!(!validator.validate_field("name"));
    assert_eq!(validator.errors().get("name"), Some("Must be at least 3 characters"));

    form.set_value("name", "");
    assert!(validator.validate_field("name"));
    assert_eq!(form.visual_state("name"), Some(VisualState::Untouched));

    form.set_value("name", "abc");
    assert!(validator.validate_field("name"));
    assert_eq!(form.visual_state("name"), Some(VisualState::Valid));
    assert!(validator.errors().is_empty());
}

#[test]
fn test_password_confirmation() {
    let form = MemoryForm::new()
        .field("password", "Password", "required|min:8")
        .field("confirmPassword", "Confirm Password", "required")
        .field("repeat", "Repeat", "required|match:confirmPassword");
    let mut validator = FormValidator::new(form.clone());

    form.set_value("confirmPassword", "x");
    form.set_value("repeat", "y");
    assert!(!validator.validate_field("repeat"));
    let message = form.message("repeat").unwrap();
    assert!(message.starts_with("Must match"), "{message}");
    assert!(message.contains("Confirm Password"));

    form.set_value("repeat", "x");
    assert!(validator.validate_field("repeat"));
    assert_eq!(form.message("repeat"), None);
}

#[test]
fn test_date_future_against_today() {
    let form = MemoryForm::new().field("event_date", "Event Date", "date-future");
    let mut validator = FormValidator::new(form.clone()).with_calendar(FixedCalendar(today()));

    form.set_value("event_date", "2026-09-01");
    assert!(!validator.validate_field("event_date"));

    form.set_value("event_date", "2026-09-02");
    assert!(validator.validate_field("event_date"));
}

#[test]
fn test_time_window() {
    let form = event_form();
    let mut validator = FormValidator::new(form.clone());

    form.set_value("start_time", "14:00");
    assert!(validator.validate_field("start_time"), "no end time yet");

    form.set_value("end_time", "13:00");
    assert!(!validator.validate_field("end_time"));
    assert_eq!(form.message("end_time").as_deref(), Some("Must be after Start Time"));
    assert!(!validator.validate_field("start_time"));
    assert_eq!(form.message("start_time").as_deref(), Some("Must be before End Time"));

    form.set_value("end_time", "16:30");
    assert!(validator.validate_field("end_time"));
    assert!(validator.validate_field("start_time"));
}

#[test]
fn test_time_window_compares_untrimmed_values() {
    let form = event_form();
    let mut validator = FormValidator::new(form.clone());

    form.set_value("start_time", "09:00");
    form.set_value("end_time", " 10:00");
    assert!(!validator.validate_field("end_time"));
    assert_eq!(form.message("end_time").as_deref(), Some("Must be after Start Time"));

    form.set_value("end_time", "10:00");
    assert!(validator.validate_field("end_time"));
}

#[test]
fn test_email_accepts_any_address_shape() {
    let form = MemoryForm::new().field("contact", "Contact Email", "email");
    let mut validator = FormValidator::new(form.clone());

    for address in ["a..b@example.com", ".ada@example.com", "ada.@example.com"] {
        form.set_value("contact", address);
        assert!(validator.validate_field("contact"), "{address}");
    }

    form.set_value("contact", "ada@example");
    assert!(!validator.validate_field("contact"));
}

#[test]
fn test_missing_reference_fails_open_by_default() {
    let form = MemoryForm::new().field("confirm", "Confirm", "match:nowhere");
    let mut validator = FormValidator::new(form.clone());

    form.set_value("confirm", "secret");
    assert!(validator.validate_field("confirm"));
}

#[test]
fn test_missing_reference_can_fail_closed() {
    let form = MemoryForm::new().field("confirm", "Confirm", "match:nowhere");
    let config = ValidatorConfig::default()
        .with_unresolved(Unresolved::Fail)
        .with_unresolved_message("Cannot check this field");
    let mut validator = FormValidator::with_config(form.clone(), config);

    form.set_value("confirm", "secret");
    assert!(!validator.validate_field("confirm"));
    assert_eq!(form.message("confirm").as_deref(), Some("Cannot check this field"));
}

#[test]
fn test_submit_gating_follows_errors_and_required() {
    let form = event_form();
    let mut validator = FormValidator::new(form.clone()).with_calendar(FixedCalendar(today()));

    form.set_value("event_name", "General Meeting");
    form.set_value("event_date", "2026-09-15");
    form.set_value("start_time", "18:00");
    validator.handle_event("start_time", FieldEvent::Change);
    assert!(!validator.submit_enabled(), "end_time is still empty");

    form.set_value("end_time", "19:30");
    validator.handle_event("end_time", FieldEvent::Blur);
    assert!(validator.submit_enabled());
    assert!(form.submit_enabled());

    form.set_value("contact", "not-an-email");
    validator.handle_event("contact", FieldEvent::Input);
    assert!(!validator.submit_enabled());

    form.set_value("contact", "");
    validator.handle_event("contact", FieldEvent::Input);
    assert!(validator.submit_enabled());
}

#[test]
fn test_validate_form_reseeds_errors() {
    let form = event_form();
    let mut validator = FormValidator::new(form.clone()).with_calendar(FixedCalendar(today()));

    assert!(!validator.validate_form());
    let result = validator.result();
    assert_eq!(result.first_invalid_field(), Some("event_name"));
    assert_eq!(result.errors().len(), 4);
    assert_eq!(form.visual_state("event_name"), Some(VisualState::Invalid));
    assert_eq!(form.visual_state("contact"), Some(VisualState::Untouched));

    form.set_value("event_name", "Career Fair");
    form.set_value("event_date", "2026-10-01");
    form.set_value("start_time", "09:00");
    form.set_value("end_time", "12:00");
    assert!(validator.validate_form());
    assert!(validator.result().is_valid());
    assert!(validator.submit_enabled());
    assert_eq!(
        validator.field_state("event_name").map(|s| s.visual),
        Some(VisualState::Valid)
    );
}

#[test]
fn test_values_are_trimmed() {
    let form = MemoryForm::new().field("name", "Name", "required|max:3");
    let mut validator = FormValidator::new(form.clone());

    form.set_value("name", "   ");
    assert!(!validator.validate_field("name"));
    assert_eq!(form.message("name").as_deref(), Some("This field is required"));

    form.set_value("name", "  abc  ");
    assert!(validator.validate_field("name"));
    assert_eq!(validator.field_state("name").unwrap().value, "abc");
}

#[test]
fn test_unannotated_fields_are_ignored() {
    let form = MemoryForm::new()
        .plain_field("notes", "Notes")
        .field("title", "Title", "required");
    let mut validator = FormValidator::new(form.clone());

    assert!(validator.rules("notes").is_none());
    assert!(validator.validate_field("notes"));
    assert!(!validator.add_rule("missing", Rule::Required));
    assert!(validator.add_rule("notes", Rule::Max(5)));
    form.set_value("notes", "far too long");
    assert!(!validator.validate_field("notes"));
}
