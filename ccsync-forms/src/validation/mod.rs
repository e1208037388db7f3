//! Form validation system.
//!
//! Each annotated field carries a rule string such as `required|min:3|match:password`.
//! The string is parsed once when the [`FormValidator`] is built; afterwards every
//! input/change/blur event re-runs the field's rules in declaration order and stops at
//! the first failure.
//!
//! # Example
//!
//! ```
//! use ccsync_forms::validation::{FormValidator, MemoryForm};
//!
//! let form = MemoryForm::new()
//!     .field("password", "Password", "required|min:8")
//!     .field("confirm", "Confirm Password", "required|match:password");
//!
//! let mut validator = FormValidator::new(form.clone());
//! assert!(!validator.submit_enabled());
//!
//! form.set_value("password", "hunter22");
//! form.set_value("confirm", "hunter22");
//! assert!(validator.validate_form());
//! assert!(validator.submit_enabled());
//! ```

mod calendar;
mod config;
mod error;
mod memory;
mod parse;
mod result;
mod rule;
mod surface;
mod validator;

pub use calendar::{Calendar, FixedCalendar, LocalCalendar};
pub use config::{Unresolved, ValidatorConfig};
pub use error::RuleParseError;
pub use memory::MemoryForm;
pub use parse::parse_rules;
pub use result::{FieldError, ValidationErrorSet, ValidationResult};
pub use rule::{Check, CustomPattern, Rule, RuleContext};
pub use surface::{FormSurface, VisualState};
pub use validator::{FieldEvent, FieldState, FormValidator};
