//! Form validation for CCSync front ends.
//!
//! Fields are annotated with pipe-delimited rule strings (`"required|min:3"`),
//! parsed once into [`Rule`](validation::Rule) values and evaluated against a
//! host-provided [`FormSurface`](validation::FormSurface).

pub mod validation;

pub mod prelude {
    pub use crate::validation::{
        Calendar, FieldEvent, FieldState, FormSurface, FormValidator, MemoryForm, Rule,
        Unresolved, ValidationResult, ValidatorConfig, VisualState,
    };
}
