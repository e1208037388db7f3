//! FormSurface trait for hosts that render forms.

/// Visual validation state of a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisualState {
    /// Neither valid nor invalid styling (empty or never validated).
    #[default]
    Untouched,
    /// Valid styling, error display cleared.
    Valid,
    /// Invalid styling, error display shows the message.
    Invalid,
}

/// The capability a form host exposes to the validator.
///
/// This keeps the validation core independent of any particular UI toolkit: a
/// browser binding, a terminal UI or [`MemoryForm`](super::MemoryForm) can all
/// implement it. Fields are addressed by identifier.
pub trait FormSurface: Send + Sync {
    /// Identifiers of every field, in display order.
    fn field_ids(&self) -> Vec<String>;

    /// The rule annotation attached to a field, if any.
    fn annotation(&self, id: &str) -> Option<String>;

    /// Current value of a field. `None` if the form has no such field.
    fn value(&self, id: &str) -> Option<String>;

    /// Visible label of a field, used in cross-field messages.
    fn label(&self, id: &str) -> Option<String>;

    /// Apply a visual state and write (or clear) the adjacent error display.
    fn set_visual_state(&self, id: &str, state: VisualState, message: Option<&str>);

    /// Enable or disable the form's submit control.
    fn set_submit_enabled(&self, enabled: bool);
}

impl<T: FormSurface + ?Sized> FormSurface for &T {
    fn field_ids(&self) -> Vec<String> {
        (**self).field_ids()
    }

    fn annotation(&self, id: &str) -> Option<String> {
        (**self).annotation(id)
    }

    fn value(&self, id: &str) -> Option<String> {
        (**self).value(id)
    }

    fn label(&self, id: &str) -> Option<String> {
        (**self).label(id)
    }

    fn set_visual_state(&self, id: &str, state: VisualState, message: Option<&str>) {
        (**self).set_visual_state(id, state, message)
    }

    fn set_submit_enabled(&self, enabled: bool) {
        (**self).set_submit_enabled(enabled)
    }
}
