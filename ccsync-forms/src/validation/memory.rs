use std::sync::{Arc, RwLock};

use super::surface::{FormSurface, VisualState};

/// A single field held by [`MemoryForm`].
#[derive(Debug, Clone, Default)]
struct MemoryField {
    id: String,
    label: String,
    annotation: Option<String>,
    value: String,
    visual: VisualState,
    message: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryFormInner {
    fields: Vec<MemoryField>,
    submit_enabled: bool,
}

/// An in-memory form with shared, interior-mutable state.
///
/// Cloning a `MemoryForm` yields another handle to the same fields, so a host can
/// hand one clone to a [`FormValidator`](super::FormValidator) and keep another to
/// type into fields and read back visual state.
///
/// # Example
///
/// ```
/// use ccsync_forms::validation::{MemoryForm, VisualState};
///
/// let form = MemoryForm::new()
///     .field("name", "Name", "required|alpha")
///     .plain_field("notes", "Notes");
///
/// form.set_value("name", "Ada");
/// assert_eq!(form.value_of("name"), "Ada");
/// assert_eq!(form.visual_state("name"), Some(VisualState::Untouched));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    inner: Arc<RwLock<MemoryFormInner>>,
}

impl MemoryForm {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field with a rule annotation
    pub fn field(self, id: impl Into<String>, label: impl Into<String>, rules: impl Into<String>) -> Self {
        self.push(MemoryField {
            id: id.into(),
            label: label.into(),
            annotation: Some(rules.into()),
            ..Default::default()
        })
    }

    /// Add a field without rules (still visible to `match:` and `time-*` lookups)
    pub fn plain_field(self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.push(MemoryField {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        })
    }

    fn push(self, field: MemoryField) -> Self {
        if let Ok(mut guard) = self.inner.write() {
            guard.fields.retain(|f| f.id != field.id);
            guard.fields.push(field);
        }
        self
    }

    // -------------------------------------------------------------------------
    // Host-side access
    // -------------------------------------------------------------------------

    /// Set a field's value. Unknown ids are ignored.
    pub fn set_value(&self, id: &str, value: impl Into<String>) {
        if let Ok(mut guard) = self.inner.write()
            && let Some(field) = guard.fields.iter_mut().find(|f| f.id == id)
        {
            field.value = value.into();
        }
    }

    /// Get a field's value, or an empty string for unknown ids
    pub fn value_of(&self, id: &str) -> String {
        self.value(id).unwrap_or_default()
    }

    /// Get the visual state last applied to a field
    pub fn visual_state(&self, id: &str) -> Option<VisualState> {
        self.inner
            .read()
            .ok()?
            .fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.visual)
    }

    /// Get the message shown in a field's error display
    pub fn message(&self, id: &str) -> Option<String> {
        self.inner
            .read()
            .ok()?
            .fields
            .iter()
            .find(|f| f.id == id)
            .and_then(|f| f.message.clone())
    }

    /// Whether the submit control is currently enabled
    pub fn submit_enabled(&self) -> bool {
        self.inner
            .read()
            .map(|guard| guard.submit_enabled)
            .unwrap_or(false)
    }

    fn with_field<T>(&self, id: &str, f: impl FnOnce(&MemoryField) -> T) -> Option<T> {
        let guard = self.inner.read().ok()?;
        guard.fields.iter().find(|field| field.id == id).map(f)
    }
}

impl FormSurface for MemoryForm {
    fn field_ids(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|guard| guard.fields.iter().map(|f| f.id.clone()).collect())
            .unwrap_or_default()
    }

    fn annotation(&self, id: &str) -> Option<String> {
        self.with_field(id, |f| f.annotation.clone()).flatten()
    }

    fn value(&self, id: &str) -> Option<String> {
        self.with_field(id, |f| f.value.clone())
    }

    fn label(&self, id: &str) -> Option<String> {
        self.with_field(id, |f| f.label.clone())
    }

    fn set_visual_state(&self, id: &str, state: VisualState, message: Option<&str>) {
        if let Ok(mut guard) = self.inner.write()
            && let Some(field) = guard.fields.iter_mut().find(|f| f.id == id)
        {
            field.visual = state;
            field.message = message.map(str::to_string);
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        if let Ok(mut guard) = self.inner.write() {
            guard.submit_enabled = enabled;
        }
    }
}
