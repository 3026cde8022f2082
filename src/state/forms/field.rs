//! Form field value objects

use crate::mask::{self, MaskKind};

/// Input kind of a field, used by the driver to describe what to type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Email,
    /// Fixed choice list of `(value, label)` pairs
    Select(&'static [(&'static str, &'static str)]),
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub mask: MaskKind,
    pub required: bool,
    value: String,
}

impl FormField {
    /// Create a new required text field
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            mask: MaskKind::None,
            required: true,
            value: String::new(),
        }
    }

    /// Create a new required masked text field
    pub fn masked(name: &'static str, label: &'static str, mask: MaskKind) -> Self {
        Self {
            mask,
            ..Self::text(name, label)
        }
    }

    /// Create a new required select field
    pub fn select(
        name: &'static str,
        label: &'static str,
        options: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            kind: FieldKind::Select(options),
            ..Self::text(name, label)
        }
    }

    /// Change the input kind
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Get the current value
    pub fn as_text(&self) -> &str {
        &self.value
    }

    /// Store `raw`, masked according to the field's mask
    pub fn set_text(&mut self, raw: &str) {
        self.value = mask::apply(self.mask, raw);
    }

    /// Clear the field value
    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Whether the value is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Placeholder shown for an empty field
    pub fn placeholder(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::Date => Some("AAAA-MM-DD"),
            FieldKind::Email => Some("nome@exemplo.com"),
            _ => self.mask.placeholder(),
        }
    }

    /// Label of the selected option, for select fields
    pub fn option_label(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::Select(options) => options
                .iter()
                .find(|(value, _)| *value == self.value)
                .map(|(_, label)| *label),
            _ => None,
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        if self.value.is_empty() {
            return self
                .placeholder()
                .map(|p| format!("<{p}>"))
                .unwrap_or_default();
        }
        match self.option_label() {
            Some(label) => format!("{label} ({})", self.value),
            None => self.value.clone(),
        }
    }
}
