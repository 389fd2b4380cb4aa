//! Declarative form field definitions.
//!
//! Each [`FieldDefinition`] describes a single form field: its input kind,
//! display metadata, validators, and an optional dependency on another
//! field whose value drives this field's available options.

use std::collections::HashMap;
use std::sync::Arc;

use crate::validators::{AsyncFieldValidator, FieldValidator};

/// The input representation of a form field.
///
/// The engine treats the kind as an opaque tag; it selects the widget the
/// surrounding UI renders, nothing more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A free-text input.
    Text,
    /// An email input.
    Email,
    /// A password input.
    Password,
    /// A single-choice select.
    Select,
    /// A date input.
    Date,
}

/// How wide the field renders in the form grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutWidth {
    /// Spans the full row.
    #[default]
    Full,
    /// Spans half a row.
    Half,
}

/// Complete declarative description of one form field.
///
/// Definitions are built once per form config and never mutated
/// afterwards; the live per-session data (current value, validity,
/// touched flags) lives in [`FormState`](crate::state::FormState).
///
/// The `required` flag is enforced by the engine itself: an empty value on
/// a required field fails with code `required` and no other sync validator
/// runs; an empty value on an optional field passes without running them.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Unique key within the form config.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Placeholder text shown in the empty input.
    pub placeholder: String,
    /// The input representation tag.
    pub kind: FieldKind,
    /// Whether an empty value fails validation.
    pub required: bool,
    /// Optional formatting template, opaque to the engine.
    pub input_mask: Option<String>,
    /// Display text per validator failure code.
    pub error_messages: HashMap<String, String>,
    /// Synchronous validators, evaluated in order on every value change.
    pub sync_validators: Vec<Arc<dyn FieldValidator>>,
    /// Asynchronous validators, evaluated after sync validation passes.
    pub async_validators: Vec<Arc<dyn AsyncFieldValidator>>,
    /// How wide the field renders.
    pub layout_width: LayoutWidth,
    /// Key of the field whose value drives this field's options.
    pub depends_on: Option<String>,
}

impl FieldDefinition {
    /// Creates a new `FieldDefinition` with sensible defaults.
    ///
    /// The field is optional, full-width, and has no validators; the label
    /// defaults to the key with underscores spaced out.
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        let key = key.into();
        let label = key.replace('_', " ");
        Self {
            key,
            label,
            placeholder: String::new(),
            kind,
            required: false,
            input_mask: None,
            error_messages: HashMap::new(),
            sync_validators: Vec::new(),
            async_validators: Vec::new(),
            layout_width: LayoutWidth::Full,
            depends_on: None,
        }
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets whether this field is required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the input mask template.
    pub fn input_mask(mut self, mask: impl Into<String>) -> Self {
        self.input_mask = Some(mask.into());
        self
    }

    /// Sets the display text for a given failure code.
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    /// Adds a synchronous validator.
    pub fn sync_validator(mut self, validator: Arc<dyn FieldValidator>) -> Self {
        self.sync_validators.push(validator);
        self
    }

    /// Adds an asynchronous validator.
    pub fn async_validator(mut self, validator: Arc<dyn AsyncFieldValidator>) -> Self {
        self.async_validators.push(validator);
        self
    }

    /// Sets the layout width.
    pub fn layout_width(mut self, width: LayoutWidth) -> Self {
        self.layout_width = width;
        self
    }

    /// Declares that this field's options derive from another field's value.
    pub fn depends_on(mut self, key: impl Into<String>) -> Self {
        self.depends_on = Some(key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{EmailShapeValidator, MinLengthValidator};

    #[test]
    fn test_defaults() {
        let field = FieldDefinition::new("full_name", FieldKind::Text);
        assert_eq!(field.key, "full_name");
        assert_eq!(field.label, "full name");
        assert!(!field.required);
        assert!(field.input_mask.is_none());
        assert!(field.sync_validators.is_empty());
        assert!(field.async_validators.is_empty());
        assert_eq!(field.layout_width, LayoutWidth::Full);
        assert!(field.depends_on.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let field = FieldDefinition::new("email", FieldKind::Email)
            .label("Email address")
            .placeholder("you@example.com")
            .required(true)
            .layout_width(LayoutWidth::Half)
            .sync_validator(Arc::new(EmailShapeValidator))
            .error_message("invalid_email", "That does not look like an email.");
        assert_eq!(field.label, "Email address");
        assert_eq!(field.placeholder, "you@example.com");
        assert!(field.required);
        assert_eq!(field.layout_width, LayoutWidth::Half);
        assert_eq!(field.sync_validators.len(), 1);
        assert_eq!(
            field.error_messages.get("invalid_email").unwrap(),
            "That does not look like an email."
        );
    }

    #[test]
    fn test_depends_on_and_mask() {
        let field = FieldDefinition::new("city", FieldKind::Select)
            .depends_on("state")
            .input_mask("AA");
        assert_eq!(field.depends_on.as_deref(), Some("state"));
        assert_eq!(field.input_mask.as_deref(), Some("AA"));
    }

    #[test]
    fn test_validators_accumulate_in_order() {
        let field = FieldDefinition::new("password", FieldKind::Password)
            .sync_validator(Arc::new(MinLengthValidator::new(6)))
            .sync_validator(Arc::new(MinLengthValidator::new(8)));
        assert_eq!(field.sync_validators.len(), 2);
        assert_eq!(field.sync_validators[0].name(), "MinLengthValidator");
    }
}
