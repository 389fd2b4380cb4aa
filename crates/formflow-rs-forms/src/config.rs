//! Form configs and the config factory trait.
//!
//! A [`FormConfig`] is an ordered, immutable sequence of field definitions
//! describing one logical form. Construction validates the config's
//! internal references and fails fast on programmer errors; a config that
//! constructs successfully is safe to materialize into live state any
//! number of times.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use formflow_rs_core::{FormError, FormResult};

use crate::fields::{FieldDefinition, FieldKind};

/// Shared neutral definition returned by [`FormConfig::field_by_key`] for
/// unknown keys.
static PLACEHOLDER_FIELD: Lazy<FieldDefinition> =
    Lazy::new(|| FieldDefinition::new("", FieldKind::Text).label(""));

/// An ordered set of field definitions for one logical form.
///
/// Field order is significant: it is the render and tab order, and the
/// order in which field state is initialized.
#[derive(Debug, Clone)]
pub struct FormConfig {
    fields: Vec<FieldDefinition>,
}

impl FormConfig {
    /// Creates a config from an ordered list of field definitions.
    ///
    /// Fails with [`FormError::DuplicateFieldKey`] when two fields share a
    /// key, and with [`FormError::DanglingDependsOn`] when a field's
    /// `depends_on` names a key absent from this config. Both are
    /// programmer errors: the config is rejected outright rather than
    /// constructed in a partially-valid shape.
    pub fn new(fields: Vec<FieldDefinition>) -> FormResult<Self> {
        let mut keys = HashSet::new();
        for field in &fields {
            if !keys.insert(field.key.as_str()) {
                return Err(FormError::DuplicateFieldKey(field.key.clone()));
            }
        }
        for field in &fields {
            if let Some(dep) = &field.depends_on {
                if !keys.contains(dep.as_str()) {
                    return Err(FormError::DanglingDependsOn {
                        field: field.key.clone(),
                        depends_on: dep.clone(),
                    });
                }
            }
        }
        Ok(Self { fields })
    }

    /// Returns the field definitions in declaration order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Returns the definition registered under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Returns `true` if a field with the given key exists.
    pub fn has_field(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the definition under `key`, or a shared neutral placeholder
    /// when the key is unknown.
    ///
    /// The placeholder keeps template-side lookups non-failing; callers
    /// that need to distinguish absence should use [`get`](Self::get).
    pub fn field_by_key(&self, key: &str) -> &FieldDefinition {
        self.get(key).unwrap_or(&PLACEHOLDER_FIELD)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the config has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Produces the config for one logical form identity.
///
/// Factories are pure given their collaborators: whatever a form's
/// validators need (e.g. the email-uniqueness checker) is captured by the
/// factory value at construction time, and `build_config` performs no I/O
/// itself — I/O is delegated to the validators it wires in.
pub trait FormConfigFactory: Send + Sync {
    /// Builds the form config.
    fn build_config(&self) -> FormResult<FormConfig>;
}

impl<F> FormConfigFactory for F
where
    F: Fn() -> FormResult<FormConfig> + Send + Sync,
{
    fn build_config(&self) -> FormResult<FormConfig> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_city_fields() -> Vec<FieldDefinition> {
        vec![
            FieldDefinition::new("state", FieldKind::Select).required(true),
            FieldDefinition::new("city", FieldKind::Select)
                .required(true)
                .depends_on("state"),
        ]
    }

    #[test]
    fn test_valid_config() {
        let config = FormConfig::new(state_city_fields()).unwrap();
        assert_eq!(config.len(), 2);
        assert!(!config.is_empty());
    }

    #[test]
    fn test_order_preserved() {
        let config = FormConfig::new(state_city_fields()).unwrap();
        let keys: Vec<&str> = config.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["state", "city"]);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let fields = vec![
            FieldDefinition::new("email", FieldKind::Email),
            FieldDefinition::new("email", FieldKind::Text),
        ];
        let err = FormConfig::new(fields).unwrap_err();
        assert!(matches!(err, FormError::DuplicateFieldKey(key) if key == "email"));
    }

    #[test]
    fn test_dangling_depends_on_rejected() {
        let fields = vec![FieldDefinition::new("city", FieldKind::Select).depends_on("state")];
        let err = FormConfig::new(fields).unwrap_err();
        assert!(matches!(
            err,
            FormError::DanglingDependsOn { field, depends_on }
                if field == "city" && depends_on == "state"
        ));
    }

    #[test]
    fn test_get_and_has_field() {
        let config = FormConfig::new(state_city_fields()).unwrap();
        assert!(config.has_field("state"));
        assert!(!config.has_field("country"));
        assert_eq!(config.get("city").unwrap().depends_on.as_deref(), Some("state"));
        assert!(config.get("country").is_none());
    }

    #[test]
    fn test_field_by_key_returns_exact_definition() {
        let config = FormConfig::new(state_city_fields()).unwrap();
        let field = config.field_by_key("city");
        assert_eq!(field.key, "city");
        assert_eq!(field.depends_on.as_deref(), Some("state"));
    }

    #[test]
    fn test_field_by_key_unknown_returns_placeholder() {
        let config = FormConfig::new(state_city_fields()).unwrap();
        let field = config.field_by_key("country");
        assert_eq!(field.key, "");
        assert!(!field.required);
        assert!(field.sync_validators.is_empty());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = FormConfig::new(Vec::new()).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_closure_factory() {
        let factory = || FormConfig::new(state_city_fields());
        let config = factory.build_config().unwrap();
        assert_eq!(config.len(), 2);
    }
}
