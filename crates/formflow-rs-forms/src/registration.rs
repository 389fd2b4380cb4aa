//! The personal-data step of the registration wizard.
//!
//! This is the one concrete form the engine ships: full name, CPF
//! document, birth date, state and dependent city, email with the remote
//! uniqueness check, and password with confirmation. Everything else in
//! the crate is generic over configs; this module wires the builders
//! together for the registration flow.

use std::sync::Arc;

use formflow_rs_core::FormResult;

use crate::config::{FormConfig, FormConfigFactory};
use crate::fields::{FieldDefinition, FieldKind, LayoutWidth};
use crate::registry::FormRegistry;
use crate::sources::UniquenessChecker;
use crate::state::FormOptions;
use crate::validators::{
    CpfValidator, DateValidator, EmailShapeValidator, EmailUniqueValidator, MinLengthValidator,
    PasswordsMatchValidator,
};

/// Identity the personal-data config registers under.
pub const PERSONAL_DATA: &str = "personal_data";

/// Config factory for the personal-data step.
///
/// Holds the uniqueness checker its email validator needs; building the
/// config itself performs no I/O.
pub struct PersonalDataFactory {
    email_checker: Arc<dyn UniquenessChecker>,
}

impl PersonalDataFactory {
    /// Creates the factory around the given checker.
    pub fn new(email_checker: Arc<dyn UniquenessChecker>) -> Self {
        Self { email_checker }
    }
}

impl FormConfigFactory for PersonalDataFactory {
    fn build_config(&self) -> FormResult<FormConfig> {
        FormConfig::new(vec![
            FieldDefinition::new("full_name", FieldKind::Text)
                .label("Full name")
                .placeholder("Your full name")
                .required(true)
                .sync_validator(Arc::new(MinLengthValidator::new(3)))
                .error_message("required", "Tell us your full name.")
                .error_message("min_length", "The name looks too short."),
            FieldDefinition::new("document", FieldKind::Text)
                .label("CPF")
                .placeholder("000.000.000-00")
                .required(true)
                .input_mask("000.000.000-00")
                .layout_width(LayoutWidth::Half)
                .sync_validator(Arc::new(CpfValidator))
                .error_message("required", "Enter your CPF.")
                .error_message("invalid_document", "This CPF number is not valid."),
            FieldDefinition::new("birth_date", FieldKind::Date)
                .label("Birth date")
                .placeholder("dd/mm/yyyy")
                .required(true)
                .input_mask("00/00/0000")
                .layout_width(LayoutWidth::Half)
                .sync_validator(Arc::new(DateValidator::new("%d/%m/%Y")))
                .error_message("invalid_date", "Enter a date like 31/12/1990."),
            FieldDefinition::new("state", FieldKind::Select)
                .label("State")
                .required(true)
                .layout_width(LayoutWidth::Half)
                .error_message("required", "Pick a state."),
            FieldDefinition::new("city", FieldKind::Select)
                .label("City")
                .required(true)
                .layout_width(LayoutWidth::Half)
                .depends_on("state")
                .error_message("required", "Pick a city."),
            FieldDefinition::new("email", FieldKind::Email)
                .label("Email")
                .placeholder("you@example.com")
                .required(true)
                .sync_validator(Arc::new(EmailShapeValidator))
                .async_validator(Arc::new(EmailUniqueValidator::new(Arc::clone(
                    &self.email_checker,
                ))))
                .error_message("required", "Enter your email address.")
                .error_message("invalid_email", "That does not look like an email address.")
                .error_message("email_exists", "This email is already registered."),
            FieldDefinition::new("password", FieldKind::Password)
                .label("Password")
                .required(true)
                .layout_width(LayoutWidth::Half)
                .sync_validator(Arc::new(MinLengthValidator::new(6)))
                .error_message("required", "Choose a password.")
                .error_message("min_length", "Use at least 6 characters."),
            FieldDefinition::new("confirm_password", FieldKind::Password)
                .label("Confirm password")
                .required(true)
                .layout_width(LayoutWidth::Half)
                .error_message("required", "Repeat the password."),
        ])
    }
}

/// Form-wide options for the personal-data step: the password
/// confirmation rule.
pub fn personal_data_options() -> FormOptions {
    FormOptions::new().cross_validator(Arc::new(PasswordsMatchValidator::default()))
}

/// Registers the personal-data factory under [`PERSONAL_DATA`].
pub fn register_personal_data(registry: &FormRegistry, checker: Arc<dyn UniquenessChecker>) {
    registry.register(PERSONAL_DATA, Arc::new(PersonalDataFactory::new(checker)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NoOneRegistered;

    #[async_trait]
    impl UniquenessChecker for NoOneRegistered {
        async fn exists(&self, _email: &str) -> FormResult<bool> {
            Ok(false)
        }
    }

    fn build() -> FormConfig {
        PersonalDataFactory::new(Arc::new(NoOneRegistered))
            .build_config()
            .unwrap()
    }

    #[test]
    fn test_field_order() {
        let config = build();
        let keys: Vec<&str> = config.fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "full_name",
                "document",
                "birth_date",
                "state",
                "city",
                "email",
                "password",
                "confirm_password",
            ]
        );
    }

    #[test]
    fn test_city_depends_on_state() {
        let config = build();
        assert_eq!(config.get("city").unwrap().depends_on.as_deref(), Some("state"));
    }

    #[test]
    fn test_every_field_is_required() {
        let config = build();
        assert!(config.fields().iter().all(|f| f.required));
    }

    #[test]
    fn test_email_carries_async_validator() {
        let config = build();
        let email = config.get("email").unwrap();
        assert_eq!(email.async_validators.len(), 1);
        assert_eq!(email.async_validators[0].name(), "EmailUniqueValidator");
    }

    #[test]
    fn test_document_mask_and_width() {
        let config = build();
        let document = config.get("document").unwrap();
        assert_eq!(document.input_mask.as_deref(), Some("000.000.000-00"));
        assert_eq!(document.layout_width, LayoutWidth::Half);
    }

    #[test]
    fn test_register_personal_data() {
        let registry = FormRegistry::new();
        register_personal_data(&registry, Arc::new(NoOneRegistered));
        assert!(registry.is_registered(PERSONAL_DATA));
        assert_eq!(registry.resolve(PERSONAL_DATA).unwrap().len(), 8);
    }
}
