//! Core error types for the formflow-rs engine.
//!
//! Two kinds of failure flow through the engine and they are deliberately
//! kept apart: [`FormError`] covers configuration and collaborator errors
//! that propagate to the caller, while [`ValidationError`] is a plain value
//! describing a validation failure — it lives inside form state and is
//! never raised through a `Result`.

use std::fmt;

use thiserror::Error;

/// A single validation failure produced by a validator.
///
/// Carries a short machine-readable `code` (e.g. `"required"`,
/// `"min_length"`, `"email_exists"`) used to look up display text in a
/// field's error-message map, and a default human-readable `message` used
/// when no custom text is configured.
///
/// # Examples
///
/// ```
/// use formflow_rs_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.code, "required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Default human-readable message.
    pub message: String,
    /// Short code identifying the kind of failure.
    pub code: String,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the formflow-rs engine.
///
/// Configuration errors (`UnknownFormIdentity`, `DanglingDependsOn`,
/// `DuplicateFieldKey`) are programmer errors: they fail fast at
/// resolution or construction time and abort form construction entirely.
/// `RemoteCall` is produced by collaborator implementations; the engine
/// itself converts remote failures into neutral results (fail-open
/// validation, empty cascade options) rather than surfacing them.
#[derive(Error, Debug)]
pub enum FormError {
    /// No factory is registered under the requested form identity.
    #[error("no form config registered under identity '{0}'")]
    UnknownFormIdentity(String),

    /// A field's `depends_on` names a key absent from the same config.
    #[error("field '{field}' depends on unknown field '{depends_on}'")]
    DanglingDependsOn {
        /// The field carrying the dangling reference.
        field: String,
        /// The missing key it points at.
        depends_on: String,
    },

    /// Two fields in one config share the same key.
    #[error("duplicate field key '{0}' in form config")]
    DuplicateFieldKey(String),

    /// An operation addressed a field the form state does not hold.
    #[error("unknown field key '{0}'")]
    UnknownFieldKey(String),

    /// A collaborator call (uniqueness check, option fetch) failed.
    #[error("remote call failed: {0}")]
    RemoteCall(String),

    /// Settings could not be loaded or parsed.
    #[error("invalid settings: {0}")]
    Settings(String),
}

/// A convenience type alias for `Result<T, FormError>`.
pub type FormResult<T> = Result<T, FormError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_unknown_identity_display() {
        let err = FormError::UnknownFormIdentity("personal_data".into());
        assert_eq!(
            err.to_string(),
            "no form config registered under identity 'personal_data'"
        );
    }

    #[test]
    fn test_dangling_depends_on_display() {
        let err = FormError::DanglingDependsOn {
            field: "city".into(),
            depends_on: "state".into(),
        };
        assert!(err.to_string().contains("city"));
        assert!(err.to_string().contains("state"));
    }

    #[test]
    fn test_remote_call_display() {
        let err = FormError::RemoteCall("connection refused".into());
        assert_eq!(err.to_string(), "remote call failed: connection refused");
    }
}
