//! The validator suite: synchronous field validators, the asynchronous
//! uniqueness validator, and cross-field validators.
//!
//! Validators are attached to [`FieldDefinition`](crate::fields::FieldDefinition)
//! instances (or, for cross-field validators, to the whole form via
//! [`FormOptions`](crate::state::FormOptions)) and evaluated by the form
//! state on every value change. Each validator checks a single constraint
//! and reports a [`ValidationError`] carrying a short failure code; display
//! text is resolved later through the field's error-message map.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use formflow_rs_core::ValidationError;

use crate::sources::UniquenessChecker;
use crate::state::FormValues;

/// A synchronous field validator.
///
/// Runs inline on every value change and never suspends. Implementations
/// validate one constraint and return `Err` with the failure code on
/// violation.
pub trait FieldValidator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning a failure if invalid.
    fn validate(&self, value: &str) -> Result<(), ValidationError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

/// An asynchronous field validator.
///
/// Used for checks that require I/O, such as the remote email-uniqueness
/// check. The form state evaluates async validators after synchronous
/// validation passes; their result arrives later and flips the field out
/// of `Pending`.
#[async_trait]
pub trait AsyncFieldValidator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning a failure if invalid.
    async fn validate(&self, value: &str) -> Result<(), ValidationError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

/// A cross-field validator scoped to the whole form.
///
/// Re-evaluated synchronously with the latest values whenever any field
/// value changes.
pub trait CrossFieldValidator: Send + Sync + fmt::Debug {
    /// Validates the full value map, returning a failure if invalid.
    fn validate(&self, values: &FormValues) -> Option<ValidationError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

// ── Synchronous built-ins ────────────────────────────────────────────

/// Fails with code `required` on an empty value.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredValidator;

impl FieldValidator for RequiredValidator {
    fn validate(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::new("This field is required.", "required"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "RequiredValidator"
    }
}

/// Validates that a value meets a minimum length requirement.
///
/// Fails with code `min_length`. Empty values pass — emptiness is the
/// required check's concern.
#[derive(Debug, Clone, Copy)]
pub struct MinLengthValidator {
    /// The minimum required length, in characters.
    pub min_length: usize,
}

impl MinLengthValidator {
    /// Creates a new `MinLengthValidator` with the given minimum length.
    pub const fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl FieldValidator for MinLengthValidator {
    fn validate(&self, value: &str) -> Result<(), ValidationError> {
        let len = value.chars().count();
        if len > 0 && len < self.min_length {
            return Err(ValidationError::new(
                format!(
                    "Ensure this value has at least {} characters (it has {len}).",
                    self.min_length
                ),
                "min_length",
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "MinLengthValidator"
    }
}

/// Validates a Brazilian CPF document number.
///
/// Mask punctuation is stripped before checking; the value must then be
/// eleven digits, not all equal, with both mod-11 check digits correct.
/// Fails with code `invalid_document`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpfValidator;

impl CpfValidator {
    fn check_digit(digits: &[u32], weight_start: u32) -> u32 {
        let sum: u32 = digits
            .iter()
            .zip((2..=weight_start).rev())
            .map(|(d, w)| d * w)
            .sum();
        (sum * 10) % 11 % 10
    }
}

impl FieldValidator for CpfValidator {
    fn validate(&self, value: &str) -> Result<(), ValidationError> {
        let invalid =
            || ValidationError::new("Enter a valid CPF document number.", "invalid_document");

        let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
        let extraneous = value
            .chars()
            .any(|c| !c.is_ascii_digit() && c != '.' && c != '-');
        if digits.len() != 11 || extraneous {
            return Err(invalid());
        }
        if digits.iter().all(|&d| d == digits[0]) {
            return Err(invalid());
        }

        let first = Self::check_digit(&digits[..9], 10);
        let second = Self::check_digit(&digits[..10], 11);
        if first != digits[9] || second != digits[10] {
            return Err(invalid());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "CpfValidator"
    }
}

static EMAIL_RE: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid regex")
});

/// Syntactic email-format check. Fails with code `invalid_email`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailShapeValidator;

impl FieldValidator for EmailShapeValidator {
    fn validate(&self, value: &str) -> Result<(), ValidationError> {
        if EMAIL_RE.is_match(value) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "Enter a valid email address.",
                "invalid_email",
            ))
        }
    }

    fn name(&self) -> &str {
        "EmailShapeValidator"
    }
}

/// Validates that a value parses as a calendar date in a given format.
///
/// Fails with code `invalid_date`.
#[derive(Debug, Clone)]
pub struct DateValidator {
    /// A `chrono` strftime format string, e.g. `"%d/%m/%Y"`.
    pub format: String,
}

impl DateValidator {
    /// Creates a new `DateValidator` for the given format.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl FieldValidator for DateValidator {
    fn validate(&self, value: &str) -> Result<(), ValidationError> {
        match chrono::NaiveDate::parse_from_str(value, &self.format) {
            Ok(_) => Ok(()),
            Err(_) => Err(ValidationError::new("Enter a valid date.", "invalid_date")),
        }
    }

    fn name(&self) -> &str {
        "DateValidator"
    }
}

// ── Asynchronous built-in ────────────────────────────────────────────

/// Remote email-uniqueness validator.
///
/// An empty value short-circuits to "no failure" without calling the
/// checker. When the checker reports the address exists, validation fails
/// with code `email_exists`.
///
/// A checker error (network failure, timeout) resolves to "no failure" by
/// default. That fail-open policy means an outage lets a duplicate address
/// through — it is the reference behavior, kept deliberately; call
/// [`fail_open(false)`](Self::fail_open) to fail closed with code
/// `uniqueness_unverified` instead.
pub struct EmailUniqueValidator {
    checker: Arc<dyn UniquenessChecker>,
    fail_open: bool,
}

impl EmailUniqueValidator {
    /// Creates a fail-open uniqueness validator around the given checker.
    pub fn new(checker: Arc<dyn UniquenessChecker>) -> Self {
        Self {
            checker,
            fail_open: true,
        }
    }

    /// Sets whether a checker error counts as "no failure".
    #[must_use]
    pub const fn fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }
}

impl fmt::Debug for EmailUniqueValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailUniqueValidator")
            .field("fail_open", &self.fail_open)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AsyncFieldValidator for EmailUniqueValidator {
    async fn validate(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }
        match self.checker.exists(value).await {
            Ok(true) => Err(ValidationError::new(
                "This email address is already registered.",
                "email_exists",
            )),
            Ok(false) => Ok(()),
            Err(err) => {
                if self.fail_open {
                    tracing::warn!(error = %err, "uniqueness check failed; passing value through");
                    Ok(())
                } else {
                    tracing::warn!(error = %err, "uniqueness check failed; failing closed");
                    Err(ValidationError::new(
                        "Could not verify this email address.",
                        "uniqueness_unverified",
                    ))
                }
            }
        }
    }

    fn name(&self) -> &str {
        "EmailUniqueValidator"
    }
}

// ── Cross-field built-in ─────────────────────────────────────────────

/// Validates that the password and confirmation fields hold equal values.
///
/// The mismatch failure (code `password_mismatch`) is raised only when
/// both fields are present in the value map and differ; two empty values
/// count as equal.
#[derive(Debug, Clone)]
pub struct PasswordsMatchValidator {
    /// Key of the password field.
    pub password_key: String,
    /// Key of the confirmation field.
    pub confirm_key: String,
}

impl PasswordsMatchValidator {
    /// Creates a validator comparing the two given field keys.
    pub fn new(password_key: impl Into<String>, confirm_key: impl Into<String>) -> Self {
        Self {
            password_key: password_key.into(),
            confirm_key: confirm_key.into(),
        }
    }
}

impl Default for PasswordsMatchValidator {
    fn default() -> Self {
        Self::new("password", "confirm_password")
    }
}

impl CrossFieldValidator for PasswordsMatchValidator {
    fn validate(&self, values: &FormValues) -> Option<ValidationError> {
        match (values.get(&self.password_key), values.get(&self.confirm_key)) {
            (Some(password), Some(confirm)) if password != confirm => Some(ValidationError::new(
                "The passwords do not match.",
                "password_mismatch",
            )),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        "PasswordsMatchValidator"
    }
}
