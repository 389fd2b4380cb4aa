//! Live form state.
//!
//! [`FormState`] is the runtime counterpart of a
//! [`FormConfig`](crate::config::FormConfig): per-field current values,
//! validity, touched/dirty flags, plus form-wide cross-field failures and
//! aggregate validity. One state is owned by one wizard session; it is a
//! cheaply cloneable handle so attached listeners (cascading controllers,
//! async validation tasks) can share it.
//!
//! The evaluation order on a value change is fixed: synchronous validators
//! and cross-field validators complete before [`FormState::set_value`]
//! returns; asynchronous validator results arrive later, flipping the
//! field out of `Pending`, and are guarded by a per-field generation
//! counter so a superseded check can never clobber a newer value's result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tokio::task::JoinHandle;

use formflow_rs_core::{FormError, FormResult, ValidationError};
use formflow_rs_signals::Signal;

use crate::config::FormConfig;
use crate::fields::FieldDefinition;
use crate::validators::{
    AsyncFieldValidator, CrossFieldValidator, FieldValidator, RequiredValidator,
};

/// A snapshot of every field's current value, keyed by field key.
pub type FormValues = HashMap<String, String>;

/// Validity of a field or of the whole form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityStatus {
    /// Asynchronous validation is still in flight.
    Pending,
    /// All attached validators pass.
    Valid,
    /// At least one validator failed.
    Invalid,
}

/// Payload announced on every field value change.
#[derive(Debug, Clone)]
pub struct FieldChange {
    /// Key of the field that changed.
    pub key: String,
    /// The new value.
    pub value: String,
}

/// Read-only view of one field's live state.
#[derive(Debug, Clone)]
pub struct FieldSnapshot {
    /// Current value.
    pub value: String,
    /// Current validity.
    pub status: ValidityStatus,
    /// Whether the field has been marked touched.
    pub touched: bool,
    /// Whether the value has changed since the state was built or reset.
    pub dirty: bool,
    /// Codes of the currently failing validators.
    pub failure_codes: Vec<String>,
}

/// Form-wide options applied when materializing state.
#[derive(Default)]
pub struct FormOptions {
    cross_validators: Vec<Arc<dyn CrossFieldValidator>>,
}

impl FormOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a cross-field validator to the whole form.
    #[must_use]
    pub fn cross_validator(mut self, validator: Arc<dyn CrossFieldValidator>) -> Self {
        self.cross_validators.push(validator);
        self
    }
}

struct FieldSlot {
    value: String,
    status: ValidityStatus,
    touched: bool,
    dirty: bool,
    failures: Vec<ValidationError>,
    generation: u64,
}

struct StateInner {
    config: Arc<FormConfig>,
    fields: RwLock<HashMap<String, FieldSlot>>,
    cross_validators: Vec<Arc<dyn CrossFieldValidator>>,
    cross_failures: RwLock<Vec<ValidationError>>,
    changes: Signal<FieldChange>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Live, mutable runtime instance of a form config.
#[derive(Clone)]
pub struct FormState {
    inner: Arc<StateInner>,
}

impl FormState {
    /// Materializes fresh state from a config.
    ///
    /// Every field starts with an empty value, untouched and clean. Sync
    /// validators are evaluated immediately, so a required field begins
    /// `Invalid` (with its message hidden until the field is touched);
    /// async validators first run on a value change.
    pub fn new(config: FormConfig, options: FormOptions) -> Self {
        let config = Arc::new(config);
        let mut slots = HashMap::new();
        for field in config.fields() {
            slots.insert(field.key.clone(), Self::fresh_slot(field));
        }

        let state = Self {
            inner: Arc::new(StateInner {
                config,
                fields: RwLock::new(slots),
                cross_validators: options.cross_validators,
                cross_failures: RwLock::new(Vec::new()),
                changes: Signal::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        };
        state.revalidate_cross();
        state
    }

    fn fresh_slot(field: &FieldDefinition) -> FieldSlot {
        let failures = evaluate_sync(field, "");
        let status = if failures.is_empty() {
            ValidityStatus::Valid
        } else {
            ValidityStatus::Invalid
        };
        FieldSlot {
            value: String::new(),
            status,
            touched: false,
            dirty: false,
            failures,
            generation: 0,
        }
    }

    /// The config this state was built from.
    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    /// The value-change signal; listeners are invoked synchronously on
    /// every [`set_value`](Self::set_value).
    pub fn changes(&self) -> &Signal<FieldChange> {
        &self.inner.changes
    }

    /// Sets a field's value.
    ///
    /// Synchronously: stores the value, marks the field dirty, runs its
    /// sync validators, re-evaluates every cross-field validator against
    /// the latest values, and announces the change. When sync validation
    /// passes and the field carries async validators, the field turns
    /// `Pending` and an async validation task is spawned; a later
    /// `set_value` on the same field supersedes it.
    ///
    /// Must be called from within a Tokio runtime when the field has
    /// async validators.
    pub fn set_value(&self, key: &str, value: impl Into<String>) -> FormResult<()> {
        let value = value.into();
        let field = self
            .inner
            .config
            .get(key)
            .ok_or_else(|| FormError::UnknownFieldKey(key.to_string()))?
            .clone();

        let (generation, run_async) = {
            let mut fields = self.inner.fields.write().expect("form state lock poisoned");
            let slot = fields
                .get_mut(key)
                .ok_or_else(|| FormError::UnknownFieldKey(key.to_string()))?;
            slot.value.clone_from(&value);
            slot.dirty = true;
            slot.generation += 1;
            slot.failures = evaluate_sync(&field, &value);
            if !slot.failures.is_empty() {
                slot.status = ValidityStatus::Invalid;
                (slot.generation, false)
            } else if field.async_validators.is_empty() {
                slot.status = ValidityStatus::Valid;
                (slot.generation, false)
            } else {
                slot.status = ValidityStatus::Pending;
                (slot.generation, true)
            }
        };

        self.revalidate_cross();

        if run_async {
            self.spawn_async_validation(&field, &value, generation);
        }

        self.inner.changes.send(&FieldChange {
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    fn spawn_async_validation(&self, field: &FieldDefinition, value: &str, generation: u64) {
        let state = self.clone();
        let key = field.key.clone();
        let value = value.to_string();
        let validators = field.async_validators.clone();
        let handle = tokio::spawn(async move {
            let mut failures = Vec::new();
            for validator in &validators {
                if let Err(err) = validator.validate(&value).await {
                    failures.push(err);
                }
            }
            state.apply_async_outcome(&key, generation, failures);
        });
        self.inner
            .tasks
            .lock()
            .expect("form state lock poisoned")
            .push(handle);
    }

    fn apply_async_outcome(&self, key: &str, generation: u64, failures: Vec<ValidationError>) {
        let mut fields = self.inner.fields.write().expect("form state lock poisoned");
        let Some(slot) = fields.get_mut(key) else {
            return;
        };
        if slot.generation != generation {
            tracing::debug!(key, "discarding superseded async validation result");
            return;
        }
        slot.status = if failures.is_empty() {
            ValidityStatus::Valid
        } else {
            ValidityStatus::Invalid
        };
        slot.failures = failures;
    }

    fn revalidate_cross(&self) {
        let values = self.values();
        let failures: Vec<ValidationError> = self
            .inner
            .cross_validators
            .iter()
            .filter_map(|v| v.validate(&values))
            .collect();
        *self
            .inner
            .cross_failures
            .write()
            .expect("form state lock poisoned") = failures;
    }

    /// Marks one field as touched.
    pub fn mark_touched(&self, key: &str) -> FormResult<()> {
        let mut fields = self.inner.fields.write().expect("form state lock poisoned");
        let slot = fields
            .get_mut(key)
            .ok_or_else(|| FormError::UnknownFieldKey(key.to_string()))?;
        slot.touched = true;
        Ok(())
    }

    /// Marks every field as touched, making pending error messages
    /// visible.
    pub fn mark_all_touched(&self) {
        let mut fields = self.inner.fields.write().expect("form state lock poisoned");
        for slot in fields.values_mut() {
            slot.touched = true;
        }
    }

    /// Returns one field's current value.
    pub fn value(&self, key: &str) -> FormResult<String> {
        Ok(self.snapshot(key)?.value)
    }

    /// Returns one field's current validity.
    pub fn status(&self, key: &str) -> FormResult<ValidityStatus> {
        Ok(self.snapshot(key)?.status)
    }

    /// Returns a read-only view of one field's live state.
    pub fn snapshot(&self, key: &str) -> FormResult<FieldSnapshot> {
        let fields = self.inner.fields.read().expect("form state lock poisoned");
        let slot = fields
            .get(key)
            .ok_or_else(|| FormError::UnknownFieldKey(key.to_string()))?;
        Ok(FieldSnapshot {
            value: slot.value.clone(),
            status: slot.status,
            touched: slot.touched,
            dirty: slot.dirty,
            failure_codes: slot.failures.iter().map(|f| f.code.clone()).collect(),
        })
    }

    /// Returns every field's current value.
    pub fn values(&self) -> FormValues {
        let fields = self.inner.fields.read().expect("form state lock poisoned");
        self.inner
            .config
            .fields()
            .iter()
            .filter_map(|f| fields.get(&f.key).map(|s| (f.key.clone(), s.value.clone())))
            .collect()
    }

    /// Returns the values of the given fields only, e.g. the subset a
    /// caller persists through a record sink.
    pub fn values_subset(&self, keys: &[&str]) -> FormResult<FormValues> {
        let fields = self.inner.fields.read().expect("form state lock poisoned");
        let mut subset = FormValues::new();
        for key in keys {
            let slot = fields
                .get(*key)
                .ok_or_else(|| FormError::UnknownFieldKey((*key).to_string()))?;
            subset.insert((*key).to_string(), slot.value.clone());
        }
        Ok(subset)
    }

    /// Returns one field's failure messages, resolved through the field's
    /// error-message map with the validator's default text as fallback.
    pub fn error_messages(&self, key: &str) -> FormResult<Vec<String>> {
        let field = self
            .inner
            .config
            .get(key)
            .ok_or_else(|| FormError::UnknownFieldKey(key.to_string()))?;
        let fields = self.inner.fields.read().expect("form state lock poisoned");
        let slot = fields
            .get(key)
            .ok_or_else(|| FormError::UnknownFieldKey(key.to_string()))?;
        Ok(slot
            .failures
            .iter()
            .map(|failure| {
                field
                    .error_messages
                    .get(&failure.code)
                    .cloned()
                    .unwrap_or_else(|| failure.message.clone())
            })
            .collect())
    }

    /// Returns the current cross-field failures.
    pub fn cross_failures(&self) -> Vec<ValidationError> {
        self.inner
            .cross_failures
            .read()
            .expect("form state lock poisoned")
            .clone()
    }

    /// Aggregate validity: `Invalid` if any field is invalid or any
    /// cross-field validator fails, else `Pending` while any field awaits
    /// async validation, else `Valid`.
    pub fn validity(&self) -> ValidityStatus {
        if !self.cross_failures().is_empty() {
            return ValidityStatus::Invalid;
        }
        let fields = self.inner.fields.read().expect("form state lock poisoned");
        let mut pending = false;
        for slot in fields.values() {
            match slot.status {
                ValidityStatus::Invalid => return ValidityStatus::Invalid,
                ValidityStatus::Pending => pending = true,
                ValidityStatus::Valid => {}
            }
        }
        if pending {
            ValidityStatus::Pending
        } else {
            ValidityStatus::Valid
        }
    }

    /// Gates forward navigation on aggregate validity.
    ///
    /// Returns `true` when the form is `Valid`. Otherwise every field is
    /// marked touched — so pending error messages become visible — and
    /// `false` is returned.
    pub fn gate_navigation(&self) -> bool {
        if self.validity() == ValidityStatus::Valid {
            true
        } else {
            self.mark_all_touched();
            false
        }
    }

    /// Resets the state to how it was just built: empty values, untouched
    /// and clean, sync validators re-evaluated, in-flight async results
    /// invalidated. Each field's change is announced so attached
    /// listeners follow the reset.
    pub fn reset(&self) {
        {
            let mut fields = self.inner.fields.write().expect("form state lock poisoned");
            for field in self.inner.config.fields() {
                if let Some(slot) = fields.get_mut(&field.key) {
                    let generation = slot.generation + 1;
                    *slot = Self::fresh_slot(field);
                    slot.generation = generation;
                }
            }
        }
        self.revalidate_cross();
        for field in self.inner.config.fields() {
            self.inner.changes.send(&FieldChange {
                key: field.key.clone(),
                value: String::new(),
            });
        }
    }

    /// Waits for all spawned async validation tasks to finish, including
    /// superseded ones whose results are discarded.
    pub async fn settled(&self) {
        let handles: Vec<JoinHandle<()>> = self
            .inner
            .tasks
            .lock()
            .expect("form state lock poisoned")
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

/// Runs the synchronous validation pipeline for one field.
///
/// An empty value is the required check's concern alone: it fails a
/// required field with code `required` and passes an optional one, with
/// no other sync validator consulted either way.
fn evaluate_sync(field: &FieldDefinition, value: &str) -> Vec<ValidationError> {
    if value.is_empty() {
        if field.required {
            return vec![RequiredValidator
                .validate(value)
                .expect_err("empty value must fail the required check")];
        }
        return Vec::new();
    }
    field
        .sync_validators
        .iter()
        .filter_map(|v| v.validate(value).err())
        .collect()
}
