//! The form registry: maps form identities to config factories and
//! materializes live state from resolved configs.
//!
//! Registration and materialization live together because they are always
//! used together: a caller registers a factory once, then resolves and
//! builds per wizard session.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use formflow_rs_core::{FormError, FormResult};

use crate::config::{FormConfig, FormConfigFactory};
use crate::state::{FormOptions, FormState};

/// Registry of form config factories keyed by identity.
///
/// # Examples
///
/// ```
/// use formflow_rs_forms::config::FormConfig;
/// use formflow_rs_forms::fields::{FieldDefinition, FieldKind};
/// use formflow_rs_forms::registry::FormRegistry;
/// use std::sync::Arc;
///
/// let registry = FormRegistry::new();
/// registry.register("contact", Arc::new(|| {
///     FormConfig::new(vec![FieldDefinition::new("email", FieldKind::Email)])
/// }));
/// let config = registry.resolve("contact").unwrap();
/// assert!(config.has_field("email"));
/// ```
pub struct FormRegistry {
    factories: RwLock<HashMap<String, Arc<dyn FormConfigFactory>>>,
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a factory under a unique identity.
    ///
    /// Re-registering the same identity overwrites the prior factory
    /// (last-write-wins). Callers that need append-only semantics must
    /// check [`is_registered`](Self::is_registered) themselves.
    pub fn register(&self, identity: impl Into<String>, factory: Arc<dyn FormConfigFactory>) {
        let identity = identity.into();
        tracing::debug!(identity = %identity, "registering form config factory");
        self.factories
            .write()
            .expect("registry lock poisoned")
            .insert(identity, factory);
    }

    /// Returns `true` if a factory is registered under the identity.
    pub fn is_registered(&self, identity: &str) -> bool {
        self.factories
            .read()
            .expect("registry lock poisoned")
            .contains_key(identity)
    }

    /// Looks up the factory for `identity` and invokes it.
    ///
    /// Fails with [`FormError::UnknownFormIdentity`] when nothing is
    /// registered under the identity; factory errors propagate unchanged.
    pub fn resolve(&self, identity: &str) -> FormResult<FormConfig> {
        let factory = self
            .factories
            .read()
            .expect("registry lock poisoned")
            .get(identity)
            .cloned()
            .ok_or_else(|| FormError::UnknownFormIdentity(identity.to_string()))?;
        factory.build_config()
    }

    /// Materializes live form state from a resolved config.
    ///
    /// Every field starts with an empty value, untouched and clean, with
    /// its sync validators evaluated immediately; cross-field validators
    /// from `options` attach to the whole state.
    pub fn build_state(&self, config: FormConfig, options: FormOptions) -> FormState {
        FormState::new(config, options)
    }
}
