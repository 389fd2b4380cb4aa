//! Cascading dependent-field controller.
//!
//! A cascade ties a child field's available options to a parent field's
//! current value (city options depend on the selected state). The
//! controller listens on the form state's change signal; on every parent
//! change it synchronously resets the child value, then either fetches
//! fresh options or goes quiet when the parent is empty.
//!
//! Overlapping fetches follow a switch-latest discipline implemented with
//! a monotonically increasing generation counter: each fetch captures the
//! generation current when it started, and its result is applied only if
//! that generation is still current on arrival. A superseded fetch can
//! therefore never replace the option list or turn off the loading flag
//! on behalf of a newer request. Independent relationships hold
//! independent generations.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use tokio::task::JoinHandle;

use formflow_rs_core::{FormError, FormResult};

use crate::sources::Choice;
use crate::state::{FieldChange, FormState};

/// Lifecycle of one cascading relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStatus {
    /// The parent has never held a value.
    Idle,
    /// A fetch for the latest parent value is in flight.
    Loading,
    /// Options for the latest parent value are available.
    Loaded,
    /// The parent was cleared, the fetch returned nothing, or it failed.
    Empty,
}

/// Fetches the dependent field's options for a parent value.
#[async_trait]
pub trait OptionLoader: Send + Sync {
    /// Loads the options derived from the given parent value.
    async fn load(&self, parent_value: &str) -> FormResult<Vec<Choice>>;
}

struct CascadeInner {
    state: FormState,
    parent_key: String,
    child_key: String,
    loader: Arc<dyn OptionLoader>,
    generation: AtomicU64,
    status: RwLock<CascadeStatus>,
    options: RwLock<Vec<Choice>>,
    had_value: AtomicBool,
    disposed: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    receiver_id: String,
}

impl CascadeInner {
    fn on_parent_change(self: &Arc<Self>, value: &str) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // The child value resets before anything else, fetch included.
        if let Err(err) = self.state.set_value(&self.child_key, "") {
            tracing::error!(error = %err, child = %self.child_key, "cascade child reset failed");
        }

        if value.is_empty() {
            let next = if self.had_value.load(Ordering::SeqCst) {
                CascadeStatus::Empty
            } else {
                CascadeStatus::Idle
            };
            *self.status.write().expect("cascade lock poisoned") = next;
            self.options
                .write()
                .expect("cascade lock poisoned")
                .clear();
            return;
        }

        self.had_value.store(true, Ordering::SeqCst);
        *self.status.write().expect("cascade lock poisoned") = CascadeStatus::Loading;

        let inner = Arc::clone(self);
        let value = value.to_string();
        let handle = tokio::spawn(async move {
            let result = inner.loader.load(&value).await;
            inner.apply(generation, result);
        });
        self.tasks
            .lock()
            .expect("cascade lock poisoned")
            .push(handle);
    }

    fn apply(&self, generation: u64, result: FormResult<Vec<Choice>>) {
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                parent = %self.parent_key,
                child = %self.child_key,
                "discarding superseded option fetch"
            );
            return;
        }
        let (next, options) = match result {
            Ok(options) if options.is_empty() => (CascadeStatus::Empty, Vec::new()),
            Ok(options) => (CascadeStatus::Loaded, options),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    parent = %self.parent_key,
                    "option fetch failed; publishing empty list"
                );
                (CascadeStatus::Empty, Vec::new())
            }
        };
        *self.options.write().expect("cascade lock poisoned") = options;
        *self.status.write().expect("cascade lock poisoned") = next;
    }

    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.state.changes().disconnect(&self.receiver_id);
        // Invalidate any in-flight fetch.
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Subscription handle for one cascading relationship.
///
/// Dropping the handle (or calling [`dispose`](Self::dispose)) detaches
/// the listener and invalidates any in-flight fetch.
pub struct CascadeHandle {
    inner: Arc<CascadeInner>,
}

impl CascadeHandle {
    /// The relationship's current lifecycle state.
    pub fn status(&self) -> CascadeStatus {
        *self.inner.status.read().expect("cascade lock poisoned")
    }

    /// Whether the latest request is still in flight.
    ///
    /// Reflects only the most recent request; a superseded fetch never
    /// turns this off.
    pub fn loading(&self) -> bool {
        self.status() == CascadeStatus::Loading
    }

    /// The currently published option list.
    pub fn options(&self) -> Vec<Choice> {
        self.inner
            .options
            .read()
            .expect("cascade lock poisoned")
            .clone()
    }

    /// Stops the relationship: detaches from the change signal and
    /// invalidates any in-flight fetch.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Waits for all spawned fetch tasks to finish, including superseded
    /// ones whose results are discarded.
    pub async fn settled(&self) {
        let handles: Vec<JoinHandle<()>> = self
            .inner
            .tasks
            .lock()
            .expect("cascade lock poisoned")
            .drain(..)
            .collect();
        for handle in handles {
            let _ = handle.await;
        }
    }
}

impl Drop for CascadeHandle {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

/// Attaches a cascading relationship between two fields of a form state.
///
/// Both keys must exist in the state's config. The controller fires once
/// at attach time with the parent's current value (the startup event), so
/// a freshly built form begins `Idle` with the child value reset.
///
/// Returns the subscription handle; the relationship stays alive for as
/// long as the handle does.
pub fn attach_cascade(
    state: &FormState,
    parent_key: &str,
    child_key: &str,
    loader: Arc<dyn OptionLoader>,
) -> FormResult<CascadeHandle> {
    for key in [parent_key, child_key] {
        if !state.config().has_field(key) {
            return Err(FormError::UnknownFieldKey(key.to_string()));
        }
    }

    let receiver_id = format!("cascade:{parent_key}->{child_key}");
    let inner = Arc::new(CascadeInner {
        state: state.clone(),
        parent_key: parent_key.to_string(),
        child_key: child_key.to_string(),
        loader,
        generation: AtomicU64::new(0),
        status: RwLock::new(CascadeStatus::Idle),
        options: RwLock::new(Vec::new()),
        had_value: AtomicBool::new(false),
        disposed: AtomicBool::new(false),
        tasks: Mutex::new(Vec::new()),
        receiver_id: receiver_id.clone(),
    });

    let listener = Arc::clone(&inner);
    state.changes().connect(
        receiver_id,
        Arc::new(move |change: &FieldChange| {
            if change.key == listener.parent_key {
                listener.on_parent_change(&change.value);
            }
        }),
    );

    let startup_value = state.value(parent_key)?;
    inner.on_parent_change(&startup_value);

    Ok(CascadeHandle { inner })
}
