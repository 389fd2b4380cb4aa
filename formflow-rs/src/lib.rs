//! # formflow-rs
//!
//! Dynamic form construction and validation engine for multi-step
//! registration wizards.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. You can depend on `formflow-rs` to get the whole engine, or on
//! individual crates for finer-grained control.

/// Core types: settings, logging, and error types.
pub use formflow_rs_core as core;

/// Synchronous change-notification dispatch.
pub use formflow_rs_signals as signals;

/// The form engine: configs, state, validators, and cascades.
pub use formflow_rs_forms as forms;
