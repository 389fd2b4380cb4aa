//! # formflow-rs-core
//!
//! Core types for the formflow-rs engine: error types, settings, and
//! logging integration. This crate has no engine dependencies and provides
//! the foundation for the other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Engine settings and TOML/env loading
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;

// Re-export the most commonly used types at the crate root.
pub use error::{FormError, FormResult, ValidationError};
pub use settings::Settings;
