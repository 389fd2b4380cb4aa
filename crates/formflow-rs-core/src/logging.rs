//! Logging integration for the formflow-rs engine.
//!
//! Provides a helper for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-form spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The log filter is read from `settings.log_level`. In debug mode a
/// pretty, human-readable format is used; otherwise a structured JSON
/// format is used. Installing a second subscriber is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one form session.
///
/// Attach this span around form interaction so that log entries emitted by
/// validators and cascades carry the form identity.
///
/// # Examples
///
/// ```
/// use formflow_rs_core::logging::form_span;
///
/// let span = form_span("personal_data");
/// let _guard = span.enter();
/// tracing::info!("building form state");
/// ```
pub fn form_span(identity: &str) -> tracing::Span {
    tracing::info_span!("form", identity = identity)
}
