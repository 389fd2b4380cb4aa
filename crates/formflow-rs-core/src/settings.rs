//! Engine settings.
//!
//! [`Settings`] holds the small amount of configuration the engine reads:
//! logging verbosity and the remote-failure policy. Settings load from a
//! TOML file with `FORMFLOW_*` environment variables taking precedence.

use serde::{Deserialize, Serialize};

use crate::error::{FormError, FormResult};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enables pretty, human-readable log output.
    pub debug: bool,
    /// Log filter directive (e.g. "info", "formflow=debug").
    pub log_level: String,
    /// Whether a failed remote uniqueness check counts as "no failure".
    ///
    /// The reference behavior is fail-open: a network outage during the
    /// email-existence check lets the value pass validation. Set to
    /// `false` to fail closed instead.
    pub fail_open_remote_checks: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            fail_open_remote_checks: true,
        }
    }
}

impl Settings {
    /// Loads settings from a TOML string.
    ///
    /// Fields absent from the TOML keep their default values.
    pub fn from_toml_str(toml_str: &str) -> FormResult<Self> {
        toml::from_str(toml_str).map_err(|e| FormError::Settings(e.to_string()))
    }

    /// Loads settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> FormResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FormError::Settings(format!("cannot read settings file: {e}")))?;
        Self::from_toml_str(&contents)
    }

    /// Loads settings from a JSON string.
    pub fn from_json_str(json_str: &str) -> FormResult<Self> {
        serde_json::from_str(json_str).map_err(|e| FormError::Settings(e.to_string()))
    }

    /// Loads settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> FormResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| FormError::Settings(format!("cannot read settings file: {e}")))?;
        Self::from_json_str(&contents)
    }

    /// Applies `FORMFLOW_*` environment variable overrides.
    ///
    /// | Env var | Setting |
    /// |---|---|
    /// | `FORMFLOW_DEBUG` | `debug` |
    /// | `FORMFLOW_LOG_LEVEL` | `log_level` |
    /// | `FORMFLOW_FAIL_OPEN_REMOTE_CHECKS` | `fail_open_remote_checks` |
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("FORMFLOW_DEBUG") {
            self.debug = parse_bool(&v).unwrap_or(self.debug);
        }
        if let Ok(v) = std::env::var("FORMFLOW_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Ok(v) = std::env::var("FORMFLOW_FAIL_OPEN_REMOTE_CHECKS") {
            self.fail_open_remote_checks = parse_bool(&v).unwrap_or(self.fail_open_remote_checks);
        }
        self
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
