//! Correlation manager configuration.

use correlate_core::{CorrelateError, Result};
use serde::{Deserialize, Serialize};

pub const LOGGING_ENABLED_ENV: &str = "CORRELATE_LOGGING_ENABLED";
pub const TRACING_ENABLED_ENV: &str = "CORRELATE_TRACING_ENABLED";

/// Process-wide switches for the correlation machinery.
///
/// Set once when the manager is built and read-only afterwards. With both
/// switches off the manager runs tasks directly without creating a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelateOptions {
    /// Open a logging scope carrying the correlation id
    pub logging_enabled: bool,

    /// Open an activity span and emit start/stop events
    pub tracing_enabled: bool,
}

impl Default for CorrelateOptions {
    fn default() -> Self {
        Self {
            logging_enabled: true,
            tracing_enabled: true,
        }
    }
}

impl CorrelateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both integrations switched off.
    pub fn disabled() -> Self {
        Self {
            logging_enabled: false,
            tracing_enabled: false,
        }
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.tracing_enabled = enabled;
        self
    }

    /// Whether any context bookkeeping happens at all.
    pub fn is_enabled(&self) -> bool {
        self.logging_enabled || self.tracing_enabled
    }

    /// Read switches from `CORRELATE_LOGGING_ENABLED` and
    /// `CORRELATE_TRACING_ENABLED`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CorrelateOptions::from_env`] with a custom variable source.
    pub fn from_lookup<L>(lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        if let Some(value) = lookup(LOGGING_ENABLED_ENV) {
            options.logging_enabled = parse_flag(LOGGING_ENABLED_ENV, &value)?;
        }
        if let Some(value) = lookup(TRACING_ENABLED_ENV) {
            options.tracing_enabled = parse_flag(TRACING_ENABLED_ENV, &value)?;
        }
        Ok(options)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CorrelateError::Configuration(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
