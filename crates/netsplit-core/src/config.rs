//! Environment configuration
//!
//! Reads partitioning defaults from environment variables. Command-line
//! flags take precedence over anything configured here.

use crate::{HostPolicy, NetsplitError, StepPolicy};
use std::env;
use thiserror::Error;

/// Step policy variable
pub const STEP_POLICY_VAR: &str = "NETSPLIT_STEP_POLICY";
/// Host policy variable
pub const HOST_POLICY_VAR: &str = "NETSPLIT_HOST_POLICY";
/// Default subnet count variable
pub const DEFAULT_COUNT_VAR: &str = "NETSPLIT_DEFAULT_COUNT";

/// Subnet count used when none is given.
pub const DEFAULT_SUBNET_COUNT: u64 = 4;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Variable is set but cannot be parsed
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

impl From<ConfigError> for NetsplitError {
    fn from(err: ConfigError) -> Self {
        NetsplitError::Config(err.to_string())
    }
}

/// Result type for configuration
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Partitioning defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub step: StepPolicy,
    pub hosts: HostPolicy,
    pub default_count: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step: StepPolicy::default(),
            hosts: HostPolicy::default(),
            default_count: DEFAULT_SUBNET_COUNT,
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    ///
    /// Unset or blank variables keep their defaults.
    ///
    /// ```
    /// use netsplit_core::{Settings, StepPolicy};
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "NETSPLIT_STEP_POLICY" => Some("minimal".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(settings.step, StepPolicy::Minimal);
    /// assert_eq!(settings.default_count, 4);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(STEP_POLICY_VAR) {
            settings.step = value.parse().map_err(|e: NetsplitError| {
                ConfigError::InvalidValue {
                    var: STEP_POLICY_VAR,
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = get(HOST_POLICY_VAR) {
            settings.hosts = value.parse().map_err(|e: NetsplitError| {
                ConfigError::InvalidValue {
                    var: HOST_POLICY_VAR,
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = get(DEFAULT_COUNT_VAR) {
            let count: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: DEFAULT_COUNT_VAR,
                reason: format!("'{}' is not a positive integer", value),
            })?;
            if count == 0 {
                return Err(ConfigError::InvalidValue {
                    var: DEFAULT_COUNT_VAR,
                    reason: "must be at least 1".to_string(),
                });
            }
            settings.default_count = count;
        }

        Ok(settings)
    }
}
