//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use clubroster_infra::DEFAULT_RESOLVE_TIMEOUT;
use clubroster_observability::LogFormat;

pub const BIND_VAR: &str = "CLUBROSTER_BIND";
pub const RESOLVE_TIMEOUT_VAR: &str = "CLUBROSTER_RESOLVE_TIMEOUT_MS";
pub const LOG_FORMAT_VAR: &str = "CLUBROSTER_LOG_FORMAT";
pub const SEED_DEMO_VAR: &str = "CLUBROSTER_SEED_DEMO";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid value: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub resolve_timeout: Duration,
    pub log_format: LogFormat,
    /// Populate the stores with demo members and tokens on startup.
    pub seed_demo: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            log_format: LogFormat::default(),
            seed_demo: false,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Unset variables fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind = match lookup(BIND_VAR) {
            Some(raw) => raw.parse().map_err(|e| ConfigError::invalid(BIND_VAR, e))?,
            None => defaults.bind,
        };

        let resolve_timeout = match lookup(RESOLVE_TIMEOUT_VAR) {
            Some(raw) => {
                let ms: u64 = raw
                    .parse()
                    .map_err(|e| ConfigError::invalid(RESOLVE_TIMEOUT_VAR, e))?;
                if ms == 0 {
                    return Err(ConfigError::invalid(RESOLVE_TIMEOUT_VAR, "must be positive"));
                }
                Duration::from_millis(ms)
            }
            None => defaults.resolve_timeout,
        };

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse().map_err(|e| ConfigError::invalid(LOG_FORMAT_VAR, e))?,
            None => defaults.log_format,
        };

        let seed_demo = match lookup(SEED_DEMO_VAR).as_deref().map(str::trim) {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(ConfigError::invalid(
                    SEED_DEMO_VAR,
                    format!("expected true/false, got '{other}'"),
                ));
            }
        };

        Ok(Self {
            bind,
            resolve_timeout,
            log_format,
            seed_demo,
        })
    }
}
