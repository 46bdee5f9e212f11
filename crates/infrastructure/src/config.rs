//! Process configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::persistence::FileWorkspaceStateRepository;

/// Overrides the workspace state file location.
pub const STATE_FILE_VAR: &str = "PARCEL_STATE_FILE";
/// Per-request timeout in whole seconds.
pub const REQUEST_TIMEOUT_VAR: &str = "PARCEL_REQUEST_TIMEOUT_SECS";
/// `User-Agent` sent with every request.
pub const USER_AGENT_VAR: &str = "PARCEL_USER_AGENT";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for configuration resolution.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to something unusable.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
        /// What was expected.
        reason: &'static str,
    },

    /// No state file override and no platform config directory.
    #[error("could not determine config directory; set {STATE_FILE_VAR}")]
    NoConfigDir,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Location of the persisted workspace state.
    pub state_file: PathBuf,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable with an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the configuration through `lookup`, which returns the value
    /// of a variable if set.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable with an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let state_file = match lookup(STATE_FILE_VAR).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => FileWorkspaceStateRepository::default_location()
                .ok_or(ConfigError::NoConfigDir)?,
        };

        let request_timeout = match lookup(REQUEST_TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: REQUEST_TIMEOUT_VAR,
                        value: raw,
                        reason: "expected a positive number of seconds",
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let user_agent = match lookup(USER_AGENT_VAR) {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::InvalidValue {
                    name: USER_AGENT_VAR,
                    value: raw,
                    reason: "must not be blank",
                });
            }
            Some(raw) => raw,
            None => default_user_agent(),
        };

        Ok(Self {
            state_file,
            request_timeout,
            user_agent,
        })
    }
}

fn default_user_agent() -> String {
    format!("Parcel/{}", env!("CARGO_PKG_VERSION"))
}
