//! # Provider Configuration
//!
//! Credentials and endpoints for the Limelight APIs, plus the provisioning poll timing.
//!
//! Loaded either from the environment ([`ProviderConfig::from_env`]) or from a TOML document
//! ([`ProviderConfig::from_toml_str`]):
//!
//! ```toml
//! username = "ops"
//! api_key = "..."
//! config_api_base_url = "https://apis.llnw.com/config-api/v1"
//!
//! [provisioning]
//! timeout_secs = 600
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `LLNW_API_USERNAME` | `username` |
//! | `LLNW_API_KEY` | `api_key` |
//! | `LLNW_CONFIG_API_URL` | `config_api_base_url` |
//! | `LLNW_EDGEFUNCTIONS_API_URL` | `edgefunctions_api_base_url` |
//! | `LLNW_POLL_DELAY_MS` | `provisioning.delay_ms` |
//! | `LLNW_POLL_INTERVAL_MS` | `provisioning.interval_ms` |
//! | `LLNW_POLL_TIMEOUT_SECS` | `provisioning.timeout_secs` |

use reconcile_framework::poller::{
    DEFAULT_INITIAL_DELAY, DEFAULT_MIN_INTERVAL, DEFAULT_PROVISIONING_TIMEOUT,
};
use reconcile_framework::PollSettings;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_USERNAME: &str = "LLNW_API_USERNAME";
pub const ENV_API_KEY: &str = "LLNW_API_KEY";
pub const ENV_CONFIG_API_URL: &str = "LLNW_CONFIG_API_URL";
pub const ENV_EDGEFUNCTIONS_API_URL: &str = "LLNW_EDGEFUNCTIONS_API_URL";
pub const ENV_POLL_DELAY_MS: &str = "LLNW_POLL_DELAY_MS";
pub const ENV_POLL_INTERVAL_MS: &str = "LLNW_POLL_INTERVAL_MS";
pub const ENV_POLL_TIMEOUT_SECS: &str = "LLNW_POLL_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("{name} must be a non-negative integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{name} must not end with '/': {value}")]
    TrailingSlash { name: &'static str, value: String },

    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Poll timing for asynchronously provisioned resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    pub delay_ms: u64,
    pub interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_INITIAL_DELAY.as_millis() as u64,
            interval_ms: DEFAULT_MIN_INTERVAL.as_millis() as u64,
            timeout_secs: DEFAULT_PROVISIONING_TIMEOUT.as_secs(),
        }
    }
}

impl From<ProvisioningConfig> for PollSettings {
    fn from(c: ProvisioningConfig) -> Self {
        PollSettings {
            initial_delay: Duration::from_millis(c.delay_ms),
            min_interval: Duration::from_millis(c.interval_ms),
            timeout: Duration::from_secs(c.timeout_secs),
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct ProviderConfig {
    pub username: String,
    pub api_key: String,
    /// `None` leaves the choice of endpoint to the API client.
    #[serde(default)]
    pub config_api_base_url: Option<String>,
    #[serde(default)]
    pub edgefunctions_api_base_url: Option<String>,
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .field("config_api_base_url", &self.config_api_base_url)
            .field("edgefunctions_api_base_url", &self.edgefunctions_api_base_url)
            .field("provisioning", &self.provisioning)
            .finish()
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}

impl ProviderConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from any variable source. Unset and empty variables are treated
    /// alike.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let mut provisioning = ProvisioningConfig::default();
        if let Some(v) = get(ENV_POLL_DELAY_MS) {
            provisioning.delay_ms = parse_number(ENV_POLL_DELAY_MS, v)?;
        }
        if let Some(v) = get(ENV_POLL_INTERVAL_MS) {
            provisioning.interval_ms = parse_number(ENV_POLL_INTERVAL_MS, v)?;
        }
        if let Some(v) = get(ENV_POLL_TIMEOUT_SECS) {
            provisioning.timeout_secs = parse_number(ENV_POLL_TIMEOUT_SECS, v)?;
        }

        let config = Self {
            username: get(ENV_USERNAME).ok_or(ConfigError::Missing(ENV_USERNAME))?,
            api_key: get(ENV_API_KEY).ok_or(ConfigError::Missing(ENV_API_KEY))?,
            config_api_base_url: get(ENV_CONFIG_API_URL),
            edgefunctions_api_base_url: get(ENV_EDGEFUNCTIONS_API_URL),
            provisioning,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::Empty("username"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Empty("api_key"));
        }
        let urls = [
            ("config_api_base_url", &self.config_api_base_url),
            ("edgefunctions_api_base_url", &self.edgefunctions_api_base_url),
        ];
        for (name, url) in urls {
            if let Some(url) = url.as_ref().filter(|u| u.ends_with('/')) {
                return Err(ConfigError::TrailingSlash {
                    name,
                    value: url.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn poll_settings(&self) -> PollSettings {
        self.provisioning.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_env_defaults_poll_timing() {
        let config =
            ProviderConfig::from_lookup(lookup(&[(ENV_USERNAME, "ops"), (ENV_API_KEY, "k")]))
                .unwrap();

        assert_eq!(config.config_api_base_url, None);
        assert_eq!(config.poll_settings(), PollSettings::default());
    }

    #[test]
    fn test_env_overrides_poll_timing() {
        let config = ProviderConfig::from_lookup(lookup(&[
            (ENV_USERNAME, "ops"),
            (ENV_API_KEY, "k"),
            (ENV_CONFIG_API_URL, "https://config.example.com/v1"),
            (ENV_POLL_DELAY_MS, "10"),
            (ENV_POLL_TIMEOUT_SECS, "60"),
        ]))
        .unwrap();

        let settings = config.poll_settings();
        assert_eq!(settings.initial_delay, Duration::from_millis(10));
        assert_eq!(settings.min_interval, Duration::from_secs(1));
        assert_eq!(settings.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_and_malformed_settings() {
        let err = ProviderConfig::from_lookup(lookup(&[(ENV_API_KEY, "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ENV_USERNAME)));

        let err = ProviderConfig::from_lookup(lookup(&[
            (ENV_USERNAME, "ops"),
            (ENV_API_KEY, "k"),
            (ENV_POLL_INTERVAL_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("LLNW_POLL_INTERVAL_MS"));
    }

    #[test]
    fn test_toml_with_trailing_slash_is_rejected() {
        let err = ProviderConfig::from_toml_str(
            r#"
            username = "ops"
            api_key = "k"
            edgefunctions_api_base_url = "https://ef.example.com/"
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TrailingSlash {
                name: "edgefunctions_api_base_url",
                ..
            }
        ));
    }

    #[test]
    fn test_toml_partial_provisioning_and_redaction() {
        let config = ProviderConfig::from_toml_str(
            r#"
            username = "ops"
            api_key = "top-secret"

            [provisioning]
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.provisioning.timeout_secs, 5);
        assert_eq!(config.provisioning.delay_ms, 1000);
        assert!(!format!("{config:?}").contains("top-secret"));
    }
}
