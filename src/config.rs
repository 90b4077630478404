use std::env;
use std::time::Duration;

use crate::core::DEFAULT_FORMAT_CODE;
use crate::download::{METADATA_TIMEOUT, PROVIDER_TIMEOUT};
use crate::error::{ResolveError, Result};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_address: String,
    pub provider_timeout: Duration,
    pub metadata_timeout: Duration,
    pub default_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            provider_timeout: PROVIDER_TIMEOUT,
            metadata_timeout: METADATA_TIMEOUT,
            default_format: DEFAULT_FORMAT_CODE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; unset or empty keys keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind_address = get("YTRESOLVE_BIND").unwrap_or(defaults.bind_address);
        let provider_timeout = match get("YTRESOLVE_PROVIDER_TIMEOUT_SECS") {
            Some(v) => parse_secs("YTRESOLVE_PROVIDER_TIMEOUT_SECS", &v)?,
            None => defaults.provider_timeout,
        };
        let metadata_timeout = match get("YTRESOLVE_METADATA_TIMEOUT_SECS") {
            Some(v) => parse_secs("YTRESOLVE_METADATA_TIMEOUT_SECS", &v)?,
            None => defaults.metadata_timeout,
        };
        let default_format = get("YTRESOLVE_DEFAULT_FORMAT").unwrap_or(defaults.default_format);

        Ok(Self {
            bind_address,
            provider_timeout,
            metadata_timeout,
            default_format,
        })
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| ResolveError::Config(format!("{key} must be a whole number of seconds, got {value:?}")))?;
    if secs == 0 {
        return Err(ResolveError::Config(format!("{key} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}
