//! Generator API key storage.
//!
//! The environment wins over the OS keyring so CI and one-off runs never
//! touch the user's secret store.

use crate::error::ConfigError;

const SERVICE: &str = "wayfarer";

/// Keyring entry holding the text generator's API key.
pub const GENERATOR_API_KEY: &str = "generator_api_key";

fn entry(key: &str) -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(SERVICE, key).map_err(|e| ConfigError::Credentials(e.to_string()))
}

pub fn get(key: &str) -> Result<Option<String>, ConfigError> {
    match entry(key)?.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(ConfigError::Credentials(e.to_string())),
    }
}

pub fn set(key: &str, value: &str) -> Result<(), ConfigError> {
    entry(key)?
        .set_password(value)
        .map_err(|e| ConfigError::Credentials(e.to_string()))
}

/// Removing an absent entry is not an error.
pub fn delete(key: &str) -> Result<(), ConfigError> {
    match entry(key)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(ConfigError::Credentials(e.to_string())),
    }
}

/// API key for the text generator: `env_var` if set and non-empty, else the
/// keyring entry.
pub fn generator_api_key(env_var: &str) -> Result<Option<String>, ConfigError> {
    if let Some(key) = from_env(env_var) {
        return Ok(Some(key));
    }
    get(GENERATOR_API_KEY)
}

fn from_env(env_var: &str) -> Option<String> {
    if env_var.is_empty() {
        return None;
    }
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
