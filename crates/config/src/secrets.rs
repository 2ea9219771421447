// Judge vendor key
// Read from the OS keychain, else CODENEST_JUDGE_KEY. Never written to config.toml.

use std::fmt;

use crate::app_config::ConfigError;

const KEYCHAIN_SERVICE: &str = "codenest";
const JUDGE_ACCOUNT: &str = "judge/api-key";

pub const JUDGE_KEY_ENV: &str = "CODENEST_JUDGE_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Keychain,
    Environment,
    None,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeySource::Keychain => "keychain",
            KeySource::Environment => "environment",
            KeySource::None => "none",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub value: Option<String>,
    pub source: KeySource,
}

impl ResolvedKey {
    fn missing() -> Self {
        Self { value: None, source: KeySource::None }
    }
}

/// Keychain first, then the process environment
pub fn judge_api_key() -> ResolvedKey {
    if let Some(value) = keychain_get() {
        return ResolvedKey { value: Some(value), source: KeySource::Keychain };
    }
    from_env(|name| std::env::var(name).ok())
}

/// Environment half of the lookup. Blank values count as unset.
pub fn from_env<F>(lookup: F) -> ResolvedKey
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(JUDGE_KEY_ENV).map(|v| v.trim().to_string()) {
        Some(value) if !value.is_empty() => ResolvedKey { value: Some(value), source: KeySource::Environment },
        _ => ResolvedKey::missing(),
    }
}

#[cfg(feature = "keychain")]
fn entry() -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYCHAIN_SERVICE, JUDGE_ACCOUNT).map_err(|e| ConfigError::Keychain(e.to_string()))
}

#[cfg(feature = "keychain")]
fn keychain_get() -> Option<String> {
    match entry().and_then(|e| e.get_password().map_err(|e| ConfigError::Keychain(e.to_string()))) {
        Ok(value) if !value.is_empty() => Some(value),
        Ok(_) => None,
        Err(e) => {
            log::debug!("No judge key in keychain: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "keychain"))]
fn keychain_get() -> Option<String> {
    None
}

#[cfg(feature = "keychain")]
pub fn set_judge_api_key(key: &str) -> Result<(), ConfigError> {
    entry()?.set_password(key).map_err(|e| ConfigError::Keychain(e.to_string()))
}

#[cfg(feature = "keychain")]
pub fn delete_judge_api_key() -> Result<(), ConfigError> {
    entry()?.delete_credential().map_err(|e| ConfigError::Keychain(e.to_string()))
}

#[cfg(not(feature = "keychain"))]
pub fn set_judge_api_key(_key: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Keychain(format!("built without keychain support; set {}", JUDGE_KEY_ENV)))
}

#[cfg(not(feature = "keychain"))]
pub fn delete_judge_api_key() -> Result<(), ConfigError> {
    Err(ConfigError::Keychain(format!(
        "built without keychain support ({}, {})",
        KEYCHAIN_SERVICE, JUDGE_ACCOUNT
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key() {
        let key = from_env(|name| (name == JUDGE_KEY_ENV).then(|| " rk-123 \n".to_string()));
        assert_eq!(key.source, KeySource::Environment);
        assert_eq!(key.value.as_deref(), Some("rk-123"));
    }

    #[test]
    fn test_blank_env_is_missing() {
        assert_eq!(from_env(|_| Some("   ".to_string())), ResolvedKey::missing());
        assert_eq!(from_env(|_| None), ResolvedKey::missing());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(KeySource::Keychain.to_string(), "keychain");
        assert_eq!(KeySource::None.to_string(), "none");
    }
}
