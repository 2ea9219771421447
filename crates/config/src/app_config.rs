// Application config
// Loaded from ~/.config/codenest/config.toml, then overridden by environment

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const API_BASE_ENV: &str = "CODENEST_API_BASE";
pub const JUDGE_URL_ENV: &str = "CODENEST_JUDGE_URL";
pub const JUDGE_HOST_ENV: &str = "CODENEST_JUDGE_HOST";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write config {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("keychain error: {0}")]
    Keychain(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Base URL of the judge service (Judge0 CE compatible)
    pub base_url: String,
    /// Value for the vendor host header, if the gateway wants one
    pub host: Option<String>,
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://judge0-ce.p.rapidapi.com".to_string(),
            host: Some("judge0-ce.p.rapidapi.com".to_string()),
            poll_interval_ms: 1000,
            max_attempts: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Own backend, including the `/api` prefix
    pub api_base: String,
    pub judge: JudgeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000/api".to_string(),
            judge: JudgeConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codenest")
            .join("config.toml")
    }

    /// Load the default config file plus environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load a config file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |message: String| ConfigError::Write { path: path.to_path_buf(), message };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let contents = toml::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        fs::write(path, contents).map_err(|e| write_err(e.to_string()))
    }

    /// Apply overrides from a variable lookup (the process environment in practice)
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(v) = non_empty(API_BASE_ENV) {
            self.api_base = v;
        }
        if let Some(v) = non_empty(JUDGE_URL_ENV) {
            self.judge.base_url = v;
        }
        if let Some(v) = non_empty(JUDGE_HOST_ENV) {
            self.judge.host = Some(v);
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();
        self.judge.base_url = self.judge.base_url.trim_end_matches('/').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_base = \"https://ide.example.com/api\"\n\n[judge]\nmax_attempts = 5\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.api_base, "https://ide.example.com/api");
        assert_eq!(config.judge.max_attempts, 5);
        assert_eq!(config.judge.poll_interval_ms, 1000);
    }

    #[test]
    fn test_bad_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_base = ").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let mut config = AppConfig::default();
        config.judge.host = Some("judge.internal".to_string());
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (API_BASE_ENV, "https://api.example.com/api/"),
            (JUDGE_URL_ENV, "http://localhost:2358"),
            (JUDGE_HOST_ENV, ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.api_base, "https://api.example.com/api");
        assert_eq!(config.judge.base_url, "http://localhost:2358");
        // Empty override is ignored
        assert_eq!(config.judge.host.as_deref(), Some("judge0-ce.p.rapidapi.com"));
    }
}
