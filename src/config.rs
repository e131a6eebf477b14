use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::StaticAuth;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

const ENV_API_URL: &str = "APPTRACK_API_URL";
const ENV_TOKEN: &str = "APPTRACK_TOKEN";
const ENV_USER: &str = "APPTRACK_USER";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub username: Option<String>,
}

impl Config {
    /// Reads the config file (if any), then applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "apptrack").map(|d| d.config_dir().join("config.json"))
    }

    /// Directory for the log file written while the terminal view is open.
    pub fn data_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "apptrack")
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = Some(url);
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(user) = lookup(ENV_USER) {
            self.username = Some(user);
        }
    }

    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.api_url = url;
        }
        self
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn auth(&self) -> StaticAuth {
        StaticAuth::new(self.token.clone(), self.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthProvider;
    use std::collections::HashMap;

    #[test]
    fn test_default_api_url() {
        assert_eq!(Config::default().api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_precedence_flag_over_env_over_file() {
        let dir = std::env::temp_dir().join(format!("apptrack-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{"api_url": "http://file:1", "token": "file-token", "username": "dana"}"#,
        )
        .unwrap();

        let mut config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_url(), "http://file:1");

        let env: HashMap<&str, &str> = [(ENV_API_URL, "http://env:2"), (ENV_USER, "  ")].into();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api_url(), "http://env:2");
        assert_eq!(config.token.as_deref(), Some("file-token"));
        assert_eq!(config.username.as_deref(), Some("dana"));

        let config = config.with_api_url(Some("http://flag:3".to_string()));
        assert_eq!(config.api_url(), "http://flag:3");
        let config = config.with_api_url(None);
        assert_eq!(config.api_url(), "http://flag:3");
        assert!(config.auth().is_signed_in());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = std::env::temp_dir().join(format!("apptrack-bad-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
