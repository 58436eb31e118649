//! Configuration management for todocore.
//!
//! This module handles loading and saving application configuration to/from
//! a JSON file in an explicitly provided directory. It carries the remote
//! endpoint, the static bearer credential, the client tag written into
//! `last_updated_by`, and the snapshot file location.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TodoError, TodoResult};
use crate::models::DEFAULT_CLIENT_ID;

fn default_base_url() -> String {
    "https://hive.mrdekk.ru/todo".to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigData {
    /// Base URL of the remote list service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Static bearer credential sent on every request
    #[serde(default)]
    pub token: String,
    /// Client tag recorded in `last_updated_by`
    #[serde(default = "default_client_id")]
    pub client_id: String,
    /// Path to the snapshot file
    #[serde(default)]
    pub snapshot_file: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Accept self-signed server certificates. Explicit trust knob; off
    /// unless the deployment really needs it.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            client_id: default_client_id(),
            snapshot_file: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            accept_invalid_certs: false,
        }
    }
}

/// Configuration manager
pub struct Config {
    config_dir: PathBuf,
    config_file: PathBuf,
    data: ConfigData,
}

impl Config {
    /// Create a new configuration manager rooted at `config_dir`.
    ///
    /// The directory is created when missing; a corrupt or unreadable
    /// config file falls back to defaults.
    pub fn new(config_dir: impl Into<PathBuf>) -> TodoResult<Self> {
        let config_dir = config_dir.into();
        fs::create_dir_all(&config_dir)?;
        let config_file = config_dir.join("config.json");

        let mut data = if config_file.exists() {
            match fs::read_to_string(&config_file) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                    tracing::warn!("config file unreadable, using defaults: {}", err);
                    ConfigData::default()
                }),
                Err(err) => {
                    tracing::warn!("config file unreadable, using defaults: {}", err);
                    ConfigData::default()
                }
            }
        } else {
            ConfigData::default()
        };

        if data.snapshot_file.is_empty() {
            data.snapshot_file = config_dir.join("todos.txt").to_string_lossy().to_string();
        }

        let config = Self {
            config_dir,
            config_file,
            data,
        };

        // Save default config if it doesn't exist
        if !config.config_file.exists() {
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> TodoResult<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.config_file, content)?;
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the remote service base URL
    pub fn base_url(&self) -> &str {
        &self.data.base_url
    }

    /// Get the bearer credential
    pub fn token(&self) -> &str {
        &self.data.token
    }

    /// Set the bearer credential
    pub fn set_token(&mut self, token: &str) -> TodoResult<()> {
        self.data.token = token.to_string();
        self.save()
    }

    /// Get the client tag recorded in `last_updated_by`
    pub fn client_id(&self) -> &str {
        &self.data.client_id
    }

    /// Set the client tag
    pub fn set_client_id(&mut self, client_id: &str) -> TodoResult<()> {
        self.data.client_id = client_id.to_string();
        self.save()
    }

    /// Get the snapshot file path
    pub fn snapshot_file(&self) -> PathBuf {
        PathBuf::from(&self.data.snapshot_file)
    }

    /// Get the request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.data.request_timeout_secs)
    }

    /// Whether to accept self-signed server certificates
    pub fn accept_invalid_certs(&self) -> bool {
        self.data.accept_invalid_certs
    }

    /// Set the trust policy for self-signed certificates
    pub fn set_accept_invalid_certs(&mut self, accept: bool) -> TodoResult<()> {
        self.data.accept_invalid_certs = accept;
        self.save()
    }

    /// Get a configuration value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base_url" => Some(self.data.base_url.clone()),
            "token" => Some(self.data.token.clone()),
            "client_id" => Some(self.data.client_id.clone()),
            "snapshot_file" => Some(self.data.snapshot_file.clone()),
            _ => None,
        }
    }

    /// Set a configuration value
    pub fn set(&mut self, key: &str, value: &str) -> TodoResult<()> {
        match key {
            "base_url" => self.data.base_url = value.to_string(),
            "token" => self.data.token = value.to_string(),
            "client_id" => self.data.client_id = value.to_string(),
            "snapshot_file" => self.data.snapshot_file = value.to_string(),
            _ => return Err(TodoError::Config(format!("Unknown config key: {}", key))),
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::new(temp_dir.path()).unwrap();

        assert_eq!(config.base_url(), "https://hive.mrdekk.ru/todo");
        assert_eq!(config.client_id(), "1");
        assert!(config.token().is_empty());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.accept_invalid_certs());
        assert_eq!(
            config.snapshot_file(),
            temp_dir.path().join("todos.txt")
        );
    }

    #[test]
    fn test_config_file_written_on_first_run() {
        let temp_dir = TempDir::new().unwrap();
        let _config = Config::new(temp_dir.path()).unwrap();
        assert!(temp_dir.path().join("config.json").exists());
    }

    #[test]
    fn test_config_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut config = Config::new(temp_dir.path()).unwrap();
            config.set_token("Aegnor").unwrap();
            config.set_client_id("laptop").unwrap();
        }

        {
            let config = Config::new(temp_dir.path()).unwrap();
            assert_eq!(config.token(), "Aegnor");
            assert_eq!(config.client_id(), "laptop");
        }
    }

    #[test]
    fn test_corrupt_config_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("config.json"), "not json {{{").unwrap();

        let config = Config::new(temp_dir.path()).unwrap();
        assert_eq!(config.base_url(), "https://hive.mrdekk.ru/todo");
    }

    #[test]
    fn test_get_set_known_keys() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(temp_dir.path()).unwrap();

        config.set("base_url", "https://example.com/todo").unwrap();
        assert_eq!(
            config.get("base_url"),
            Some("https://example.com/todo".to_string())
        );
        assert!(config.get("no_such_key").is_none());
    }

    #[test]
    fn test_set_unknown_key_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::new(temp_dir.path()).unwrap();

        let result = config.set("window_geometry", "800x600");
        assert!(matches!(result, Err(TodoError::Config(_))));
    }

    #[test]
    fn test_trust_policy_persists() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut config = Config::new(temp_dir.path()).unwrap();
            config.set_accept_invalid_certs(true).unwrap();
        }

        {
            let config = Config::new(temp_dir.path()).unwrap();
            assert!(config.accept_invalid_certs());
        }
    }
}
