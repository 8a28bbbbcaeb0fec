//! Configuration module for sosmed

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::paths;
use crate::theme::Theme;

/// Environment variable overriding [`Config::base_url`]
pub const BASE_URL_ENV: &str = "SOSMED_BASE_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// API root, e.g. `https://api.freeapi.app/api/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Selected theme
    #[serde(default)]
    pub theme: Theme,

    /// Enable vim-like keybindings
    #[serde(default = "default_vim_mode")]
    pub vim_mode: bool,

    /// Posts per feed page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Comments fetched per post
    #[serde(default = "default_comment_limit")]
    pub comment_limit: u32,

    /// Seconds before cached data is refetched on view (0 = always)
    #[serde(default = "default_stale_secs")]
    pub stale_secs: u64,

    /// File value of `base_url` while an environment override is active
    #[serde(skip)]
    saved_base_url: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_vim_mode() -> bool {
    true
}

fn default_page_size() -> u32 {
    10
}

fn default_comment_limit() -> u32 {
    50
}

fn default_stale_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            theme: Theme::default(),
            vim_mode: default_vim_mode(),
            page_size: default_page_size(),
            comment_limit: default_comment_limit(),
            stale_secs: default_stale_secs(),
            saved_base_url: None,
        }
    }
}

impl Config {
    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = paths::config_path()?;
        let mut config = Self::load_from(&path)?;
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.apply_base_url_override(&url);
        }
        Ok(config)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = paths::config_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        // Overrides are per run; keep the file's own API root
        let mut on_disk = self.clone();
        if let Some(url) = on_disk.saved_base_url.take() {
            on_disk.base_url = url;
        }

        let content = toml::to_string_pretty(&on_disk).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Use `url` as API root unless it is blank
    pub fn apply_base_url_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.saved_base_url
                .get_or_insert_with(|| self.base_url.clone());
            self.base_url = url.trim_end_matches('/').to_string();
        }
    }

    /// How long fetched data counts as fresh
    pub const fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.base_url, "https://api.freeapi.app/api/v1");
        assert_eq!(config.comment_limit, 50);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 25\nstale_secs = 0\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.stale_after(), Duration::ZERO);
        assert!(config.vim_mode);
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let config = Config {
            base_url: "http://localhost:8080/api/v1".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_base_url_override() {
        let mut config = Config::default();
        config.apply_base_url_override("   ");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        config.apply_base_url_override("http://127.0.0.1:9000/api/v1/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000/api/v1");
    }

    #[test]
    fn test_override_not_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.apply_base_url_override("http://127.0.0.1:9000/api/v1");
        config.page_size = 20;
        config.save_to(&path).unwrap();

        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.base_url, DEFAULT_BASE_URL);
        assert_eq!(saved.page_size, 20);
    }
}
