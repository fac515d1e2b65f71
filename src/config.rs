//! Where the backend lives.
//!
//! The base URL is resolved in this order:
//! 1. `--url` on the command line
//! 2. `FEEDBACK_WALL_URL` in the environment
//! 3. `api_url` in `<config dir>/feedback-wall/config.json`
//! 4. [`DEFAULT_API_URL`]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::client::FEEDBACK_PATH;

const CONFIG_DIR_NAME: &str = "feedback-wall";
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const API_URL_ENV: &str = "FEEDBACK_WALL_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallConfig {
    /// Scheme, host and port of the backend, without the `/api/feedback` path.
    pub api_url: String,
}

impl Default for WallConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl WallConfig {
    /// Full resolution: config file, then environment, then the command-line flag.
    pub fn resolve(flag: Option<String>) -> Self {
        Self::load().with_overrides(std::env::var(API_URL_ENV).ok(), flag)
    }

    /// Apply overrides in increasing priority. Empty values are ignored.
    pub fn with_overrides(mut self, env: Option<String>, flag: Option<String>) -> Self {
        for value in [env, flag].into_iter().flatten() {
            let value = value.trim();
            if !value.is_empty() {
                self.api_url = value.to_string();
            }
        }
        self
    }

    /// Load from the user's config directory.
    /// Returns the default config if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let loaded = config_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save to the user's config directory, returning the path written.
    pub fn save(&self) -> Result<PathBuf> {
        let path = config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// The feedback resource URL.
    pub fn feedback_url(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), FEEDBACK_PATH)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(CONFIG_DIR_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env_beats_file() {
        let file = WallConfig {
            api_url: "http://file".to_string(),
        };

        let config = file
            .clone()
            .with_overrides(Some("http://env".to_string()), None);
        assert_eq!(config.api_url, "http://env");

        let config = file
            .clone()
            .with_overrides(Some("http://env".to_string()), Some("http://flag".to_string()));
        assert_eq!(config.api_url, "http://flag");

        let config = file.with_overrides(Some("  ".to_string()), None);
        assert_eq!(config.api_url, "http://file");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WallConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, WallConfig::default());
    }

    #[test]
    fn saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = WallConfig {
            api_url: "https://feedback.example.org".to_string(),
        };

        config.save_to(&path).unwrap();
        assert_eq!(WallConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();
        assert!(WallConfig::load_from(&path).is_err());
    }

    #[test]
    fn feedback_url_tolerates_trailing_slash() {
        let config = WallConfig {
            api_url: "http://localhost:3001/".to_string(),
        };
        assert_eq!(config.feedback_url(), "http://localhost:3001/api/feedback");
    }
}
