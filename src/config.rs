//! Application configuration.
//!
//! A small JSON file at `~/.config/xrptax/config.json` holding an optional
//! base-URL override and the last email used to log in. The backend
//! address resolves as: config override, then the `XRPTAX_API_URL`
//! environment variable (a `.env` file is honored), then the compiled
//! default.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data/cache directory paths
const APP_NAME: &str = "xrptax";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable selecting the backend base URL
pub const API_URL_ENV: &str = "XRPTAX_API_URL";

/// Local development backend
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolved backend base URL.
    pub fn api_url(&self) -> String {
        if let Some(ref url) = self.api_url {
            return url.clone();
        }
        std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Where the session record lives.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Where cached responses live.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_override_wins() {
        let config = Config {
            api_url: Some("https://api.example.com/v1".to_string()),
            last_email: None,
        };
        assert_eq!(config.api_url(), "https://api.example.com/v1");
    }
}
