//! Configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Console configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Base URL of the serving API, without a trailing slash
    pub server_url: String,

    /// Request timeout for API calls; unset means no client-side timeout
    pub request_timeout_secs: Option<u64>,

    /// Rendered card height in pixels
    pub card_height: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: None,
            card_height: default_card_height(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration with environment variable overrides
    ///
    /// With no explicit path, the default config file is used when present,
    /// else built-in defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.or_else(|| default_config_path().filter(|p| p.exists()));

        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(url) = std::env::var("LAUNCH_CONSOLE_SERVER_URL") {
            config.server_url = url;
        }
        if let Ok(timeout) = std::env::var("LAUNCH_CONSOLE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = Some(
                timeout
                    .parse()
                    .context("Invalid LAUNCH_CONSOLE_REQUEST_TIMEOUT_SECS value")?,
            );
        }
        if let Ok(height) = std::env::var("LAUNCH_CONSOLE_CARD_HEIGHT") {
            config.card_height = height
                .parse()
                .context("Invalid LAUNCH_CONSOLE_CARD_HEIGHT value")?;
        }

        // Endpoint paths are joined onto the base URL verbatim
        while config.server_url.ends_with('/') {
            config.server_url.pop();
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            anyhow::bail!(
                "Server URL must start with http:// or https:// (got '{}')",
                self.server_url
            );
        }

        if self.card_height == 0 {
            anyhow::bail!("Card height must be positive");
        }

        Ok(())
    }

    /// Request timeout as a duration, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Default config file location, `~/.config/launch-console/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("launch-console/config.toml"))
}

// Default functions
fn default_server_url() -> String {
    "http://127.0.0.1:9997".to_string()
}
fn default_card_height() -> u32 {
    270
}
