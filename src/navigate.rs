//! Post-launch navigation seam

use anyhow::{Context, Result};

/// Destination shown after a successful launch
pub fn running_models_page(base_url: &str) -> String {
    format!("{}/ui/#/running_models", base_url)
}

/// Where launched-model navigation lands
pub trait Navigator: Send + Sync {
    /// Open the given URL for the user
    fn open(&self, url: &str) -> Result<()>;
}

/// Hands the URL to the operating system's opener
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url).with_context(|| format!("Failed to open {}", url))
    }
}

/// Swallows navigation; used by `--no-open` runs
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn open(&self, url: &str) -> Result<()> {
        tracing::debug!(url = %url, "Navigation suppressed");
        Ok(())
    }
}
