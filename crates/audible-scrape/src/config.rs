// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration loading and resolution.

use crate::acquisition::AcquisitionPolicy;
use crate::error::{Result, ScrapeError};
use crate::extraction::PageLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "AUDIBLE_SCRAPE_CONFIG";
/// Env var overriding the acquisition attempt budget.
pub const MAX_ATTEMPTS_ENV: &str = "AUDIBLE_SCRAPE_MAX_ATTEMPTS";

/// Browser launch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub chromium_path: Option<PathBuf>,
    pub headless: bool,
    pub extra_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chromium_path: None,
            headless: true,
            extra_args: Vec::new(),
        }
    }
}

/// Full scraper configuration. Every field has a default, so a config file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub acquisition: AcquisitionPolicy,
    pub layout: PageLayout,
    pub browser: BrowserSettings,
    /// Copy the flattened values to the system clipboard after each scrape.
    pub clipboard: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            acquisition: AcquisitionPolicy::default(),
            layout: PageLayout::default(),
            browser: BrowserSettings::default(),
            clipboard: true,
        }
    }
}

impl ScrapeConfig {
    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ScrapeError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| ScrapeError::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// Resolve and load the effective configuration, then apply env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(raw) = std::env::var(MAX_ATTEMPTS_ENV) {
            self.acquisition.max_attempts = raw.trim().parse().map_err(|_| {
                ScrapeError::Config(format!("{MAX_ATTEMPTS_ENV} must be a number, got '{raw}'"))
            })?;
        }
        if let Ok(p) = std::env::var(crate::renderer::chromium::CHROMIUM_PATH_ENV) {
            self.browser.chromium_path = Some(PathBuf::from(p));
        }
        Ok(())
    }
}

/// Resolve the config file path.
///
/// Order: explicit flag, `AUDIBLE_SCRAPE_CONFIG`, `./.audible-scrape.json`,
/// `~/.audible-scrape/config.json`. An explicit path is returned even when it
/// does not exist so the read error surfaces.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(env_path));
    }

    let cwd_config = PathBuf::from(".audible-scrape.json");
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    let home_config = dirs::home_dir()?.join(".audible-scrape").join("config.json");
    home_config.exists().then_some(home_config)
}
