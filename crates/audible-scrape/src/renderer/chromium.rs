// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.
//!
//! Each context is its own headless browser process with a throwaway profile
//! directory, so discarding a context discards all navigation state with it.

use super::{
    Locator, NavigationResult, NavigationTimeout, RenderContext, RenderElement, Renderer,
};
use crate::config::BrowserSettings;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Environment variable that points at a Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "AUDIBLE_SCRAPE_CHROMIUM_PATH";

/// Find the Chromium binary path.
///
/// Lookup order: explicit setting, `AUDIBLE_SCRAPE_CHROMIUM_PATH`, then the
/// usual binary names on `PATH`, then the stock macOS install location.
pub fn find_chromium(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.clone());
        }
    }

    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
        "chrome",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Chromium-based session factory.
pub struct ChromiumRenderer {
    chrome_path: PathBuf,
    settings: BrowserSettings,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a renderer after locating the Chromium binary. No browser is
    /// launched until the first context is requested.
    pub fn new(settings: BrowserSettings) -> Result<Self> {
        let chrome_path = find_chromium(settings.chromium_path.as_ref()).with_context(|| {
            format!("Chromium not found. Install Chrome/Chromium or set {CHROMIUM_PATH_ENV}.")
        })?;

        Ok(Self {
            chrome_path,
            settings,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Path of the browser binary this renderer launches.
    pub fn chrome_path(&self) -> &PathBuf {
        &self.chrome_path
    }

    fn browser_config(&self, profile_dir: &PathBuf) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().chrome_executable(self.chrome_path.clone());

        if self.settings.headless {
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking")
            .arg(format!("--user-data-dir={}", profile_dir.display()));

        for arg in &self.settings.extra_args {
            builder = builder.arg(arg.clone());
        }

        builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let profile_dir =
            std::env::temp_dir().join(format!("audible-scrape-{}", uuid::Uuid::new_v4()));
        let config = self.browser_config(&profile_dir)?;

        let (mut browser, mut handler) = match Browser::launch(config).await {
            Ok(launched) => launched,
            Err(e) => {
                remove_profile(&profile_dir).await;
                bail!("failed to launch Chromium: {e}");
            }
        };

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("browser handler error: {e}");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.kill().await;
                handler_task.abort();
                remove_profile(&profile_dir).await;
                bail!("failed to create new page: {e}");
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(profile = %profile_dir.display(), "browser session started");

        Ok(Box::new(ChromiumContext {
            browser,
            page,
            handler_task,
            profile_dir,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// One Chromium process plus its single page.
pub struct ChromiumContext {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    profile_dir: PathBuf,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            self.page.goto(url),
        )
        .await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => Err(NavigationTimeout { timeout_ms }.into()),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;

        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<Box<dyn RenderElement>>> {
        let elements = match locator {
            Locator::Css(selector) => self.page.find_elements(selector.as_str()).await,
            Locator::XPath(expr) => self.page.find_xpaths(expr.as_str()).await,
        }
        .with_context(|| format!("element lookup failed for {locator}"))?;

        Ok(elements
            .into_iter()
            .map(|el| Box::new(ChromiumElement(el)) as Box<dyn RenderElement>)
            .collect())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = *self;
        this.active_count.fetch_sub(1, Ordering::Relaxed);

        if let Err(e) = this.browser.close().await {
            tracing::debug!("browser close failed, killing process: {e}");
            let _ = this.browser.kill().await;
        }
        let _ = this.browser.wait().await;
        this.handler_task.abort();

        remove_profile(&this.profile_dir).await;
        Ok(())
    }
}

/// Best-effort removal of a session's profile directory.
async fn remove_profile(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        tracing::trace!(profile = %dir.display(), "profile cleanup skipped: {e}");
    }
}

struct ChromiumElement(Element);

#[async_trait]
impl RenderElement for ChromiumElement {
    async fn text(&self) -> Result<String> {
        let text = self
            .0
            .inner_text()
            .await
            .context("failed to read element text")?;
        Ok(text.unwrap_or_default().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_must_exist() {
        let missing = PathBuf::from("/definitely/not/a/chrome/binary");
        let found = find_chromium(Some(&missing));
        assert_ne!(found.as_ref(), Some(&missing));
    }

    #[tokio::test]
    async fn profile_removal_is_best_effort() {
        let root = tempfile::tempdir().expect("tempdir");
        let profile = root.path().join("audible-scrape-profile");
        std::fs::create_dir_all(profile.join("Default")).expect("profile dir");
        std::fs::write(profile.join("Default").join("Preferences"), "{}").expect("prefs");

        remove_profile(&profile).await;
        assert!(!profile.exists());

        // Already gone: must not panic or error.
        remove_profile(&profile).await;
    }

    #[tokio::test]
    #[ignore] // Requires Chromium to be installed
    async fn test_chromium_navigate_and_query() {
        let renderer = ChromiumRenderer::new(BrowserSettings::default())
            .expect("failed to create renderer");
        let mut ctx = renderer
            .new_context()
            .await
            .expect("failed to create context");

        ctx.navigate(
            "data:text/html,<h1>Hello</h1><ul><li>a</li><li>b</li></ul>",
            10_000,
        )
        .await
        .expect("navigation failed");

        let heading = ctx
            .execute_js("document.querySelector('h1').textContent")
            .await
            .expect("JS execution failed");
        assert_eq!(heading.as_str(), Some("Hello"));

        let items = ctx
            .find_elements(&Locator::css("li"))
            .await
            .expect("css lookup failed");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].text().await.expect("text"), "b");

        let by_xpath = ctx
            .find_elements(&Locator::xpath("//li[1]"))
            .await
            .expect("xpath lookup failed");
        assert_eq!(by_xpath.len(), 1);

        assert_eq!(renderer.active_contexts(), 1);
        ctx.close().await.expect("close failed");
        assert_eq!(renderer.active_contexts(), 0);
    }
}
