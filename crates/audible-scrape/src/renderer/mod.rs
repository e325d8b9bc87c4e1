// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Browsing-session abstraction.
//!
//! Defines the `Renderer` (session factory) and `RenderContext` (one live
//! browsing session) traits. The scraper core depends only on this capability
//! set; the Chromium backend lives in [`chromium`], and tests drive the core
//! with scripted sessions.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// How to find elements in the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={s}"),
            Locator::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

/// Returned by [`RenderContext::navigate`] when the page did not finish
/// loading within the given budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("navigation timed out after {timeout_ms}ms")]
pub struct NavigationTimeout {
    pub timeout_ms: u64,
}

/// Factory for browsing sessions.
///
/// The acquisition controller asks for a fresh context whenever the previous
/// one failed, so implementations must not hand back shared state.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browsing session.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Number of currently open sessions.
    fn active_contexts(&self) -> usize;
}

/// A single browsing session.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout. Running out of time is reported as
    /// [`NavigationTimeout`].
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Find all elements matching a CSS selector or XPath expression.
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<Box<dyn RenderElement>>>;
    /// Terminate this session and release its resources.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// An element handle inside a live session.
#[async_trait]
pub trait RenderElement: Send + Sync {
    /// Rendered text of the element, trimmed.
    async fn text(&self) -> Result<String>;
}

/// A renderer used when Chromium is unavailable. Every session request fails.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Err(anyhow::anyhow!(
            "browser not available; install Chromium or set AUDIBLE_SCRAPE_CHROMIUM_PATH"
        ))
    }
    fn active_contexts(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_renderer_refuses_sessions() {
        let renderer = NoopRenderer;
        assert!(renderer.new_context().await.is_err());
        assert_eq!(renderer.active_contexts(), 0);
    }

    #[test]
    fn locator_display() {
        assert_eq!(Locator::css("a > b").to_string(), "css=a > b");
        assert_eq!(Locator::xpath("//div").to_string(), "xpath=//div");
    }
}
