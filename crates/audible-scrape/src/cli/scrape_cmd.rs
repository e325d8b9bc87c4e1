// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! The default command: scrape product links and print their records.

use crate::cli::output;
use crate::cli::progress_view::ProgressView;
use crate::cli::prompt::UrlSource;
use crate::clipboard::ClipboardSink;
use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::progress;
use crate::renderer::Renderer;
use crate::scrape::{ScrapeOutput, Scraper};
use std::sync::Arc;

/// Options for [`run`].
pub struct ScrapeOptions {
    /// A link given on the command line; it stands in for the first answer.
    pub url: Option<String>,
    /// Where further links come from.
    pub urls: Box<dyn UrlSource>,
    pub clipboard: Box<dyn ClipboardSink>,
}

/// Scrape links until an empty answer.
///
/// An empty first link is an input error. Later empty answers end the loop
/// cleanly. A failed scrape is reported and the loop continues.
pub async fn run(
    renderer: Arc<dyn Renderer>,
    config: ScrapeConfig,
    opts: ScrapeOptions,
) -> Result<()> {
    let show_progress = !output::is_quiet() && !output::is_json();
    let clipboard = config.clipboard.then_some(opts.clipboard);
    let mut urls = opts.urls;
    let mut pending = opts.url;
    let mut first = true;

    loop {
        let url = match pending.take() {
            Some(url) => url.trim().to_string(),
            None => urls
                .next_url()
                .map_err(|e| ScrapeError::Input(format!("{e:#}")))?,
        };
        if url.is_empty() {
            if first {
                return Err(ScrapeError::NoUrl);
            }
            return Ok(());
        }
        first = false;

        match scrape_one(renderer.clone(), config.clone(), &url, show_progress).await {
            Ok(out) => report(&out, clipboard.as_deref()).await?,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => output::error(&e.to_string()),
        }
    }
}

async fn scrape_one(
    renderer: Arc<dyn Renderer>,
    config: ScrapeConfig,
    url: &str,
    show_progress: bool,
) -> Result<ScrapeOutput> {
    if !show_progress {
        return Scraper::new(renderer, config).scrape(url).await;
    }

    let (tx, rx) = progress::channel();
    let view = ProgressView::spawn(rx);
    let result = Scraper::new(renderer, config).with_progress(tx).scrape(url).await;
    // The scraper owned the only sender; the view ends once it is dropped.
    view.finish().await;
    result
}

async fn report(out: &ScrapeOutput, clipboard: Option<&dyn ClipboardSink>) -> Result<()> {
    let values = out.flattened_json()?;

    if output::is_json() {
        let doc = serde_json::json!({
            "record": out.record,
            "values": out.flattened,
            "attempts": out.attempts.len(),
        });
        println!("{}", serde_json::to_string(&doc)?);
    } else {
        println!("{}", output::pretty_json(&out.record)?);
        println!("Values array: {values}");
    }

    if let Some(sink) = clipboard {
        match sink.copy(&values).await {
            Ok(()) => output::status("Values copied to clipboard."),
            Err(e) => output::warn(&e.to_string()),
        }
    }
    Ok(())
}
