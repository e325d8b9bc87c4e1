// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Scrape orchestration: acquire, extract, release the session, normalize.

use crate::acquisition::{AcquisitionAttempt, AcquisitionController, ReadyPage};
use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::extraction::Extractor;
use crate::normalize::{normalize_fields, strip_query};
use crate::progress::{ProgressReporter, ProgressSender, ScrapeEventKind};
use crate::record::ProductRecord;
use crate::renderer::Renderer;
use std::sync::Arc;
use tokio::time::Instant;

/// Everything one successful scrape produces.
#[derive(Debug, Clone)]
pub struct ScrapeOutput {
    pub record: ProductRecord,
    /// `record` flattened for paste-ready use.
    pub flattened: Vec<String>,
    pub attempts: Vec<AcquisitionAttempt>,
}

impl ScrapeOutput {
    /// The flattened values as a compact JSON array string.
    pub fn flattened_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.flattened)?)
    }
}

/// Scrapes one URL at a time through an injected session factory.
pub struct Scraper {
    renderer: Arc<dyn Renderer>,
    config: ScrapeConfig,
    extractor: Extractor,
    progress: Option<ProgressSender>,
}

impl Scraper {
    pub fn new(renderer: Arc<dyn Renderer>, config: ScrapeConfig) -> Self {
        let extractor = Extractor::new(config.layout.clone());
        Self {
            renderer,
            config,
            extractor,
            progress: None,
        }
    }

    /// Publish status events on `tx` for every scrape.
    pub fn with_progress(mut self, tx: ProgressSender) -> Self {
        self.progress = Some(tx);
        self
    }

    pub async fn scrape(&self, url: &str) -> Result<ScrapeOutput> {
        let url = validate_url(url)?;
        let start = Instant::now();
        let mut progress =
            ProgressReporter::new(self.progress.clone(), uuid::Uuid::new_v4().to_string());
        tracing::info!(scrape_id = progress.scrape_id(), url, "scrape started");

        let controller = AcquisitionController::new(
            self.renderer.as_ref(),
            &self.config.acquisition,
            self.config.layout.readiness_script(),
        );
        let ReadyPage {
            context,
            final_url,
            attempts,
        } = controller.acquire(url, &mut progress).await?;
        progress.emit(ScrapeEventKind::PageReady {
            attempt: attempts.len() as u32,
            elapsed_ms: start.elapsed().as_millis() as u64,
        });
        if final_url != url {
            tracing::debug!(final_url = %final_url, "page redirected");
        }

        let raw = self.extractor.extract(context.as_ref()).await;
        if let Err(e) = context.close().await {
            tracing::warn!("failed to close browser session: {e:#}");
            progress.emit(ScrapeEventKind::Warning {
                message: format!("failed to close browser session: {e:#}"),
            });
        }
        for (field, strategy) in &raw.sources {
            tracing::debug!(field, strategy, "field source");
        }
        if !raw.product.link.is_empty() && raw.product.link != strip_query(url) {
            tracing::debug!(page_link = %raw.product.link, "page reports a different canonical link");
        }

        let record = normalize_fields(url, raw);
        for field in record.empty_fields() {
            progress.emit(ScrapeEventKind::FieldDegraded {
                field: field.to_string(),
            });
        }
        progress.emit(ScrapeEventKind::ScrapeComplete {
            title: record.title.clone(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        });

        Ok(ScrapeOutput {
            flattened: record.flatten(),
            record,
            attempts,
        })
    }
}

/// Trim and check that `raw` is an absolute URL.
pub fn validate_url(raw: &str) -> Result<&str> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(ScrapeError::NoUrl);
    }
    url::Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_validation() {
        assert!(matches!(validate_url("   "), Err(ScrapeError::NoUrl)));
        assert!(matches!(
            validate_url("example.com/pd/1"),
            Err(ScrapeError::InvalidUrl { .. })
        ));
        assert_eq!(
            validate_url(" https://example.com/pd/1?x=1 ").unwrap(),
            "https://example.com/pd/1?x=1"
        );
    }
}
