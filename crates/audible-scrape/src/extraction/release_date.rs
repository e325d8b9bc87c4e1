// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Release-date recovery.
//!
//! The product page has carried its release date in at least four different
//! layouts over time. Each layout gets its own strategy; they run in a fixed
//! order and the first date found wins:
//!
//! 1. shadow-scoped metadata block (`MM/DD/YY[YY]`, century cutoff)
//! 2. embedded JSON `releaseDate`, polled while the script attaches (20YY)
//! 3. text following a release-date label (numeric or `Month D, YYYY`,
//!    century cutoff)
//! 4. `MM-DD-YY` in label-sibling text, then in the whole page text (20YY)
//! 5. `meta[itemprop=datePublished]`
//!
//! The two-digit-year rules differ between strategies on purpose; see
//! [`YearRule`].

use super::layout::PageLayout;
use super::strategy::{value_text, ExtractionStrategy};
use crate::normalize::{
    normalize_meta_date, parse_embedded_date, parse_label_date, parse_month_first,
    parse_short_dashed, YearRule,
};
use crate::renderer::{Locator, RenderContext};
use async_trait::async_trait;
use std::time::Duration;

/// Build the release-date chain in its fixed order.
pub fn release_date_chain(layout: &PageLayout) -> Vec<Box<dyn ExtractionStrategy<String>>> {
    vec![
        Box::new(ShadowMetadata {
            script: layout.shadow_date_script(),
        }),
        Box::new(EmbeddedJson {
            script: layout.embedded_json_script(),
            attempts: layout.json_poll_attempts.max(1),
            interval: layout.json_poll_interval(),
        }),
        Box::new(LabelProximity {
            locator: Locator::xpath(layout.label_sibling_xpath()),
        }),
        Box::new(PageTextScan {
            label_locator: Locator::xpath(layout.label_sibling_xpath()),
            text_script: layout.page_text_script(),
        }),
        Box::new(MetaDatePublished {
            script: layout.date_published_script(),
        }),
    ]
}

pub struct ShadowMetadata {
    script: String,
}

#[async_trait]
impl ExtractionStrategy<String> for ShadowMetadata {
    fn name(&self) -> &'static str {
        "shadow-metadata"
    }

    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<String>> {
        let text = value_text(page.execute_js(&self.script).await?);
        Ok(parse_month_first(&text, YearRule::CenturyCutoff))
    }
}

/// The metadata component may attach its JSON script after the data layer is
/// populated, so the lookup is polled a bounded number of times.
pub struct EmbeddedJson {
    script: String,
    attempts: u32,
    interval: Duration,
}

#[async_trait]
impl ExtractionStrategy<String> for EmbeddedJson {
    fn name(&self) -> &'static str {
        "embedded-json"
    }

    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<String>> {
        for poll in 1..=self.attempts {
            let raw = value_text(page.execute_js(&self.script).await?);
            if !raw.is_empty() {
                tracing::trace!(poll, "embedded releaseDate found");
                return Ok(parse_embedded_date(&raw));
            }
            if poll < self.attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        Ok(None)
    }
}

pub struct LabelProximity {
    locator: Locator,
}

#[async_trait]
impl ExtractionStrategy<String> for LabelProximity {
    fn name(&self) -> &'static str {
        "label-proximity"
    }

    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<String>> {
        let siblings = page.find_elements(&self.locator).await?;
        let Some(first) = siblings.first() else {
            return Ok(None);
        };
        Ok(parse_label_date(&first.text().await?))
    }
}

/// Last-resort regex scan. Label-sibling text is tried before the whole page
/// so an unrelated date earlier in the page does not win.
pub struct PageTextScan {
    label_locator: Locator,
    text_script: String,
}

#[async_trait]
impl ExtractionStrategy<String> for PageTextScan {
    fn name(&self) -> &'static str {
        "page-text-scan"
    }

    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<String>> {
        match page.find_elements(&self.label_locator).await {
            Ok(siblings) => {
                for sibling in siblings {
                    if let Ok(text) = sibling.text().await {
                        if let Some(date) = parse_short_dashed(&text) {
                            return Ok(Some(date));
                        }
                    }
                }
            }
            Err(e) => tracing::trace!("label refinement skipped: {e:#}"),
        }

        let text = value_text(page.execute_js(&self.text_script).await?);
        Ok(parse_short_dashed(&text))
    }
}

pub struct MetaDatePublished {
    script: String,
}

#[async_trait]
impl ExtractionStrategy<String> for MetaDatePublished {
    fn name(&self) -> &'static str {
        "meta-date-published"
    }

    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<String>> {
        let content = value_text(page.execute_js(&self.script).await?);
        Ok(normalize_meta_date(&content))
    }
}
