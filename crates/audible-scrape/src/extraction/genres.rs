// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Genre tags and the subtitle slot: plain DOM lookups.

use super::strategy::ExtractionStrategy;
use crate::normalize::{dedup_preserving_order, split_sub_category};
use crate::renderer::{Locator, RenderContext};
use async_trait::async_trait;

/// Text of every topic-tag chip, deduplicated by exact text.
pub struct TopicChips {
    locator: Locator,
}

impl TopicChips {
    pub fn new(selector: &str) -> Self {
        Self {
            locator: Locator::css(selector),
        }
    }
}

#[async_trait]
impl ExtractionStrategy<Vec<String>> for TopicChips {
    fn name(&self) -> &'static str {
        "topic-chips"
    }

    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<Vec<String>>> {
        let mut texts = Vec::new();
        for chip in page.find_elements(&self.locator).await? {
            match chip.text().await {
                Ok(text) => texts.push(text),
                Err(e) => tracing::trace!("genre chip skipped: {e:#}"),
            }
        }
        Ok(Some(dedup_preserving_order(texts)))
    }
}

/// Fallback: the data layer's comma-separated sub-category.
pub struct SubCategorySplit {
    sub_category: String,
}

impl SubCategorySplit {
    pub fn new(sub_category: impl Into<String>) -> Self {
        Self {
            sub_category: sub_category.into(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy<Vec<String>> for SubCategorySplit {
    fn name(&self) -> &'static str {
        "sub-category-split"
    }

    async fn extract(&self, _page: &dyn RenderContext) -> anyhow::Result<Option<Vec<String>>> {
        Ok(Some(split_sub_category(&self.sub_category)))
    }
}

/// The subtitle slot under the title lockup.
pub struct SubtitleSlot {
    locator: Locator,
}

impl SubtitleSlot {
    pub fn new(selector: &str) -> Self {
        Self {
            locator: Locator::css(selector),
        }
    }
}

#[async_trait]
impl ExtractionStrategy<String> for SubtitleSlot {
    fn name(&self) -> &'static str {
        "subtitle-slot"
    }

    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<String>> {
        match page.find_elements(&self.locator).await?.first() {
            Some(el) => Ok(Some(el.text().await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{NavigationResult, RenderElement};
    use serde_json::Value;

    struct Chip(Option<&'static str>);

    #[async_trait]
    impl RenderElement for Chip {
        async fn text(&self) -> anyhow::Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| anyhow::anyhow!("stale element reference"))
        }
    }

    struct ChipPage(Vec<Option<&'static str>>);

    #[async_trait]
    impl RenderContext for ChipPage {
        async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> anyhow::Result<NavigationResult> {
            Ok(NavigationResult {
                final_url: url.to_string(),
                load_time_ms: 0,
            })
        }
        async fn execute_js(&self, _script: &str) -> anyhow::Result<Value> {
            Ok(Value::Null)
        }
        async fn find_elements(
            &self,
            _locator: &Locator,
        ) -> anyhow::Result<Vec<Box<dyn RenderElement>>> {
            Ok(self
                .0
                .iter()
                .map(|t| Box::new(Chip(*t)) as Box<dyn RenderElement>)
                .collect())
        }
        async fn close(self: Box<Self>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn unreadable_chip_keeps_the_others() {
        let page = ChipPage(vec![Some("Fantasy"), None, Some("Horror"), Some("Fantasy")]);
        let genres = TopicChips::new("adbl-chip").extract(&page).await.unwrap();
        assert_eq!(genres, Some(vec!["Fantasy".to_string(), "Horror".to_string()]));
    }

    #[tokio::test]
    async fn sub_category_split_trims_and_dedups() {
        let page = ChipPage(Vec::new());
        let genres = SubCategorySplit::new(" Thriller , ,Mystery,Thriller")
            .extract(&page)
            .await
            .unwrap();
        assert_eq!(genres, Some(vec!["Thriller".to_string(), "Mystery".to_string()]));
    }
}
