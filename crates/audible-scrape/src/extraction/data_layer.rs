// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Reads canonical product metadata from the page's analytics data layer.

use super::layout::PageLayout;
use super::strategy::{Blank, ExtractionStrategy};
use crate::renderer::RenderContext;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Raw data-layer fields, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataLayerProduct {
    pub title: String,
    pub author: String,
    /// A list, a single string, or null, depending on the product.
    pub narrators: Value,
    pub publisher: String,
    pub category: String,
    pub sub_category: String,
    /// `location.origin + location.pathname` as the page reports it.
    pub link: String,
}

impl Blank for DataLayerProduct {
    fn is_blank(&self) -> bool {
        self.title.is_empty()
            && self.author.is_empty()
            && self.publisher.is_empty()
            && self.category.is_empty()
            && self.sub_category.is_empty()
            && matches!(self.narrators, Value::Null)
    }
}

/// The only strategy for data-layer fields; there is no fallback.
pub struct DataLayerGlobal {
    script: String,
}

impl DataLayerGlobal {
    pub fn new(layout: &PageLayout) -> Self {
        Self {
            script: layout.data_layer_script(),
        }
    }
}

#[async_trait]
impl ExtractionStrategy<DataLayerProduct> for DataLayerGlobal {
    fn name(&self) -> &'static str {
        "data-layer-global"
    }

    async fn extract(&self, page: &dyn RenderContext) -> anyhow::Result<Option<DataLayerProduct>> {
        let value = page.execute_js(&self.script).await?;
        if !value.is_object() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_default_to_empty() {
        let p: DataLayerProduct = serde_json::from_value(json!({"title": "Dune"})).unwrap();
        assert_eq!(p.title, "Dune");
        assert_eq!(p.author, "");
        assert_eq!(p.narrators, Value::Null);
        assert!(!p.is_blank());
        assert!(DataLayerProduct::default().is_blank());
    }

    #[test]
    fn reads_camel_case_sub_category() {
        let p: DataLayerProduct =
            serde_json::from_value(json!({"subCategory": "Fantasy, Epic", "narrators": ["A"]}))
                .unwrap();
        assert_eq!(p.sub_category, "Fantasy, Epic");
        assert_eq!(p.narrators, json!(["A"]));
    }
}
