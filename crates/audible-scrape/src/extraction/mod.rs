// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Field extraction from a ready page.
//!
//! Every field runs its own ordered strategy list through [`first_match`].
//! A field whose strategies all come up empty degrades to empty; extraction
//! as a whole never fails.

pub mod data_layer;
pub mod genres;
pub mod layout;
pub mod release_date;
pub mod strategy;

pub use data_layer::DataLayerProduct;
pub use layout::PageLayout;
pub use strategy::{first_match, Blank, ExtractionStrategy, Match};

use crate::renderer::RenderContext;
use data_layer::DataLayerGlobal;
use genres::{SubCategorySplit, SubtitleSlot, TopicChips};

/// Raw per-field results, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub product: DataLayerProduct,
    pub subtitle: Option<String>,
    pub genres: Vec<String>,
    pub release_date: Option<String>,
    /// Which strategy produced each non-empty field, for diagnostics.
    pub sources: Vec<(&'static str, &'static str)>,
}

/// Runs the per-field strategy lists against one page.
pub struct Extractor {
    layout: PageLayout,
}

impl Extractor {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    pub async fn extract(&self, page: &dyn RenderContext) -> RawFields {
        let mut raw = RawFields::default();

        let data_layer: Vec<Box<dyn ExtractionStrategy<DataLayerProduct>>> =
            vec![Box::new(DataLayerGlobal::new(&self.layout))];
        if let Some(m) = first_match("product", &data_layer, page).await {
            raw.sources.push(("product", m.strategy));
            raw.product = m.value;
        }

        let subtitle: Vec<Box<dyn ExtractionStrategy<String>>> =
            vec![Box::new(SubtitleSlot::new(&self.layout.subtitle_selector))];
        if let Some(m) = first_match("subtitle", &subtitle, page).await {
            raw.sources.push(("subtitle", m.strategy));
            raw.subtitle = Some(m.value);
        }

        let genres: Vec<Box<dyn ExtractionStrategy<Vec<String>>>> = vec![
            Box::new(TopicChips::new(&self.layout.genre_chip_selector)),
            Box::new(SubCategorySplit::new(raw.product.sub_category.clone())),
        ];
        if let Some(m) = first_match("genres", &genres, page).await {
            raw.sources.push(("genres", m.strategy));
            raw.genres = m.value;
        }

        let release_date = release_date::release_date_chain(&self.layout);
        if let Some(m) = first_match("releaseDate", &release_date, page).await {
            raw.sources.push(("releaseDate", m.strategy));
            raw.release_date = Some(m.value);
        }

        raw
    }
}
