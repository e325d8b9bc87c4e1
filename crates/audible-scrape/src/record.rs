// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! The scraped product record and its flattened form.

use serde::{Deserialize, Serialize};

/// One product, as handed to the caller.
///
/// Every field is always present (possibly empty) except `subtitle`, which
/// is omitted from the JSON entirely when the page has none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub author: String,
    pub narrators: Vec<String>,
    pub link: String,
    pub category: String,
    pub publisher: String,
    /// `YYYY/MM/DD`, or empty when no strategy recovered a date.
    pub release_date: String,
    pub genres: Vec<String>,
}

impl ProductRecord {
    /// All values in field order, with list fields expanded in place.
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(8 + self.narrators.len() + self.genres.len());
        out.push(self.title.clone());
        if let Some(subtitle) = &self.subtitle {
            out.push(subtitle.clone());
        }
        out.push(self.author.clone());
        out.extend(self.narrators.iter().cloned());
        out.push(self.link.clone());
        out.push(self.category.clone());
        out.push(self.publisher.clone());
        out.push(self.release_date.clone());
        out.extend(self.genres.iter().cloned());
        out
    }

    /// Names of the fields that ended up empty.
    pub fn empty_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("title", self.title.is_empty()),
            ("author", self.author.is_empty()),
            ("narrators", self.narrators.is_empty()),
            ("category", self.category.is_empty()),
            ("publisher", self.publisher.is_empty()),
            ("releaseDate", self.release_date.is_empty()),
            ("genres", self.genres.is_empty()),
        ];
        checks
            .into_iter()
            .filter_map(|(name, empty)| empty.then_some(name))
            .collect()
    }
}
