// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Page layout knowledge: selectors, traversal paths, and the scripts built
//! from them.
//!
//! The site has changed its markup several times. Keeping every path here as
//! data means a layout change is a config edit, not a code change.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    /// Name of the client-side data-layer global.
    pub data_layer_global: String,
    pub subtitle_selector: String,
    pub genre_chip_selector: String,
    /// Host element whose shadow root holds the metadata table.
    pub metadata_shadow_host: String,
    /// Selector evaluated inside that shadow root for the release date text.
    pub metadata_shadow_text: String,
    /// Host element carrying embedded JSON script tags.
    pub metadata_json_host: String,
    pub metadata_json_scripts: String,
    pub json_poll_attempts: u32,
    pub json_poll_interval_ms: u64,
    /// Label synonyms that precede a release date in rendered text.
    pub release_labels: Vec<String>,
    pub date_published_meta: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            data_layer_global: "digitalData".to_string(),
            subtitle_selector: "adbl-title-lockup [slot=\"subtitle\"]".to_string(),
            genre_chip_selector: "adbl-chip-group.product-topictag-impression adbl-chip"
                .to_string(),
            metadata_shadow_host:
                "#center-1-2 > adbl-style-scope > adbl-product-details > adbl-product-metadata"
                    .to_string(),
            metadata_shadow_text: "#container > div:nth-child(1) > div.values > div > div.text"
                .to_string(),
            metadata_json_host: "adbl-product-metadata".to_string(),
            metadata_json_scripts: ":scope > script[type=\"application/json\"]".to_string(),
            json_poll_attempts: 10,
            json_poll_interval_ms: 500,
            release_labels: vec![
                "Release date".to_string(),
                "Published".to_string(),
                "Publication date".to_string(),
            ],
            date_published_meta: "meta[itemprop=\"datePublished\"]".to_string(),
        }
    }
}

/// Quote a string as a JavaScript string literal.
fn js_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Quote a string as an XPath 1.0 literal. XPath has no escapes, so a value
/// containing both quote kinds is spliced with `concat()`.
fn xpath_str(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

impl PageLayout {
    pub fn json_poll_interval(&self) -> Duration {
        Duration::from_millis(self.json_poll_interval_ms)
    }

    /// Readiness predicate: true once the data layer lists a product.
    pub fn readiness_script(&self) -> String {
        let g = js_str(&self.data_layer_global);
        format!(
            "(() => {{ const d = window[{g}]; \
             return !!(d && Array.isArray(d.product) && d.product.length > 0 && d.product[0]); }})()"
        )
    }

    /// Reads the raw product fields out of the data layer as one object.
    pub fn data_layer_script(&self) -> String {
        let g = js_str(&self.data_layer_global);
        format!(
            r#"(() => {{
  try {{
    const d = window[{g}] || {{}};
    const p = (d.product && d.product[0] && d.product[0].productInfo) || {{}};
    const c = (d.page && d.page.category) || {{}};
    return {{
      title: p.productName || '',
      author: (p.authors && p.authors[0] && p.authors[0].fullName) || '',
      narrators: p.narrators === undefined ? null : p.narrators,
      publisher: p.publisherName || '',
      category: c.primaryCategory || '',
      subCategory: c.subCategory1 || '',
      link: window.location.origin + window.location.pathname
    }};
  }} catch (e) {{ return {{}}; }}
}})()"#
        )
    }

    /// Descends into the metadata component's shadow root for the date text.
    pub fn shadow_date_script(&self) -> String {
        let host = js_str(&self.metadata_shadow_host);
        let inner = js_str(&self.metadata_shadow_text);
        format!(
            "(() => {{ try {{ const m = document.querySelector({host}); \
             if (!m || !m.shadowRoot) return ''; \
             const el = m.shadowRoot.querySelector({inner}); \
             return el ? el.textContent.trim() : ''; }} catch (e) {{ return ''; }} }})()"
        )
    }

    /// Returns the first `releaseDate` found in the metadata JSON scripts.
    pub fn embedded_json_script(&self) -> String {
        let host = js_str(&self.metadata_json_host);
        let scripts = js_str(&self.metadata_json_scripts);
        format!(
            "(() => {{ const m = document.querySelector({host}); if (!m) return ''; \
             for (const s of Array.from(m.querySelectorAll({scripts}))) {{ \
               try {{ const data = JSON.parse(s.textContent); \
                 if (data && data.releaseDate) return String(data.releaseDate); }} catch (e) {{}} \
             }} return ''; }})()"
        )
    }

    pub fn page_text_script(&self) -> String {
        "(() => document.body ? document.body.innerText : '')()".to_string()
    }

    pub fn date_published_script(&self) -> String {
        let sel = js_str(&self.date_published_meta);
        format!(
            "(() => {{ const m = document.querySelector({sel}); \
             return m ? (m.getAttribute('content') || '') : ''; }})()"
        )
    }

    /// XPath selecting the element right after any release-date label.
    pub fn label_sibling_xpath(&self) -> String {
        let preds: Vec<String> = self
            .release_labels
            .iter()
            .map(|l| format!("contains(text(), {})", xpath_str(l)))
            .collect();
        format!("//*[{}]/following-sibling::*[1]", preds.join(" or "))
    }
}
