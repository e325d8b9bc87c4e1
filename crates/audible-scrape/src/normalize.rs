// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pure field normalization: URL cleanup, list coercion, genre dedup, and
//! date parsing into `YYYY/MM/DD`.
//!
//! No I/O happens here. Every function takes raw page values and returns the
//! canonical shape, or `None` when a date cannot be recovered.

use crate::extraction::RawFields;
use crate::record::ProductRecord;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// How a two-digit year is widened to four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearRule {
    /// `< 50` is 20xx, otherwise 19xx.
    CenturyCutoff,
    /// Always 20xx.
    Always2000s,
}

impl YearRule {
    /// Widen a year string. Four-digit years pass through unchanged.
    pub fn expand(self, year: &str) -> String {
        if year.len() != 2 {
            return year.to_string();
        }
        match self {
            YearRule::Always2000s => format!("20{year}"),
            YearRule::CenturyCutoff => match year.parse::<u32>() {
                Ok(y) if y < 50 => format!("20{year}"),
                _ => format!("19{year}"),
            },
        }
    }
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

fn month_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{2})[/-](\d{2})[/-](\d{4}|\d{2})\b").expect("month-first regex is valid")
    })
}

fn dashed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{2})-(\d{2})-(\d{4}|\d{2})\b").expect("dashed regex is valid")
    })
}

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").expect("iso regex is valid"))
}

fn either_order_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{2,4})[/-](\d{2})[/-](\d{2,4})").expect("either-order regex is valid")
    })
}

fn written_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z]+) (\d{1,2}), (\d{4})").expect("written date regex is valid")
    })
}

fn short_dashed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{2})-(\d{2})-(\d{2})\b").expect("short dashed regex is valid")
    })
}

/// Drop everything from the first `?` on.
pub fn strip_query(url: &str) -> String {
    url.split('?').next().unwrap_or_default().to_string()
}

/// `MM/DD/YY[YY]` or `MM-DD-YY[YY]` anywhere in `text`.
pub fn parse_month_first(text: &str, rule: YearRule) -> Option<String> {
    let caps = month_first_re().captures(text)?;
    Some(format!("{}/{}/{}", rule.expand(&caps[3]), &caps[1], &caps[2]))
}

/// A `releaseDate` value from embedded JSON. Accepts `MM-DD-YY[YY]` and,
/// for payloads that already carry ISO dates, `YYYY-MM-DD`.
pub fn parse_embedded_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(caps) = iso_re().captures(raw) {
        return Some(format!("{}/{}/{}", &caps[1], &caps[2], &caps[3]));
    }
    let caps = dashed_re().captures(raw)?;
    Some(format!(
        "{}/{}/{}",
        YearRule::Always2000s.expand(&caps[3]),
        &caps[1],
        &caps[2]
    ))
}

/// Text found next to a release-date label: a numeric date in either
/// year-first or month-first order, or a written `Month D, YYYY` date.
pub fn parse_label_date(text: &str) -> Option<String> {
    if let Some(caps) = either_order_re().captures(text) {
        let (first, second, third) = (&caps[1], &caps[2], &caps[3]);
        let (year, month, day) = if first.len() == 4 {
            (first, second, third)
        } else {
            (third, first, second)
        };
        return Some(format!(
            "{}/{month}/{day}",
            YearRule::CenturyCutoff.expand(year)
        ));
    }

    for caps in written_re().captures_iter(text) {
        let Some(month) = month_number(&caps[1]) else {
            continue;
        };
        let (Ok(day), Ok(year)) = (caps[2].parse::<u32>(), caps[3].parse::<i32>()) else {
            continue;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date.format("%Y/%m/%d").to_string());
        }
    }
    None
}

/// First `MM-DD-YY` in free page text, read as 20YY.
pub fn parse_short_dashed(text: &str) -> Option<String> {
    let caps = short_dashed_re().captures(text)?;
    Some(format!(
        "{}/{}/{}",
        YearRule::Always2000s.expand(&caps[3]),
        &caps[1],
        &caps[2]
    ))
}

/// `datePublished` meta content with dashes turned into slashes.
pub fn normalize_meta_date(content: &str) -> Option<String> {
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.replace('-', "/"))
}

/// Coerce a raw narrators value to a list: arrays keep their non-empty
/// entries, a lone string becomes a one-element list, anything else is empty.
pub fn normalize_narrators(raw: &Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items.iter().filter_map(person_name).collect(),
        other => person_name(other).into_iter().collect(),
    }
}

fn person_name(value: &Value) -> Option<String> {
    let name = match value {
        Value::String(s) => s.trim(),
        Value::Object(map) => map
            .get("fullName")
            .or_else(|| map.get("name"))
            .and_then(Value::as_str)?
            .trim(),
        _ => return None,
    };
    (!name.is_empty()).then(|| name.to_string())
}

/// Order-preserving dedup by exact text, dropping empty entries.
pub fn dedup_preserving_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.into();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Genre fallback: a comma-separated sub-category string.
pub fn split_sub_category(raw: &str) -> Vec<String> {
    dedup_preserving_order(raw.split(',').map(str::trim))
}

/// Assemble the canonical record from raw extractor output. The link comes
/// from the URL the caller asked for, not from wherever the page redirected.
pub fn normalize_fields(source_url: &str, raw: RawFields) -> ProductRecord {
    let product = raw.product;
    ProductRecord {
        title: product.title.trim().to_string(),
        subtitle: raw
            .subtitle
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        author: product.author.trim().to_string(),
        narrators: normalize_narrators(&product.narrators),
        link: strip_query(source_url.trim()),
        category: product.category.trim().to_string(),
        publisher: product.publisher.trim().to_string(),
        release_date: raw.release_date.unwrap_or_default(),
        genres: dedup_preserving_order(raw.genres.iter().map(|g| g.trim())),
    }
}
