// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Audible Scrape: resilient product-page scraping for JavaScript-rendered
//! audiobook listings.
//!
//! A scrape acquires the page through a headless browser session with
//! escalating timeouts, pulls each field through its own ordered list of
//! extraction strategies, and normalizes the result into a
//! [`record::ProductRecord`].

pub mod acquisition;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod extraction;
pub mod normalize;
pub mod progress;
pub mod record;
pub mod renderer;
pub mod scrape;

pub use error::{Result, ScrapeError};
pub use record::ProductRecord;
pub use scrape::{ScrapeOutput, Scraper};
