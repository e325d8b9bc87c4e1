// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for scraping operations.
//!
//! Only two kinds of failure ever reach the caller of a scrape: bad input and
//! acquisition exhaustion. Everything else (per-field extraction problems,
//! clipboard trouble) is recovered locally and degrades into the record.

use thiserror::Error;

/// All errors surfaced by the scraper.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// No URL was given on the command line or at the prompt.
    #[error("no URL provided")]
    NoUrl,

    /// The URL could not be parsed as an absolute URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Every acquisition attempt failed. Callers must not retry further.
    #[error("page acquisition exhausted after {attempts} attempts for '{url}': {last_error}")]
    AcquisitionExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    /// The session factory could not produce a browsing session.
    #[error("session error: {0}")]
    Session(String),

    /// The interactive prompt could not be read.
    #[error("input error: {0}")]
    Input(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    /// Whether this error should end the whole process rather than just the
    /// current URL.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScrapeError::NoUrl | ScrapeError::Input(_) | ScrapeError::Config(_)
        )
    }
}

/// A specialized Result type for scraping operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;
