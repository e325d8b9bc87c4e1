// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI command implementations for the `audible-scrape` binary.

pub mod doctor;
pub mod output;
pub mod progress_view;
pub mod prompt;
pub mod scrape_cmd;
