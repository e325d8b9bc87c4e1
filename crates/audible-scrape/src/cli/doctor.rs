// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Environment readiness check.

use crate::cli::output;
use crate::clipboard::SystemClipboard;
use crate::config::{resolve_config_path, ScrapeConfig};
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;

/// Report Chromium, clipboard tool, and the effective configuration.
pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = ScrapeConfig::load(config_path);
    let config_file = resolve_config_path(config_path);
    let chromium_path = find_chromium(
        config
            .as_ref()
            .ok()
            .and_then(|c| c.browser.chromium_path.as_ref()),
    );
    let clipboard = SystemClipboard::detect();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
            "chromium": chromium_path.as_ref().map(|p| p.display().to_string()),
            "clipboard": clipboard.as_ref().map(|c| c.program().display().to_string()),
            "config_file": config_file.as_ref().map(|p| p.display().to_string()),
            "config": config.as_ref().ok(),
            "config_error": config.as_ref().err().map(|e| e.to_string()),
            "ready": chromium_path.is_some() && config.is_ok(),
        }));
        return Ok(());
    }

    println!("Audible Scrape Doctor");
    println!("=====================");
    println!();
    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome or Chromium, or set AUDIBLE_SCRAPE_CHROMIUM_PATH."
        ),
    }
    match &clipboard {
        Some(c) => println!("[OK] Clipboard tool: {}", c.program().display()),
        None => println!("[??] No clipboard tool found; values will only be printed"),
    }
    match &config_file {
        Some(path) => println!("[OK] Config file: {}", path.display()),
        None => println!("[OK] No config file; using defaults"),
    }

    match &config {
        Ok(c) => {
            let policy = &c.acquisition;
            println!(
                "     Attempts: {} (timeouts {}ms / {}ms / {}ms), poll every {}ms",
                policy.effective_max_attempts(),
                policy.initial_timeout_ms,
                policy.first_retry_timeout_ms,
                policy.later_retry_timeout_ms,
                policy.poll_interval_ms,
            );
            println!(
                "     Headless: {}, clipboard: {}",
                c.browser.headless,
                if c.clipboard { "on" } else { "off" }
            );
        }
        Err(e) => println!("[!!] Config could not be loaded: {e}"),
    }

    println!();
    if chromium_path.is_some() && config.is_ok() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }
    Ok(())
}
