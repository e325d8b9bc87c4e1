// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use audible_scrape::cli;
use audible_scrape::cli::output;
use audible_scrape::cli::prompt::{LineSource, UrlPrompt, UrlSource};
use audible_scrape::cli::scrape_cmd::ScrapeOptions;
use audible_scrape::clipboard;
use audible_scrape::config::ScrapeConfig;
use audible_scrape::renderer::chromium::ChromiumRenderer;
use audible_scrape::renderer::{NoopRenderer, Renderer};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "audible-scrape",
    about = "Scrape an audiobook product page into a structured record",
    version,
    after_help = "Run 'audible-scrape' with no link to be prompted for one."
)]
struct Cli {
    /// Product page link
    #[arg(conflicts_with = "url_flag")]
    url: Option<String>,

    /// Product page link (same as the positional argument)
    #[arg(long = "url")]
    url_flag: Option<String>,

    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Do not copy the values array to the clipboard
    #[arg(long)]
    no_clipboard: bool,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit diagnostic logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var(output::JSON_ENV, "1");
    }
    if cli.quiet {
        std::env::set_var(output::QUIET_ENV, "1");
    }
    if cli.no_color {
        std::env::set_var(output::NO_COLOR_ENV, "1");
    }

    let default_level = match (&cli.log_level, cli.verbose) {
        (Some(level), _) => level.clone(),
        (None, true) => "debug".to_string(),
        (None, false) => "warn".to_string(),
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&default_level));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        None => scrape(cli.url.or(cli.url_flag), cli.config, cli.no_clipboard).await,
        Some(Commands::Doctor) => cli::doctor::run(cli.config.as_deref()).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "audible-scrape", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else {
            output::error(&format!("{e:#}"));
        }
        std::process::exit(1);
    }

    result
}

async fn scrape(
    url: Option<String>,
    config_path: Option<PathBuf>,
    no_clipboard: bool,
) -> Result<()> {
    let mut config = ScrapeConfig::load(config_path.as_deref())?;
    if no_clipboard {
        config.clipboard = false;
    }

    let renderer: Arc<dyn Renderer> = match ChromiumRenderer::new(config.browser.clone()) {
        Ok(r) => {
            tracing::debug!(chrome = %r.chrome_path().display(), "using Chromium");
            Arc::new(r)
        }
        Err(e) => {
            output::warn(&format!(
                "{e:#}. Pages cannot be loaded; run `audible-scrape doctor` for details."
            ));
            Arc::new(NoopRenderer)
        }
    };

    // A prompt on stdout would break the one-JSON-document-per-line output.
    let urls: Box<dyn UrlSource> = if output::is_json() {
        Box::new(LineSource::new(std::io::stdin().lock()))
    } else {
        Box::new(UrlPrompt::new()?)
    };

    let options = ScrapeOptions {
        url,
        urls,
        clipboard: clipboard::system_sink(),
    };
    cli::scrape_cmd::run(renderer, config, options).await?;
    Ok(())
}
