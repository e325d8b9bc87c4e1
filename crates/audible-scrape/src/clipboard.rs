// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Clipboard sink for the flattened values.
//!
//! Copying is best effort. Callers report a failure and carry on.

use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

/// Somewhere to put text for pasting.
#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn copy(&self, text: &str) -> Result<()>;
}

/// Candidate clipboard tools, tried in order.
const CLIPBOARD_TOOLS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

/// Pipes text into the first platform clipboard tool found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    program: PathBuf,
    args: Vec<String>,
}

impl SystemClipboard {
    /// Locate a clipboard tool, or `None` if the system has none.
    pub fn detect() -> Option<Self> {
        CLIPBOARD_TOOLS.iter().find_map(|(name, args)| {
            which::which(name).ok().map(|program| Self {
                program,
                args: args.iter().map(|a| a.to_string()).collect(),
            })
        })
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

#[async_trait]
impl ClipboardSink for SystemClipboard {
    async fn copy(&self, text: &str) -> Result<()> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                ScrapeError::Clipboard(format!("failed to run {}: {e}", self.program.display()))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(ScrapeError::Clipboard(format!(
                "{} exited with {status}",
                self.program.display()
            )));
        }
        Ok(())
    }
}

/// A sink that always fails; used when no clipboard tool is installed.
pub struct NoClipboard;

#[async_trait]
impl ClipboardSink for NoClipboard {
    async fn copy(&self, _text: &str) -> Result<()> {
        Err(ScrapeError::Clipboard(
            "no clipboard tool found (tried pbcopy, wl-copy, xclip, xsel, clip)".to_string(),
        ))
    }
}

/// The best available sink for this system.
pub fn system_sink() -> Box<dyn ClipboardSink> {
    match SystemClipboard::detect() {
        Some(sink) => {
            tracing::debug!(program = %sink.program().display(), "clipboard tool found");
            Box::new(sink)
        }
        None => Box::new(NoClipboard),
    }
}
