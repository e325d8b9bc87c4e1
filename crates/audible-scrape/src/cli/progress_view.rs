// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Terminal status line driven by scrape progress events.

use crate::progress::{ProgressReceiver, ScrapeEventKind};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Renders progress events on a spinner until the sender is dropped.
pub struct ProgressView {
    task: JoinHandle<()>,
}

impl ProgressView {
    pub fn spawn(mut rx: ProgressReceiver) -> Self {
        let task = tokio::spawn(async move {
            let mut spinner: Option<ProgressBar> = None;
            loop {
                let event = match rx.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(n)) => {
                        tracing::debug!(skipped = n, "progress view lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                let pb = spinner.get_or_insert_with(new_spinner);
                match &event.event {
                    ScrapeEventKind::AttemptFailed { .. }
                    | ScrapeEventKind::FieldDegraded { .. }
                    | ScrapeEventKind::Warning { .. } => {
                        pb.println(format!("  {}", event.event));
                    }
                    ScrapeEventKind::ScrapeComplete { .. } | ScrapeEventKind::Exhausted { .. } => {
                        pb.finish_and_clear();
                        spinner = None;
                    }
                    other => pb.set_message(other.to_string()),
                }
            }
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
        });
        Self { task }
    }

    /// Wait for the view to drain after the sender side is gone.
    pub async fn finish(self) {
        let _ = self.task.await;
    }
}

fn new_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
