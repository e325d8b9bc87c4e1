// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for scrape status reporting.
//!
//! The acquisition controller and orchestrator emit `ScrapeEvent`s, which
//! flow through a `tokio::sync::broadcast` channel to whoever is listening
//! (the CLI status line, tests). When no subscriber exists, events are
//! silently dropped.

use serde::{Deserialize, Serialize};

/// A progress event emitted during one scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeEvent {
    /// The scrape this event belongs to.
    pub scrape_id: String,
    /// Monotonically increasing sequence number.
    pub seq: u64,
    pub event: ScrapeEventKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScrapeEventKind {
    /// An acquisition attempt is starting.
    AttemptStarted {
        attempt: u32,
        max_attempts: u32,
        timeout_ms: u64,
    },
    /// An acquisition attempt failed and may be retried.
    AttemptFailed { attempt: u32, reason: String },
    /// The previous session was discarded and a new one created.
    SessionRecreated { attempt: u32 },
    /// The readiness predicate held.
    PageReady { attempt: u32, elapsed_ms: u64 },
    /// All attempts failed.
    Exhausted { attempts: u32, last_error: String },
    /// A field fell back to its empty value.
    FieldDegraded { field: String },
    /// The record was assembled.
    ScrapeComplete { title: String, elapsed_ms: u64 },
    /// A non-fatal warning occurred.
    Warning { message: String },
}

impl std::fmt::Display for ScrapeEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AttemptStarted {
                attempt,
                max_attempts,
                timeout_ms,
            } => write!(
                f,
                "Loading page (attempt {attempt}/{max_attempts}, timeout {}s)",
                timeout_ms / 1000
            ),
            Self::AttemptFailed { attempt, reason } => {
                write!(f, "Attempt {attempt} failed: {reason}")
            }
            Self::SessionRecreated { attempt } => {
                write!(f, "Restarting browser session for attempt {attempt}")
            }
            Self::PageReady { attempt, elapsed_ms } => {
                write!(f, "Page ready after {elapsed_ms}ms (attempt {attempt})")
            }
            Self::Exhausted {
                attempts,
                last_error,
            } => write!(f, "Gave up after {attempts} attempts: {last_error}"),
            Self::FieldDegraded { field } => write!(f, "No value found for {field}"),
            Self::ScrapeComplete { title, elapsed_ms } => {
                write!(f, "Scraped \"{title}\" in {elapsed_ms}ms")
            }
            Self::Warning { message } => write!(f, "Warning: {message}"),
        }
    }
}

/// Sender handle for emitting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<ScrapeEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<ScrapeEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(64)
}

/// Emits events for one scrape, numbering them as it goes.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: Option<ProgressSender>,
    scrape_id: String,
    seq: u64,
}

impl ProgressReporter {
    pub fn new(tx: Option<ProgressSender>, scrape_id: impl Into<String>) -> Self {
        Self {
            tx,
            scrape_id: scrape_id.into(),
            seq: 0,
        }
    }

    pub fn scrape_id(&self) -> &str {
        &self.scrape_id
    }

    /// Emit an event, silently ignoring send errors (which occur when no
    /// receivers are listening).
    pub fn emit(&mut self, event: ScrapeEventKind) {
        if let Some(ref sender) = self.tx {
            self.seq += 1;
            let _ = sender.send(ScrapeEvent {
                scrape_id: self.scrape_id.clone(),
                seq: self.seq,
                event,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ScrapeEvent {
            scrape_id: "s-1".to_string(),
            seq: 1,
            event: ScrapeEventKind::AttemptStarted {
                attempt: 1,
                max_attempts: 4,
                timeout_ms: 10_000,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("AttemptStarted"));

        let parsed: ScrapeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, 1);
        assert_eq!(parsed.event, event.event);
    }

    #[test]
    fn test_reporter_numbers_events() {
        let (tx, mut rx) = channel();
        let mut reporter = ProgressReporter::new(Some(tx), "s-2");
        reporter.emit(ScrapeEventKind::SessionRecreated { attempt: 2 });
        reporter.emit(ScrapeEventKind::Warning {
            message: "x".to_string(),
        });

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!((first.seq, second.seq), (1, 2));
        assert_eq!(second.scrape_id, "s-2");
    }

    #[test]
    fn test_channel_no_receivers() {
        let (tx, rx) = channel();
        drop(rx);
        let mut reporter = ProgressReporter::new(Some(tx), "s-3");
        reporter.emit(ScrapeEventKind::Warning {
            message: "nobody listening".to_string(),
        });
    }

    #[test]
    fn test_display() {
        let kind = ScrapeEventKind::AttemptStarted {
            attempt: 2,
            max_attempts: 4,
            timeout_ms: 60_000,
        };
        assert_eq!(
            kind.to_string(),
            "Loading page (attempt 2/4, timeout 60s)"
        );
    }
}
