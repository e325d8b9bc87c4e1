// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bounded-retry page acquisition.
//!
//! The controller loads a URL into a session, waits for the data-layer
//! readiness predicate, and on failure discards the session and tries again
//! with a larger budget. It owns every session it creates until it either
//! hands a ready one to the caller or closes it.

use super::policy::AcquisitionPolicy;
use super::wait::{wait_for_result, WaitConfig, WaitError};
use crate::error::{Result, ScrapeError};
use crate::progress::{ProgressReporter, ScrapeEventKind};
use crate::renderer::{NavigationTimeout, RenderContext, Renderer};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// How one attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Ready,
    /// The readiness predicate did not hold within the budget.
    TimedOut,
    /// Navigation, evaluation, or session creation raised an error.
    SessionError(String),
}

impl AttemptOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, AttemptOutcome::Ready)
    }

    fn describe(&self, timeout: Duration) -> String {
        match self {
            AttemptOutcome::Ready => "ready".to_string(),
            AttemptOutcome::TimedOut => {
                format!("page data not ready within {}s", timeout.as_secs())
            }
            AttemptOutcome::SessionError(e) => e.clone(),
        }
    }
}

/// Diagnostic record of one retry cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionAttempt {
    /// 1-based attempt index.
    pub index: u32,
    pub timeout: Duration,
    pub outcome: AttemptOutcome,
}

/// Acquisition state machine.
///
/// `Idle -> Attempting -> {Ready | AttemptFailed}`, then
/// `AttemptFailed -> Attempting` while attempts remain, else `Exhausted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    Idle,
    Attempting { attempt: u32 },
    Ready { attempt: u32 },
    AttemptFailed { attempt: u32 },
    Exhausted { attempts: u32 },
}

impl AcquisitionState {
    /// Apply an attempt result or a retry decision. Transitions that the
    /// machine does not define leave the state unchanged.
    pub fn advance(self, outcome: Option<&AttemptOutcome>, max_attempts: u32) -> Self {
        match (self, outcome) {
            (Self::Idle, _) => Self::Attempting { attempt: 1 },
            (Self::Attempting { attempt }, Some(o)) if o.is_ready() => Self::Ready { attempt },
            (Self::Attempting { attempt }, Some(_)) => Self::AttemptFailed { attempt },
            (Self::AttemptFailed { attempt }, _) if attempt < max_attempts => Self::Attempting {
                attempt: attempt + 1,
            },
            (Self::AttemptFailed { attempt }, _) => Self::Exhausted { attempts: attempt },
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::Exhausted { .. })
    }
}

/// A session whose page passed the readiness predicate.
pub struct ReadyPage {
    pub context: Box<dyn RenderContext>,
    pub final_url: String,
    pub attempts: Vec<AcquisitionAttempt>,
}

impl std::fmt::Debug for ReadyPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadyPage")
            .field("final_url", &self.final_url)
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

/// Drives the acquisition state machine for one URL.
pub struct AcquisitionController<'a> {
    renderer: &'a dyn Renderer,
    policy: &'a AcquisitionPolicy,
    readiness_script: String,
}

impl<'a> AcquisitionController<'a> {
    pub fn new(
        renderer: &'a dyn Renderer,
        policy: &'a AcquisitionPolicy,
        readiness_script: String,
    ) -> Self {
        Self {
            renderer,
            policy,
            readiness_script,
        }
    }

    /// Acquire a ready page or fail with `AcquisitionExhausted`.
    pub async fn acquire(&self, url: &str, progress: &mut ProgressReporter) -> Result<ReadyPage> {
        let max_attempts = self.policy.effective_max_attempts();
        let mut state = AcquisitionState::Idle.advance(None, max_attempts);
        let mut session: Option<Box<dyn RenderContext>> = None;
        let mut history: Vec<AcquisitionAttempt> = Vec::new();
        let mut final_url = url.to_string();
        let mut last_error = String::new();

        loop {
            match state {
                AcquisitionState::Idle | AcquisitionState::AttemptFailed { .. } => {
                    state = state.advance(None, max_attempts);
                }
                AcquisitionState::Attempting { attempt } => {
                    let timeout = self.policy.timeout_for(attempt);
                    progress.emit(ScrapeEventKind::AttemptStarted {
                        attempt,
                        max_attempts,
                        timeout_ms: timeout.as_millis() as u64,
                    });

                    let mut creation_error = None;
                    if session.is_none() {
                        match self.renderer.new_context().await {
                            Ok(ctx) => {
                                if attempt > 1 {
                                    progress.emit(ScrapeEventKind::SessionRecreated { attempt });
                                }
                                session = Some(ctx);
                            }
                            Err(e) => {
                                creation_error = Some(AttemptOutcome::SessionError(format!(
                                    "failed to create browser session: {e:#}"
                                )));
                            }
                        }
                    }

                    let outcome = match (creation_error, session.as_mut()) {
                        (Some(err), _) => Err(err),
                        (None, Some(ctx)) => self.run_attempt(ctx.as_mut(), url, timeout).await,
                        (None, None) => Err(AttemptOutcome::SessionError(
                            "no browser session available".to_string(),
                        )),
                    };

                    let outcome = match outcome {
                        Ok(nav_url) => {
                            final_url = nav_url;
                            AttemptOutcome::Ready
                        }
                        Err(failure) => {
                            last_error = failure.describe(timeout);
                            tracing::warn!(attempt, url, "acquisition attempt failed: {last_error}");
                            progress.emit(ScrapeEventKind::AttemptFailed {
                                attempt,
                                reason: last_error.clone(),
                            });
                            let recreate = match failure {
                                AttemptOutcome::SessionError(_) => true,
                                _ => self.policy.recreate_on_timeout,
                            };
                            if recreate {
                                if let Some(ctx) = session.take() {
                                    close_session(ctx, progress).await;
                                }
                            }
                            failure
                        }
                    };

                    state = state.advance(Some(&outcome), max_attempts);
                    history.push(AcquisitionAttempt {
                        index: attempt,
                        timeout,
                        outcome,
                    });
                }
                AcquisitionState::Ready { attempt } => {
                    let context = session.take().ok_or_else(|| {
                        ScrapeError::Session("ready state reached without a session".to_string())
                    })?;
                    tracing::debug!(attempt, url, "page ready");
                    return Ok(ReadyPage {
                        context,
                        final_url,
                        attempts: history,
                    });
                }
                AcquisitionState::Exhausted { attempts } => {
                    if let Some(ctx) = session.take() {
                        close_session(ctx, progress).await;
                    }
                    progress.emit(ScrapeEventKind::Exhausted {
                        attempts,
                        last_error: last_error.clone(),
                    });
                    return Err(ScrapeError::AcquisitionExhausted {
                        url: url.to_string(),
                        attempts,
                        last_error,
                    });
                }
            }
        }
    }

    /// Navigate and wait for readiness, racing both against the budget.
    /// Returns the post-navigation URL on success.
    async fn run_attempt(
        &self,
        ctx: &mut dyn RenderContext,
        url: &str,
        timeout: Duration,
    ) -> std::result::Result<String, AttemptOutcome> {
        let start = Instant::now();
        let script = self.readiness_script.as_str();
        let poll_interval = self.policy.poll_interval();

        let attempt = async {
            let nav = ctx
                .navigate(url, timeout.as_millis() as u64)
                .await
                .map_err(|e| navigation_outcome(&e))?;

            let page: &dyn RenderContext = &*ctx;
            let remaining = timeout.saturating_sub(start.elapsed());
            wait_for_result(
                move || async move {
                    let value = page.execute_js(script).await?;
                    Ok::<bool, anyhow::Error>(is_truthy(&value))
                },
                WaitConfig::new(remaining, poll_interval),
                "product data layer populated",
            )
            .await
            .map_err(|e| match e {
                WaitError::Timeout { .. } => AttemptOutcome::TimedOut,
                WaitError::Failed { source, .. } => {
                    AttemptOutcome::SessionError(format!("{source:#}"))
                }
            })?;

            Ok::<String, AttemptOutcome>(nav.final_url)
        };

        match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(AttemptOutcome::TimedOut),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

async fn close_session(ctx: Box<dyn RenderContext>, progress: &mut ProgressReporter) {
    if let Err(e) = ctx.close().await {
        tracing::warn!("failed to close browser session: {e:#}");
        progress.emit(ScrapeEventKind::Warning {
            message: format!("failed to close browser session: {e:#}"),
        });
    }
}

/// Classify a navigation error. Running out of time is a timeout, not a
/// broken session.
fn navigation_outcome(e: &anyhow::Error) -> AttemptOutcome {
    if e.downcast_ref::<NavigationTimeout>().is_some() {
        AttemptOutcome::TimedOut
    } else {
        AttemptOutcome::SessionError(format!("{e:#}"))
    }
}
