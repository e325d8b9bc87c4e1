// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Retry budget and two-tier timeout schedule.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of acquisition attempts per URL.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Retry policy for page acquisition.
///
/// Attempt 1 uses `initial_timeout_ms`, attempt 2 uses
/// `first_retry_timeout_ms`, and every attempt after that uses
/// `later_retry_timeout_ms`. The schedule is a fixed two-tier step, not a
/// doubling curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionPolicy {
    pub max_attempts: u32,
    pub initial_timeout_ms: u64,
    pub first_retry_timeout_ms: u64,
    pub later_retry_timeout_ms: u64,
    /// How often the readiness predicate is re-evaluated.
    pub poll_interval_ms: u64,
    /// Discard the session after a plain timeout too, not only after errors.
    pub recreate_on_timeout: bool,
}

impl Default for AcquisitionPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_timeout_ms: 10_000,
            first_retry_timeout_ms: 60_000,
            later_retry_timeout_ms: 120_000,
            poll_interval_ms: 250,
            recreate_on_timeout: true,
        }
    }
}

impl AcquisitionPolicy {
    /// Timeout budget for a 1-based attempt index.
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        let ms = match attempt {
            0 | 1 => self.initial_timeout_ms,
            2 => self.first_retry_timeout_ms,
            _ => self.later_retry_timeout_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// A policy that always makes at least one attempt.
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
