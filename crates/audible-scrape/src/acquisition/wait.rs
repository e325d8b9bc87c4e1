// Copyright 2026 Audible Scrape Contributors
// SPDX-License-Identifier: Apache-2.0

//! Polling waits for page conditions.
//!
//! A condition is an async closure polled at a fixed interval until it holds
//! or the timeout expires. Sleeping goes through `tokio::time`, so the host
//! stays responsive and tests can run the clock paused.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Configuration for wait operations.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,
    /// How often to check if the condition is satisfied.
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// Why a wait ended without the condition holding.
#[derive(Debug, thiserror::Error)]
pub enum WaitError {
    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    Timeout { condition: String, timeout: Duration },

    /// The condition itself failed; polling stops immediately.
    #[error("wait condition '{condition}' failed: {source}")]
    Failed {
        condition: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Waits for a fallible condition to become true, with timeout.
///
/// Unlike a plain boolean wait, an error from the condition ends the wait at
/// once: a session that cannot evaluate the condition will not recover by
/// being asked again.
pub async fn wait_for_result<F, Fut>(
    mut condition: F,
    config: WaitConfig,
    description: &str,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let start = Instant::now();

    loop {
        match condition().await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(source) => {
                return Err(WaitError::Failed {
                    condition: description.to_string(),
                    source,
                })
            }
        }

        if start.elapsed() >= config.timeout {
            return Err(WaitError::Timeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval).await;
    }
}
