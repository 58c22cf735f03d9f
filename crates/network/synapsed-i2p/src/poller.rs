//! Bounded SAM bridge readiness polling.
//!
//! The engine's start call returns before its SAM bridge is up. The poller
//! checks the bridge a fixed number of times, waiting a fixed interval after
//! every miss, and gives up once the budget is spent. Giving up is not an
//! error: the bridge may still come up later.

use crate::engine::RouterEngine;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default number of bridge checks.
pub const DEFAULT_READINESS_ATTEMPTS: u32 = 20;

/// Default wait after each failed check.
pub const DEFAULT_READINESS_INTERVAL: Duration = Duration::from_millis(500);

/// Bound and step of the readiness loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessPolicy {
    /// Checks before giving up; zero disables polling
    pub attempts: u32,
    /// Wait after each failed check, in milliseconds
    pub interval_ms: u64,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_READINESS_ATTEMPTS, DEFAULT_READINESS_INTERVAL)
    }
}

impl ReadinessPolicy {
    /// Creates a policy of `attempts` checks spaced by `interval`.
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts,
            interval_ms: u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// No readiness wait at all.
    pub fn disabled() -> Self {
        Self {
            attempts: 0,
            interval_ms: 0,
        }
    }

    /// Wait after each failed check.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Longest time a poll can block.
    pub fn max_wait(&self) -> Duration {
        self.interval().saturating_mul(self.attempts)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.attempts > 0 && self.interval_ms == 0 {
            return Err(RouterError::config(
                "readiness interval must be non-zero when polling is enabled",
            ));
        }
        Ok(())
    }
}

/// Outcome of the post-start readiness wait. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The bridge was observed after `attempts` checks
    Ready {
        /// Checks performed
        attempts: u32,
        /// Time spent waiting between checks
        waited: Duration,
    },
    /// The budget ran out without observing the bridge
    TimedOut {
        /// Checks performed
        attempts: u32,
        /// Time spent waiting between checks
        waited: Duration,
    },
    /// Polling is disabled by policy
    Skipped,
    /// `start` was a no-op because the router was already running
    AlreadyRunning,
}

impl Readiness {
    /// Whether the bridge was observed.
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }

    /// Whether the poll budget ran out.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Readiness::TimedOut { .. })
    }
}

/// Source of delays for the poll loop.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Polls an engine until its SAM bridge is present or the budget is spent.
#[derive(Clone)]
pub struct ReadinessPoller {
    policy: ReadinessPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ReadinessPoller {
    /// Creates a poller that waits on the tokio timer.
    pub fn new(policy: ReadinessPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    /// Creates a poller with a custom delay source.
    pub fn with_sleeper(policy: ReadinessPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    /// Active policy.
    pub fn policy(&self) -> ReadinessPolicy {
        self.policy
    }

    /// Runs the loop to early success or the full budget. Never cancelled.
    pub async fn wait_for_bridge(&self, engine: &dyn RouterEngine) -> Readiness {
        if self.policy.attempts == 0 {
            return Readiness::Skipped;
        }

        let interval = self.policy.interval();
        let mut waited = Duration::ZERO;
        for attempt in 1..=self.policy.attempts {
            if engine.is_bridge_ready() {
                tracing::debug!(attempt, waited_ms = waited.as_millis() as u64, "SAM bridge is active");
                return Readiness::Ready {
                    attempts: attempt,
                    waited,
                };
            }
            self.sleeper.sleep(interval).await;
            waited += interval;
        }

        // The last wait is only useful if it is followed by a check.
        if engine.is_bridge_ready() {
            tracing::debug!(waited_ms = waited.as_millis() as u64, "SAM bridge is active");
            return Readiness::Ready {
                attempts: self.policy.attempts + 1,
                waited,
            };
        }

        Readiness::TimedOut {
            attempts: self.policy.attempts + 1,
            waited,
        }
    }
}

impl std::fmt::Debug for ReadinessPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessPoller")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
