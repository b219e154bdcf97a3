//! Configuration for the Escrow Ledger

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy for payment processor calls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first
    pub max_attempts: u32,
    /// Budget for a single call before it counts as a timeout (ms)
    pub call_timeout_ms: u64,
    /// Delay before the second attempt (ms); doubles after each failure
    pub initial_backoff_ms: u64,
    /// Upper bound on the delay between attempts (ms)
    pub max_backoff_ms: u64,
    /// Randomize each delay into [delay/2, delay]
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            call_timeout_ms: 2_000,
            initial_backoff_ms: 50,
            max_backoff_ms: 1_000,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Un-jittered delay after the given failed attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(delay)
    }
}

/// Escrow ledger configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    /// Processor retry behaviour
    pub retry: RetryPolicy,
}
