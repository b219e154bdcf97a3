//! # Processor Retry
//!
//! Bounded, timed, exponentially backed-off calls to the payment processor.
//! Every attempt re-uses the caller's idempotency key, so an attempt whose
//! acknowledgement was lost is replayed rather than repeated.

use crate::config::RetryPolicy;
use crate::domain::{EscrowError, IdempotencyKey};
use crate::ports::ProcessorError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Run `call` until it is acknowledged, declined, or attempts run out.
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    key: &IdempotencyKey,
    mut call: F,
) -> Result<T, EscrowError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProcessorError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = ProcessorError::Timeout;

    for attempt in 1..=max_attempts {
        let outcome = match tokio::time::timeout(policy.call_timeout(), call()).await {
            Ok(result) => result,
            Err(_) => Err(ProcessorError::Timeout),
        };

        match outcome {
            Ok(value) => {
                if attempt > 1 {
                    debug!(key = %key, attempt, "Processor acknowledged after retry");
                }
                return Ok(value);
            }
            Err(ProcessorError::Declined(reason)) => {
                warn!(key = %key, reason = %reason, "Processor declined");
                return Err(EscrowError::ProcessorDeclined(reason));
            }
            Err(err) => {
                warn!(
                    key = %key,
                    attempt,
                    max_attempts,
                    error = %err,
                    "Processor call failed"
                );
                last_error = err;
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(next_delay(policy, attempt)).await;
        }
    }

    Err(EscrowError::ProcessorUnavailable {
        attempts: max_attempts,
        reason: last_error.to_string(),
    })
}

fn next_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let base = policy.backoff_for(attempt);
    if !policy.jitter || base.is_zero() {
        return base;
    }
    let millis = base.as_millis() as u64;
    Duration::from_millis(rand::thread_rng().gen_range(millis / 2..=millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ProjectId;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::domain::EscrowAction;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            call_timeout_ms: 100,
            initial_backoff_ms: 10,
            max_backoff_ms: 40,
            jitter: true,
        }
    }

    fn key() -> IdempotencyKey {
        IdempotencyKey::new(ProjectId::new(), EscrowAction::Hold, 1)
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = call_with_retry(&policy(3), &key(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ProcessorError::Unavailable("503".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_reports_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = call_with_retry(&policy(4), &key(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProcessorError::Unavailable("down".into())) }
        })
        .await;

        assert!(matches!(
            result,
            Err(EscrowError::ProcessorUnavailable { attempts: 4, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decline_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = call_with_retry(&policy(5), &key(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProcessorError::Declined("insufficient funds".into())) }
        })
        .await;

        assert_eq!(
            result,
            Err(EscrowError::ProcessorDeclined("insufficient funds".into()))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let result: Result<(), _> = call_with_retry(&policy(2), &key(), || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        })
        .await;

        match result {
            Err(EscrowError::ProcessorUnavailable { attempts, reason }) => {
                assert_eq!(attempts, 2);
                assert!(reason.contains("timed out"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_jitter_stays_within_half_to_full() {
        let policy = policy(3);
        for attempt in 1..=3 {
            let base = policy.backoff_for(attempt);
            let delay = next_delay(&policy, attempt);
            assert!(delay <= base);
            assert!(delay >= base / 2);
        }
    }
}
