// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exponential-backoff retry for provider calls.
//!
//! Rate limits and 502 gateway faults are retried; every other failure is
//! returned to the caller untouched. After failed attempt `n` (1-based) the
//! policy waits `backoff_base ^ (n + 2)` seconds, so the first wait is 8s
//! with the default base of 2.

use std::future::Future;
use std::time::Duration;

use ferrule_config::model::RetryConfig;
use ferrule_core::{ErrorClass, FerruleError, ProviderError};
use tracing::{debug, warn};

use crate::abort::AbortSignal;

/// Printed at most once per call when rate limiting starts.
const PAID_ACCOUNT_ADVISORY: &str = "Please double check that you have setup a PAID OpenAI API \
     Account. You can read more here: \
     https://github.com/Significant-Gravitas/Auto-GPT#openai-api-keys-configuration";

/// How many times, and how patiently, a provider call is retried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    num_retries: u32,
    backoff_base: f64,
    warn_user: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            num_retries: 10,
            backoff_base: 2.0,
            warn_user: true,
        }
    }
}

impl RetryPolicy {
    /// Create a policy. `backoff_base` must be positive and finite.
    pub fn new(num_retries: u32, backoff_base: f64, warn_user: bool) -> Result<Self, FerruleError> {
        if !(backoff_base.is_finite() && backoff_base > 0.0) {
            return Err(FerruleError::Config(format!(
                "retry backoff_base must be positive and finite, got {backoff_base}"
            )));
        }
        Ok(Self {
            num_retries,
            backoff_base,
            warn_user,
        })
    }

    pub fn from_config(config: &RetryConfig) -> Result<Self, FerruleError> {
        Self::new(config.num_retries, config.backoff_base, config.warn_user)
    }

    pub fn num_retries(&self) -> u32 {
        self.num_retries
    }

    pub fn backoff_base(&self) -> f64 {
        self.backoff_base
    }

    pub fn warn_user(&self) -> bool {
        self.warn_user
    }

    /// Total attempts including the first: `num_retries + 1`.
    pub fn max_attempts(&self) -> u32 {
        self.num_retries.saturating_add(1)
    }

    /// Wait after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX).saturating_add(2);
        Duration::try_from_secs_f64(self.backoff_base.powi(exponent)).unwrap_or(Duration::MAX)
    }

    /// Run `op` until it succeeds, fails fatally, or the retry budget is spent.
    ///
    /// `op` is invoked once per attempt. It yields `Ok(Some(value))` on
    /// success; `Ok(None)` means the provider answered without a usable
    /// response and ends the call with [`FerruleError::ProviderUnavailable`].
    /// Transient errors on the last attempt are returned as-is.
    pub async fn run<T, F, Fut>(&self, abort: &AbortSignal, mut op: F) -> Result<T, FerruleError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, ProviderError>>,
    {
        let max_attempts = self.max_attempts();
        let mut user_warned = !self.warn_user;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                abort.check(attempt - 1)?;
            }

            let err = match op().await {
                Ok(Some(value)) => {
                    if attempt > 1 {
                        debug!(attempt, "provider call succeeded after retry");
                    }
                    return Ok(value);
                }
                Ok(None) => {
                    warn!(attempt, "provider returned no usable response");
                    return Err(FerruleError::ProviderUnavailable { attempts: attempt });
                }
                Err(err) => err,
            };

            let class = err.class();
            if class == ErrorClass::Fatal || attempt == max_attempts {
                debug!(attempt, error = %err, "provider call failed");
                return Err(err.into());
            }

            if class == ErrorClass::RateLimit {
                debug!(attempt, "reached rate limit, passing...");
                if !user_warned {
                    warn!("{PAID_ACCOUNT_ADVISORY}");
                    user_warned = true;
                }
            }

            let backoff = self.backoff(attempt);
            debug!(
                attempt,
                backoff_secs = backoff.as_secs_f64(),
                error = %err,
                "transient provider error, waiting before retry"
            );
            abort.sleep(backoff, attempt).await?;
        }

        Err(FerruleError::ProviderUnavailable {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    fn rate_limited() -> ProviderError {
        ProviderError::RateLimited {
            message: "Rate limit reached".into(),
        }
    }

    fn status(status: u16) -> ProviderError {
        ProviderError::Api {
            status,
            message: "error".into(),
        }
    }

    fn policy(num_retries: u32) -> RetryPolicy {
        RetryPolicy::new(num_retries, 2.0, true).unwrap()
    }

    /// Runs `policy` against an operation that fails `failures` times with
    /// `error` and then succeeds. Returns the result and the call count.
    async fn run_failing(
        policy: &RetryPolicy,
        abort: &AbortSignal,
        failures: u32,
        error: fn() -> ProviderError,
    ) -> (Result<u32, FerruleError>, u32) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result = policy
            .run(abort, move || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move { if n <= failures { Err(error()) } else { Ok(Some(n)) } }
            })
            .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[test]
    fn backoff_is_base_to_attempt_plus_two() {
        let policy = policy(10);
        assert_eq!(policy.backoff(1), Duration::from_secs(8));
        assert_eq!(policy.backoff(2), Duration::from_secs(16));
        assert_eq!(policy.backoff(3), Duration::from_secs(32));

        let fast = RetryPolicy::new(3, 0.1, false).unwrap();
        assert!(fast.backoff(1) < Duration::from_millis(2));
    }

    #[test]
    fn rejects_unusable_backoff_base() {
        for base in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            assert!(RetryPolicy::new(3, base, true).is_err(), "base {base}");
        }
    }

    #[test]
    fn from_config_copies_fields() {
        let config = RetryConfig {
            num_retries: 4,
            backoff_base: 1.5,
            warn_user: false,
            deadline_secs: None,
        };
        let policy = RetryPolicy::from_config(&config).unwrap();
        assert_eq!(policy.max_attempts(), 5);
        assert!(!policy.warn_user());
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt_does_not_sleep() {
        let start = Instant::now();
        let (result, calls) = run_failing(&policy(10), &AbortSignal::none(), 0, rate_limited).await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_within_budget_are_absorbed() {
        let cases: [(u32, fn() -> ProviderError); 2] = [(2, rate_limited), (10, || status(502))];
        for (failures, error) in cases {
            let (result, calls) =
                run_failing(&policy(10), &AbortSignal::none(), failures, error).await;
            assert_eq!(result.unwrap(), failures + 1);
            assert_eq!(calls, failures + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_follow_the_backoff_schedule() {
        let start = Instant::now();
        let (result, _) = run_failing(&policy(10), &AbortSignal::none(), 2, rate_limited).await;
        assert!(result.is_ok());
        assert_eq!(start.elapsed(), Duration::from_secs(8 + 16));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_rate_limit_is_returned_without_final_sleep() {
        let start = Instant::now();
        let (result, calls) = run_failing(&policy(2), &AbortSignal::none(), 100, rate_limited).await;
        assert!(matches!(
            result,
            Err(FerruleError::Provider(ProviderError::RateLimited { .. }))
        ));
        assert_eq!(calls, 3);
        // Waits after attempts 1 and 2 only.
        assert_eq!(start.elapsed(), Duration::from_secs(8 + 16));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_bad_gateway_is_returned() {
        let start = Instant::now();
        let (result, calls) = run_failing(&policy(2), &AbortSignal::none(), 3, || status(502)).await;
        assert!(matches!(
            result,
            Err(FerruleError::Provider(ProviderError::Api { status: 502, .. }))
        ));
        assert_eq!(calls, 3);
        // No wait after the final attempt.
        assert_eq!(start.elapsed(), Duration::from_secs(8 + 16));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_means_one_attempt() {
        let (result, calls) = run_failing(&policy(0), &AbortSignal::none(), 1, rate_limited).await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_errors_are_not_retried() {
        let errors: [fn() -> ProviderError; 4] =
            [|| status(400), || status(401), || status(500), || status(503)];
        for error in errors {
            let start = Instant::now();
            let (result, calls) = run_failing(&policy(10), &AbortSignal::none(), 1, error).await;
            assert!(matches!(
                result,
                Err(FerruleError::Provider(ProviderError::Api { .. }))
            ));
            assert_eq!(calls, 1);
            assert_eq!(start.elapsed(), Duration::ZERO);
        }

        let (result, calls) = run_failing(&policy(10), &AbortSignal::none(), 1, || {
            ProviderError::Decode {
                message: "truncated".into(),
            }
        })
        .await;
        assert!(matches!(result, Err(FerruleError::Provider(ProviderError::Decode { .. }))));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_answer_ends_the_call() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, _> = policy(10)
            .run(&AbortSignal::none(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(None) }
            })
            .await;
        assert!(matches!(
            result,
            Err(FerruleError::ProviderUnavailable { attempts: 1 })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn paid_account_advisory_is_logged_once() {
        let (result, _) = run_failing(&policy(10), &AbortSignal::none(), 4, rate_limited).await;
        assert!(result.is_ok());
        assert!(logs_contain("reached rate limit"));
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|line| line.contains("PAID OpenAI API")).count() {
                1 => Ok(()),
                n => Err(format!("advisory logged {n} times")),
            }
        });
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn advisory_suppressed_when_warn_user_is_off() {
        let quiet = RetryPolicy::new(10, 2.0, false).unwrap();
        let (result, _) = run_failing(&quiet, &AbortSignal::none(), 2, rate_limited).await;
        assert!(result.is_ok());
        assert!(logs_contain("reached rate limit"));
        assert!(!logs_contain("PAID OpenAI API"));
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn gateway_faults_do_not_trigger_advisory() {
        let (result, _) = run_failing(&policy(10), &AbortSignal::none(), 2, || status(502)).await;
        assert!(result.is_ok());
        assert!(!logs_contain("PAID OpenAI API"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_backoff_stops_retrying() {
        let token = CancellationToken::new();
        let abort = AbortSignal::none().with_token(token.clone());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            token.cancel();
        });

        let (result, calls) = run_failing(&policy(10), &abort, 100, rate_limited).await;
        assert!(matches!(result, Err(FerruleError::Cancelled { attempts: 1 })));
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_never_interrupts_an_attempt() {
        let token = CancellationToken::new();
        let abort = AbortSignal::none().with_token(token.clone());
        let calls = AtomicU32::new(0);

        let result: Result<u32, _> = policy(10)
            .run(&abort, || {
                calls.fetch_add(1, Ordering::SeqCst);
                let token = token.clone();
                async move {
                    token.cancel();
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    Err(rate_limited())
                }
            })
            .await;

        assert!(matches!(result, Err(FerruleError::Cancelled { attempts: 1 })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_stops_before_a_wait_that_would_overrun() {
        let abort = AbortSignal::none().with_timeout(Duration::from_secs(30));
        let start = Instant::now();
        let (result, calls) = run_failing(&policy(10), &abort, 100, rate_limited).await;

        // Waits of 8s and 16s fit; the 32s wait after attempt 3 does not.
        assert!(matches!(
            result,
            Err(FerruleError::DeadlineExceeded { attempts: 3 })
        ));
        assert_eq!(calls, 3);
        assert_eq!(start.elapsed(), Duration::from_secs(24));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_ending_exactly_at_deadline_fails_without_waiting() {
        let abort = AbortSignal::none().with_timeout(Duration::from_secs(8));
        let quiet = RetryPolicy::new(10, 2.0, false).unwrap();
        let start = Instant::now();
        let (result, calls) = run_failing(&quiet, &abort, 100, rate_limited).await;

        assert!(matches!(
            result,
            Err(FerruleError::DeadlineExceeded { attempts: 1 })
        ));
        assert_eq!(calls, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
