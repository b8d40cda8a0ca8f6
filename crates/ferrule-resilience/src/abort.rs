// SPDX-FileCopyrightText: 2026 Ferrule Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-side cancellation and deadlines for retried calls.
//!
//! An [`AbortSignal`] is consulted only at attempt boundaries: before every
//! attempt after the first, and while waiting out a backoff. A transport call
//! that is already in flight always runs to completion.

use std::time::Duration;

use ferrule_core::FerruleError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Optional cancellation token and deadline for one call.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl AbortSignal {
    /// A signal that never fires.
    pub fn none() -> Self {
        Self::default()
    }

    /// Abort when `token` is cancelled.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Abort once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abort once `timeout` has elapsed from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(far_future);
        self.with_deadline(deadline)
    }

    pub fn token(&self) -> Option<&CancellationToken> {
        self.token.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if the token is cancelled or the deadline has passed.
    ///
    /// `attempts` is the number of attempts already made, reported in the error.
    pub fn check(&self, attempts: u32) -> Result<(), FerruleError> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(FerruleError::Cancelled { attempts });
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(FerruleError::DeadlineExceeded { attempts });
        }
        Ok(())
    }

    /// Wait out a backoff unless the signal fires first.
    ///
    /// When the backoff would end at or past the deadline no further attempt
    /// could start, so this fails immediately with `DeadlineExceeded`.
    pub async fn sleep(&self, backoff: Duration, attempts: u32) -> Result<(), FerruleError> {
        self.check(attempts)?;

        let wake = Instant::now().checked_add(backoff).unwrap_or_else(far_future);
        if let Some(deadline) = self.deadline {
            if wake >= deadline {
                debug!(
                    attempts,
                    backoff_secs = backoff.as_secs_f64(),
                    "backoff would outlast deadline, giving up"
                );
                return Err(FerruleError::DeadlineExceeded { attempts });
            }
        }

        match &self.token {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(attempts, "cancelled during backoff");
                        Err(FerruleError::Cancelled { attempts })
                    }
                    _ = tokio::time::sleep_until(wake) => Ok(()),
                }
            }
            None => {
                tokio::time::sleep_until(wake).await;
                Ok(())
            }
        }
    }
}

// Roughly 30 years out, mirroring what tokio uses for unbounded sleeps.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86_400 * 365 * 30)
}
