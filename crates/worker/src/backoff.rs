//! Exponential backoff with interruptible waits.
//!
//! Shared by the per-file upload retry loop (uncapped, bounded attempts) and
//! the supervisor's reconnect loop (capped, unbounded attempts).

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Doubling delay, optionally capped.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Option<Duration>,
    current: Duration,
    failures: u32,
}

impl Backoff {
    pub fn new(initial: Duration, max: Option<Duration>) -> Self {
        Self {
            initial,
            max,
            current: initial,
            failures: 0,
        }
    }

    /// Backoff that doubles without limit.
    pub fn uncapped(initial: Duration) -> Self {
        Self::new(initial, None)
    }

    /// Backoff that doubles up to `max`.
    pub fn capped(initial: Duration, max: Duration) -> Self {
        Self::new(initial, Some(max))
    }

    /// Delay the next failure will wait.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Consecutive failures since the last reset.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Records a failure: returns the delay to wait now and doubles the next
    /// one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.failures = self.failures.saturating_add(1);

        let doubled = self.current.saturating_mul(2);
        self.current = match self.max {
            Some(max) => doubled.min(max),
            None => doubled,
        };
        delay
    }

    /// Back to the initial delay after a success.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.failures = 0;
    }
}

/// Sleeps for `delay` unless `cancel` fires first.
///
/// Returns `true` if the full delay elapsed, `false` if cancelled.
pub async fn sleep_or_cancelled(delay: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }

    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

/// Result of [`retry_with_backoff`].
#[derive(Debug)]
pub enum Retry<T, E> {
    /// The operation succeeded on attempt `attempts`.
    Done { value: T, attempts: u32 },
    /// Every allowed attempt failed.
    Exhausted { error: E, attempts: u32 },
    /// The error was not retryable.
    Aborted { error: E, attempts: u32 },
    /// Shutdown was requested before or between attempts.
    Cancelled { last_error: Option<E>, attempts: u32 },
}

/// Runs `op` until it succeeds, the attempt budget is spent, `should_retry`
/// rejects an error, or `cancel` fires.
///
/// `op` receives the 1-based attempt number. No delay follows the last
/// allowed attempt. `max_attempts = None` retries forever.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
    backoff: &mut Backoff,
    max_attempts: Option<u32>,
    cancel: &CancellationToken,
    mut op: F,
    mut should_retry: R,
) -> Retry<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: FnMut(&E, u32) -> bool,
{
    let mut attempts = 0u32;
    let mut last_error = None;

    loop {
        if cancel.is_cancelled() {
            return Retry::Cancelled {
                last_error,
                attempts,
            };
        }

        attempts += 1;
        let error = match op(attempts).await {
            Ok(value) => return Retry::Done { value, attempts },
            Err(e) => e,
        };

        if !should_retry(&error, attempts) {
            return Retry::Aborted { error, attempts };
        }

        if max_attempts.is_some_and(|max| attempts >= max) {
            return Retry::Exhausted { error, attempts };
        }

        let delay = backoff.next_delay();
        if !sleep_or_cancelled(delay, cancel).await {
            return Retry::Cancelled {
                last_error: Some(error),
                attempts,
            };
        }
        last_error = Some(error);
    }
}
