// This file is part of Setcode.
//
// Setcode is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Setcode is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Setcode.
// If not, see https://www.gnu.org/licenses/.

//! Utilities for retrying operations.

use std::{future::Future, time::Duration};

use tokio::time;
use tracing::warn;

/// Options for retrying an operation using exponential backoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffOpts {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry. Doubles on every subsequent retry.
    pub base_delay: Duration,
}

impl Default for BackoffOpts {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl BackoffOpts {
    /// The wait before retry number `attempt + 1`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Retry a function using exponential backoff, only for errors accepted by `should_retry`.
///
/// Any error rejected by `should_retry` is returned immediately. Once `max_retries`
/// retries have been spent the last error is returned.
pub async fn with_backoff<Func, Fut, Out, Err, Pred>(
    description: &str,
    func: Func,
    should_retry: Pred,
    opts: BackoffOpts,
) -> Result<Out, Err>
where
    Func: Fn() -> Fut,
    Fut: Future<Output = Result<Out, Err>>,
    Pred: Fn(&Err) -> bool,
{
    let mut attempt = 0;
    loop {
        match func().await {
            Ok(out) => return Ok(out),
            Err(error) => {
                if attempt >= opts.max_retries || !should_retry(&error) {
                    return Err(error);
                }
                let delay = opts.delay_for(attempt);
                attempt += 1;
                warn!(
                    "Failed to {description}, retrying in {}ms ({attempt}/{})",
                    delay.as_millis(),
                    opts.max_retries
                );
                time::sleep(delay).await;
            }
        }
    }
}

/// Returns true if an error message looks like a rate limit response from a node provider.
pub fn is_rate_limit_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("rate limit")
        || message.contains("too many requests")
        || message.contains("429")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        RateLimited,
        Fatal,
    }

    fn is_rate_limited(err: &TestError) -> bool {
        *err == TestError::RateLimited
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_rate_limits() {
        let calls = &AtomicU32::new(0);
        let start = Instant::now();

        let res = with_backoff(
            "test",
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(TestError::RateLimited)
                } else {
                    Ok(n)
                }
            },
            is_rate_limited,
            BackoffOpts::default(),
        )
        .await;

        assert_eq!(res, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s then 2s
        assert!(start.elapsed() >= Duration::from_millis(3000));
        assert!(start.elapsed() < Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_not_retried() {
        let calls = &AtomicU32::new(0);
        let start = Instant::now();

        let res: Result<(), _> = with_backoff(
            "test",
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::Fatal)
            },
            is_rate_limited,
            BackoffOpts::default(),
        )
        .await;

        assert_eq!(res, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_returns_last_error() {
        let calls = &AtomicU32::new(0);
        let start = Instant::now();

        let res: Result<(), _> = with_backoff(
            "test",
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(TestError::RateLimited)
            },
            is_rate_limited,
            BackoffOpts::default(),
        )
        .await;

        assert_eq!(res, Err(TestError::RateLimited));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(start.elapsed() >= Duration::from_millis(7000));
        assert!(start.elapsed() < Duration::from_millis(8000));
    }

    #[test]
    fn test_delay_schedule() {
        let opts = BackoffOpts {
            max_retries: 5,
            base_delay: Duration::from_millis(250),
        };
        assert_eq!(opts.delay_for(0), Duration::from_millis(250));
        assert_eq!(opts.delay_for(1), Duration::from_millis(500));
        assert_eq!(opts.delay_for(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_rate_limit_messages() {
        assert!(is_rate_limit_message("Rate limit exceeded"));
        assert!(is_rate_limit_message("Too Many Requests"));
        assert!(is_rate_limit_message("HTTP error 429 with body: slow down"));
        assert!(!is_rate_limit_message("execution reverted"));
        assert!(!is_rate_limit_message("nonce too low"));
    }
}
