use std::fmt::Display;
use std::time::Duration;

use log::{debug, warn};

use crate::constants::{RETRY_ATTEMPTS, RETRY_DELAY};

/// Blocks between attempts. Tests substitute an implementation that only
/// records the requested delays.
pub trait Sleeper {
    fn sleep(&mut self, delay: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Fixed delay retry, no exponential growth and no jitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RETRY_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    // At least one attempt is always made.
    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Run `op` until it succeeds or the attempts are used up, returning the
    /// last error in the latter case. `op` receives the 1-based attempt number.
    pub fn retry<T, E, S, F>(&self, sleeper: &mut S, mut op: F) -> Result<T, E>
    where
        E: Display,
        S: Sleeper + ?Sized,
        F: FnMut(u32) -> Result<T, E>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => {
                    warn!("Attempt {}/{} failed, giving up: {}", attempt, attempts, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed, retrying in {:?}: {}",
                        attempt, attempts, self.delay, e
                    );
                }
            }
            sleeper.sleep(self.delay);
            attempt += 1;
            debug!("Starting attempt {}/{}", attempt, attempts);
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default)]
    pub(crate) struct RecordingSleeper {
        pub(crate) delays: Vec<Duration>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&mut self, delay: Duration) {
            self.delays.push(delay);
        }
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(10));
    }

    #[test]
    fn test_retry_first_attempt_succeeds() {
        let policy = RetryPolicy::default();
        let mut sleeper = RecordingSleeper::default();
        let result: Result<u32, String> = policy.retry(&mut sleeper, Ok);
        assert_eq!(result, Ok(1));
        assert!(sleeper.delays.is_empty());
    }

    #[test]
    fn test_retry_succeeds_after_failures() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        let mut sleeper = RecordingSleeper::default();
        let result = policy.retry(&mut sleeper, |attempt| {
            if attempt < 3 {
                Err(format!("attempt {} failed", attempt))
            } else {
                Ok("done")
            }
        });
        assert_eq!(result, Ok("done"));
        assert_eq!(
            sleeper.delays,
            vec![Duration::from_secs(10), Duration::from_secs(10)]
        );
    }

    #[test]
    fn test_retry_exhausted_returns_last_error() {
        let policy = RetryPolicy::new(3, Duration::from_secs(10));
        let mut sleeper = RecordingSleeper::default();
        let mut calls = 0;
        let result: Result<(), String> = policy.retry(&mut sleeper, |attempt| {
            calls += 1;
            Err(format!("attempt {} failed", attempt))
        });
        assert_eq!(result, Err("attempt 3 failed".to_string()));
        assert_eq!(calls, 3);
        // No sleep after the final attempt.
        assert_eq!(sleeper.delays.len(), 2);
    }

    #[test]
    fn test_retry_zero_attempts_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        let mut sleeper = RecordingSleeper::default();
        let mut calls = 0;
        let result: Result<(), &str> = policy.retry(&mut sleeper, |_| {
            calls += 1;
            Err("nope")
        });
        assert_eq!(result, Err("nope"));
        assert_eq!(calls, 1);
        assert!(sleeper.delays.is_empty());
    }
}
