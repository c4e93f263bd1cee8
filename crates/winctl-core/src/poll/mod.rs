//! Bounded polling for window-manager changes that land asynchronously.

use std::time::Duration;

use tracing::debug;

use crate::window::errors::WindowError;

/// Default number of re-checks after the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default delay before the first re-check.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(25);

/// Attempt ceiling and delay schedule for [`await_convergence`].
///
/// The delay before re-check `n` (1-based) is
/// `base_delay * (1 + backoff * (n - 1))`. With the default `backoff` of 1.0
/// that is `base_delay * n`, a linearly growing wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    backoff: f64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, backoff: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff: backoff.max(0.0),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn backoff(&self) -> f64 {
        self.backoff
    }

    /// Delay slept before re-check `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1.0 + self.backoff * f64::from(attempt.saturating_sub(1));
        let nanos = (self.base_delay.as_nanos() as f64 * factor).round();
        Duration::from_nanos(nanos as u64)
    }

    /// Sum of every delay the policy can sleep.
    pub fn total_delay(&self) -> Duration {
        (1..=self.max_attempts).map(|n| self.delay_for(n)).sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY, 1.0)
    }
}

/// Blocks the calling thread between checks.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Real-time sleeper backed by `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Check `condition` until it holds or the policy runs out of attempts.
///
/// The condition is evaluated once up front, then again after each delay.
/// Returns `Ok(false)` when the ceiling is reached without convergence. An
/// error from the condition is returned immediately and never retried.
pub fn await_convergence<F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut condition: F,
) -> Result<bool, WindowError>
where
    F: FnMut() -> Result<bool, WindowError>,
{
    if condition()? {
        return Ok(true);
    }

    for attempt in 1..=policy.max_attempts {
        let delay = policy.delay_for(attempt);
        sleeper.sleep(delay);

        if condition()? {
            debug!(
                event = "core.poll.converged",
                attempt = attempt,
                delay_ms = delay.as_millis() as u64
            );
            return Ok(true);
        }
    }

    debug!(
        event = "core.poll.exhausted",
        attempts = policy.max_attempts
    );
    Ok(false)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Fake clock: records requested delays instead of sleeping.
    /// Clones share the same record.
    #[derive(Debug, Default, Clone)]
    pub struct RecordingSleeper {
        slept: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        pub fn delays(&self) -> Vec<Duration> {
            self.slept.lock().unwrap().clone()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }
}
