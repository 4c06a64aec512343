use std::time::Duration;

/// Bounded-attempt retry with linear backoff.
///
/// Pure policy: it only answers "how many tries" and "how long to wait after
/// attempt N". The caller owns the sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after the 1-based `attempt` failed: 1s, 2s, 3s, ...
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Whether another attempt is allowed after `attempt` failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}
