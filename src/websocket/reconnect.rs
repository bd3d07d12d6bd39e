//! Reconnect backoff policy.

use std::time::Duration;

/// Default number of reconnect attempts before giving up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
/// Default delay before the first reconnect attempt.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Unjittered exponential backoff with an attempt ceiling.
///
/// Attempts are numbered from 1. Attempt `n` waits `base_delay * 2^(n-1)`,
/// optionally capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
    pub max_delay: Option<Duration>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            max_delay: None,
        }
    }
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
            max_delay: None,
        }
    }

    /// Cap every delay at `max_delay`.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay before attempt `attempt`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        // Shifts past 31 would overflow the u32 multiplier
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.base_delay.saturating_mul(1u32 << exponent);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Whether attempt `attempt` is allowed to happen.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.base_delay, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.max_delay, None);
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = ReconnectPolicy::default();

        // Attempt 1: 2^0 = 1s
        assert_eq!(policy.next_delay(1), Duration::from_secs(1));
        // Attempt 2: 2^1 = 2s
        assert_eq!(policy.next_delay(2), Duration::from_secs(2));
        // Attempt 3: 2^2 = 4s
        assert_eq!(policy.next_delay(3), Duration::from_secs(4));
        // Attempt 4: 2^3 = 8s
        assert_eq!(policy.next_delay(4), Duration::from_secs(8));
        // Attempt 5: 2^4 = 16s
        assert_eq!(policy.next_delay(5), Duration::from_secs(16));
    }

    #[test]
    fn test_backoff_matches_formula_for_custom_base() {
        let base = Duration::from_millis(250);
        let policy = ReconnectPolicy::new(base, 5);
        for attempt in 1..=5u32 {
            assert_eq!(policy.next_delay(attempt), base * 2u32.pow(attempt - 1));
        }
    }

    #[test]
    fn test_should_retry_ceiling() {
        let policy = ReconnectPolicy::default();
        for attempt in 1..=5 {
            assert!(policy.should_retry(attempt));
        }
        assert!(!policy.should_retry(6));
    }

    #[test]
    fn test_max_delay_cap() {
        let policy = ReconnectPolicy::default().with_max_delay(Duration::from_secs(5));
        assert_eq!(policy.next_delay(3), Duration::from_secs(4));
        assert_eq!(policy.next_delay(4), Duration::from_secs(5));
        assert_eq!(policy.next_delay(5), Duration::from_secs(5));
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.next_delay(200), Duration::from_secs(1 << 31));
        assert_eq!(policy.next_delay(0), Duration::from_secs(1));
    }
}
