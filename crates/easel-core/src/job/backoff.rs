//! Retry pacing for failed generation attempts.

use std::time::Duration;

/// Seconds before the first auto-retry.
const BASE_DELAY_SECS: f64 = 5.0;

/// Growth factor applied per additional retry.
const GROWTH: f64 = 1.1;

/// Delay in whole seconds before the `attempt`-th auto-retry.
///
/// `attempt` is 1-based: the first retry after the original submission
/// waits `ceil(5 x 1.1^0)` = 5 s, the fourth `ceil(5 x 1.1^3)` = 7 s.
pub fn delay_secs(attempt: u32) -> u64 {
    let exp = attempt.saturating_sub(1);
    (BASE_DELAY_SECS * GROWTH.powi(exp as i32)).ceil() as u64
}

/// Same as [`delay_secs`], as a `Duration`.
pub fn delay(attempt: u32) -> Duration {
    Duration::from_secs(delay_secs(attempt))
}

/// Retry behavior for a job chain.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Start a countdown automatically after each failed attempt.
    pub auto_retry: bool,

    /// Cap on automatic retries; `None` keeps retrying until cancelled.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            auto_retry: false,
            max_retries: None,
        }
    }
}

impl RetryPolicy {
    /// Whether an automatic retry may follow another failure after
    /// `attempts` retries have already been taken.
    pub fn allows_auto_retry(&self, attempts: u32) -> bool {
        self.auto_retry && self.max_retries.map_or(true, |max| attempts < max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_retry_waits_five_seconds() {
        assert_eq!(delay_secs(1), 5);
    }

    #[test]
    fn test_delay_grows_with_attempts() {
        // 5 x 1.1 = 5.5 -> 6; 5 x 1.21 = 6.05 -> 7; 5 x 1.331 = 6.655 -> 7
        assert_eq!(delay_secs(2), 6);
        assert_eq!(delay_secs(3), 7);
        assert_eq!(delay_secs(4), 7);
    }

    #[test]
    fn test_delay_keeps_growing() {
        // 5 x 1.1^9 = 11.79 -> 12
        assert_eq!(delay_secs(10), 12);
        assert!(delay_secs(30) > delay_secs(10));
    }

    #[test]
    fn test_delay_duration_matches_secs() {
        assert_eq!(delay(4), Duration::from_secs(7));
    }

    #[test]
    fn test_policy_disabled_never_allows() {
        let policy = RetryPolicy::default();
        assert!(!policy.allows_auto_retry(0));
    }

    #[test]
    fn test_policy_unbounded_always_allows() {
        let policy = RetryPolicy {
            auto_retry: true,
            max_retries: None,
        };
        assert!(policy.allows_auto_retry(0));
        assert!(policy.allows_auto_retry(1000));
    }

    #[test]
    fn test_policy_respects_max_retries() {
        let policy = RetryPolicy {
            auto_retry: true,
            max_retries: Some(3),
        };
        assert!(policy.allows_auto_retry(2));
        assert!(!policy.allows_auto_retry(3));
    }
}
