use std::time::Duration;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

/// Courtesy spacing between requests to the same upstream host.
///
/// Token bucket with burst 1 keyed by host: the first request to a host goes
/// out immediately, every following one waits until `period` has elapsed
/// since the previous permit. Distinct hosts don't wait on each other.
pub struct HostRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    period: Duration,
}

impl HostRateLimiter {
    /// Returns `None` for a zero period.
    pub fn new(period: Duration) -> Option<Self> {
        let quota = Quota::with_period(period)?;
        Some(Self {
            limiter: RateLimiter::keyed(quota),
            period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub async fn until_ready(&self, host: &str) {
        self.limiter.until_key_ready(&host.to_string()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_zero_period_is_rejected() {
        assert!(HostRateLimiter::new(Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn test_same_host_is_spaced() {
        let period = Duration::from_millis(100);
        let limiter = HostRateLimiter::new(period).unwrap();

        let start = Instant::now();
        limiter.until_ready("boards-api.greenhouse.io").await;
        limiter.until_ready("boards-api.greenhouse.io").await;
        limiter.until_ready("boards-api.greenhouse.io").await;

        assert!(
            start.elapsed() >= Duration::from_millis(190),
            "three permits took {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_distinct_hosts_do_not_wait_on_each_other() {
        let limiter = HostRateLimiter::new(Duration::from_secs(5)).unwrap();

        let start = Instant::now();
        limiter.until_ready("a.example").await;
        limiter.until_ready("b.example").await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
