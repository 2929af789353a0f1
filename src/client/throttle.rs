//! Per-client request spacing.
//!
//! Each client owns one `Throttle`; two clients never wait on each other.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Minimum-interval gate between the starts of outbound requests.
///
/// The check and the timestamp update happen under one lock, so
/// overlapping callers on the same client are spaced out as well.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    /// Start of the most recent request, `None` before the first one
    last_request: Mutex<Option<Instant>>,
    total_requests: AtomicU64,
    throttled_requests: AtomicU64,
    total_wait_ms: AtomicU64,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
            total_requests: AtomicU64::new(0),
            throttled_requests: AtomicU64::new(0),
            total_wait_ms: AtomicU64::new(0),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until `min_interval` has passed since the previous request,
    /// then mark now as the start of a new one.
    ///
    /// Returns the duration waited.
    pub async fn acquire(&self) -> Duration {
        let mut last = self.last_request.lock().await;

        let wait_time = last
            .as_ref()
            .map(|t| self.min_interval.saturating_sub(t.elapsed()))
            .unwrap_or(Duration::ZERO);

        if wait_time > Duration::ZERO {
            debug!(wait_ms = wait_time.as_millis() as u64, "Throttling request");
            self.throttled_requests.fetch_add(1, Ordering::Relaxed);
            self.total_wait_ms
                .fetch_add(wait_time.as_millis() as u64, Ordering::Relaxed);
            tokio::time::sleep(wait_time).await;
        }

        *last = Some(Instant::now());
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        wait_time
    }

    /// Get statistics.
    pub fn stats(&self) -> ThrottleStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let throttled_requests = self.throttled_requests.load(Ordering::Relaxed);
        let total_wait_ms = self.total_wait_ms.load(Ordering::Relaxed);

        ThrottleStats {
            total_requests,
            throttled_requests,
            total_wait_secs: total_wait_ms as f64 / 1000.0,
        }
    }
}

/// Throttle statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleStats {
    pub total_requests: u64,
    pub throttled_requests: u64,
    pub total_wait_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_does_not_wait() {
        let throttle = Throttle::new(Duration::from_millis(1000));
        let start = Instant::now();

        assert_eq!(throttle.acquire().await, Duration::ZERO);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_requests_are_spaced() {
        let throttle = Throttle::new(Duration::from_millis(1000));

        let first = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        let second = Instant::now();

        assert!(second - first >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_only_the_remainder() {
        let throttle = Throttle::new(Duration::from_millis(1000));
        throttle.acquire().await;

        tokio::time::advance(Duration::from_millis(600)).await;
        let waited = throttle.acquire().await;
        assert_eq!(waited, Duration::from_millis(400));

        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(throttle.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_instances_are_independent() {
        let a = Throttle::new(Duration::from_millis(1000));
        let b = Throttle::new(Duration::from_millis(1000));

        a.acquire().await;
        assert_eq!(b.acquire().await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_serialized() {
        let throttle = Arc::new(Throttle::new(Duration::from_millis(1000)));
        let start = Instant::now();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                tokio::spawn(async move {
                    throttle.acquire().await;
                    Instant::now()
                })
            })
            .collect();

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap());
        }
        starts.sort();

        assert_eq!(starts[0] - start, Duration::ZERO);
        assert!(starts[1] - starts[0] >= Duration::from_millis(1000));
        assert!(starts[2] - starts[1] >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats() {
        let throttle = Throttle::new(Duration::from_millis(500));
        throttle.acquire().await;
        throttle.acquire().await;

        let stats = throttle.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.throttled_requests, 1);
        assert_eq!(stats.total_wait_secs, 0.5);
    }
}
