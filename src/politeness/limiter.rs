//! Per-site request rate limiting
//!
//! Every site gets an independent token bucket, so a slow site never
//! throttles the rest of the crawl. The effective interval between requests
//! is the configured minimum, raised by a robots.txt crawl-delay up to a
//! configured cap.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{self, Instant};

/// Token bucket tracking one site's request budget
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, now: Instant) -> Self {
        let capacity = f64::from(capacity.max(1));
        Self {
            // Starts full so the first request goes out immediately.
            tokens: capacity,
            capacity,
            last_refill: now,
        }
    }

    /// Refills by elapsed time and takes a token, or reports how long to wait.
    fn try_take(&mut self, interval: Duration, now: Instant) -> Result<(), Duration> {
        let rate = 1.0 / interval.as_secs_f64();
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * rate).min(self.capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / rate))
        }
    }
}

/// Per-site token bucket rate limiter
pub struct RateLimiter {
    min_interval: Duration,
    max_interval: Duration,
    burst: u32,
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    /// Creates a limiter.
    ///
    /// # Arguments
    /// * `min_interval` - Minimum spacing between requests to one site
    /// * `burst` - Number of requests allowed before spacing kicks in
    /// * `max_interval` - Cap applied to robots.txt crawl-delays
    pub fn new(min_interval: Duration, burst: u32, max_interval: Duration) -> Self {
        Self {
            min_interval,
            max_interval: max_interval.max(min_interval),
            burst,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Waits until a request to `site` is permitted.
    ///
    /// # Arguments
    /// * `site` - Authority (host and optional port) the request targets
    /// * `crawl_delay` - Crawl-delay advertised by the site's robots.txt
    pub async fn acquire(&self, site: &str, crawl_delay: Option<Duration>) {
        let interval = self.effective_interval(crawl_delay);
        if interval.is_zero() {
            return;
        }

        loop {
            let wait = {
                let now = Instant::now();
                let mut buckets = self.buckets.lock().await;
                let bucket = buckets
                    .entry(site.to_string())
                    .or_insert_with(|| TokenBucket::new(self.burst, now));
                bucket.try_take(interval, now)
            };

            match wait {
                Ok(()) => return,
                // Another task may take the refilled token first, so re-check
                // after sleeping instead of assuming it is ours.
                Err(delay) => time::sleep(delay).await,
            }
        }
    }

    /// Interval actually enforced for a site: the configured minimum, raised
    /// by the site's crawl-delay but never above the configured cap.
    fn effective_interval(&self, crawl_delay: Option<Duration>) -> Duration {
        match crawl_delay {
            Some(delay) => delay.clamp(self.min_interval, self.max_interval),
            None => self.min_interval,
        }
    }
}
