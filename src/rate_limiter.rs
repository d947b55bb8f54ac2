//! Client-side rate limiter.
//!
//! Token bucket pacing for callers that want to stay under the API's limits
//! instead of reacting to 429 responses. Attaching one to a client is
//! optional: it delays the send of each dispatch and has no effect on the
//! per-call retry state machine, which stays independent per dispatch.
//!
//! # Example
//!
//! ```rust
//! use discord_rest::rate_limiter::{RateLimiter, RateLimiterConfig};
//! use std::time::Duration;
//!
//! # async fn example() {
//! // 50 requests per second
//! let limiter = RateLimiter::new(RateLimiterConfig::new(50, Duration::from_secs(1)));
//! limiter.wait().await;
//! // send the request here
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of tokens (requests) in the bucket.
    pub capacity: u32,
    /// Time window for refilling tokens.
    pub refill_period: Duration,
    /// Tokens restored per period (defaults to `capacity`).
    pub refill_amount: u32,
}

impl RateLimiterConfig {
    /// Creates a configuration allowing `capacity` requests per
    /// `refill_period`.
    pub fn new(capacity: u32, refill_period: Duration) -> Self {
        Self {
            capacity,
            refill_period,
            refill_amount: capacity,
        }
    }

    /// Sets a refill amount different from the capacity.
    pub fn with_refill_amount(mut self, amount: u32) -> Self {
        self.refill_amount = amount;
        self
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        // 10 requests per second
        Self::new(10, Duration::from_secs(1))
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    last_refill: Instant,
    config: RateLimiterConfig,
}

impl BucketState {
    fn new(config: RateLimiterConfig) -> Self {
        Self {
            tokens: config.capacity,
            last_refill: Instant::now(),
            config,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);

        if elapsed >= self.config.refill_period {
            let periods = elapsed.as_secs_f64() / self.config.refill_period.as_secs_f64();
            #[allow(clippy::cast_possible_truncation)]
            #[allow(clippy::cast_sign_loss)]
            let tokens_to_add = (periods * f64::from(self.config.refill_amount)) as u32;
            self.tokens = (self.tokens.saturating_add(tokens_to_add)).min(self.config.capacity);
            self.last_refill = now;
        }
    }

    fn try_consume(&mut self, cost: u32) -> bool {
        self.refill();
        if self.tokens >= cost {
            self.tokens -= cost;
            true
        } else {
            false
        }
    }

    fn wait_time(&self, cost: u32) -> Duration {
        if self.tokens >= cost {
            return Duration::ZERO;
        }
        let tokens_needed = cost - self.tokens;
        let refill_rate =
            f64::from(self.config.refill_amount) / self.config.refill_period.as_secs_f64();
        Duration::from_secs_f64(f64::from(tokens_needed) / refill_rate)
    }
}

/// Token-bucket rate limiter, cheap to clone and share across tasks.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<BucketState>>,
}

impl RateLimiter {
    /// Creates a rate limiter with the given configuration.
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(BucketState::new(config))),
        }
    }

    /// Waits until one request may proceed.
    pub async fn wait(&self) {
        self.wait_with_cost(1).await;
    }

    /// Waits until a request costing `cost` tokens may proceed.
    pub async fn wait_with_cost(&self, cost: u32) {
        loop {
            let wait_duration = {
                let mut state = self.state.lock().await;
                if state.try_consume(cost) {
                    return;
                }
                state.wait_time(cost)
            };

            if wait_duration > Duration::ZERO {
                sleep(wait_duration).await;
            } else {
                // avoid busy-waiting when the bucket is contended
                sleep(Duration::from_millis(10)).await;
            }
        }
    }

    /// Attempts to consume one token without waiting.
    ///
    /// Returns `false` when the request would be rate limited.
    pub async fn try_acquire(&self) -> bool {
        self.state.lock().await.try_consume(1)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}
