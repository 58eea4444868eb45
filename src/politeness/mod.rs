//! Politeness controls: robots.txt rules and per-site rate limiting

mod limiter;
mod robots;

pub use limiter::RateLimiter;
pub use robots::{RobotsCache, RobotsPolicy};
