//! HTTP client module
//!
//! GET-JSON client used by remote candidate sources, with bearer auth,
//! retry backoff and a `governor` token bucket.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
