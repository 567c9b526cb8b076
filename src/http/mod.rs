//! HTTP client module
//!
//! Provides the HTTP client the Trello wrapper is built on.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **429 Handling**: Honors `Retry-After` before surfacing a rate-limit error

mod client;
mod rate_limit;

pub use client::{BackoffType, HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
