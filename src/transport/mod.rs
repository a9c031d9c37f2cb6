//! Transport Module
//!
//! The network seam of the client. Everything that talks to the upstream goes
//! through [`Transport`], so tests and embedders can substitute their own.

mod http;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use http::HttpTransport;

/// Message attached to `RateLimited` errors raised for HTTP 429.
pub const RATE_LIMIT_MESSAGE: &str =
    "To increase your limits, please review our paid plans at https://ipinfo.io/pricing";

/// Interface to the upstream lookup service.
///
/// Implementations report HTTP 429 as `RateLimited` and every other failure
/// (connection, timeout, status, malformed body) as `Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the payload for one address, or for the caller's own address
    /// when `address` is `None`.
    async fn fetch(&self, address: Option<&str>) -> Result<Value>;

    /// Fetches payloads for a group of keys in one request.
    ///
    /// Keys may be bare addresses or field paths such as `8.8.8.8/country`.
    async fn fetch_batch(&self, keys: &[String], token: &str) -> Result<HashMap<String, Value>>;

    /// Submits addresses to the map tool and returns its raw response.
    async fn create_map(&self, ips: &[String]) -> Result<Value>;
}
