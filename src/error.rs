//! Error types for the lookup client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Ipinfo Error Enum ==
/// Unified error type for the lookup client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IpinfoError {
    /// Address literal could not be parsed as IPv4 or IPv6
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Upstream quota exhausted (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other network or payload failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid construction parameters
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller input rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IpinfoError {
    /// Returns true for upstream quota errors.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, IpinfoError::RateLimited(_))
    }
}

impl From<reqwest::Error> for IpinfoError {
    fn from(err: reqwest::Error) -> Self {
        IpinfoError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for IpinfoError {
    fn from(err: serde_json::Error) -> Self {
        IpinfoError::Transport(format!("malformed payload: {}", err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the lookup client.
pub type Result<T> = std::result::Result<T, IpinfoError>;
