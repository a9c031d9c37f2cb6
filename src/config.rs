//! Configuration Module
//!
//! Handles loading and validating client configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{IpinfoError, Result};

// == Defaults ==
/// Default maximum number of cached responses
pub const DEFAULT_CACHE_MAXSIZE: usize = 4096;
/// Default cache TTL in seconds (one day)
pub const DEFAULT_CACHE_TTL: u64 = 60 * 60 * 24;
/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://ipinfo.io";
/// Default timeout for single requests in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;
/// Default timeout for batch requests in seconds
pub const DEFAULT_BATCH_TIMEOUT: u64 = 5;
/// Default number of keys per batch request
pub const DEFAULT_BATCH_CHUNK_SIZE: usize = 1000;

/// Locations of the static reference tables used for enrichment.
///
/// An unset path leaves the corresponding table empty.
#[derive(Debug, Clone, Default)]
pub struct ReferencePaths {
    /// Country code to country name
    pub countries: Option<PathBuf>,
    /// List of EU member country codes
    pub eu_countries: Option<PathBuf>,
    /// Country code to flag emoji/unicode
    pub flags: Option<PathBuf>,
    /// Country code to currency code/symbol
    pub currencies: Option<PathBuf>,
    /// Country code to continent code/name
    pub continents: Option<PathBuf>,
}

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// API access token, sent as a bearer token
    pub access_token: Option<String>,
    /// Upstream base URL
    pub base_url: String,
    /// Maximum number of entries the response cache can hold
    pub max_size: usize,
    /// Cache TTL in seconds
    pub ttl: u64,
    /// Timeout for single lookups in seconds
    pub request_timeout: u64,
    /// Timeout for each batch request in seconds
    pub batch_timeout: u64,
    /// Number of keys sent per batch request
    pub batch_chunk_size: usize,
    /// Reference table locations
    pub reference: ReferencePaths,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `IPINFO_TOKEN` - Access token (default: none)
    /// - `IPINFO_BASE_URL` - Upstream base URL (default: https://ipinfo.io)
    /// - `IPINFO_CACHE_MAXSIZE` - Maximum cache entries (default: 4096)
    /// - `IPINFO_CACHE_TTL` - Cache TTL in seconds, non-negative (default: 86400)
    /// - `IPINFO_TIMEOUT` - Single request timeout in seconds (default: 10)
    /// - `IPINFO_BATCH_TIMEOUT` - Batch request timeout in seconds (default: 5)
    /// - `IPINFO_BATCH_CHUNK_SIZE` - Keys per batch request (default: 1000)
    /// - `IPINFO_COUNTRIES_FILE`, `IPINFO_EU_COUNTRIES_FILE`, `IPINFO_FLAGS_FILE`,
    ///   `IPINFO_CURRENCIES_FILE`, `IPINFO_CONTINENTS_FILE` - Reference tables
    ///
    /// Unset variables fall back to their defaults. A variable that is set but
    /// cannot be parsed is a configuration error.
    pub fn from_env() -> Result<Self> {
        let ttl: i64 = parse_var("IPINFO_CACHE_TTL", DEFAULT_CACHE_TTL as i64)?;
        if ttl < 0 {
            return Err(IpinfoError::Configuration(format!(
                "IPINFO_CACHE_TTL must be non-negative, got {}",
                ttl
            )));
        }

        let config = Self {
            access_token: env::var("IPINFO_TOKEN").ok().filter(|v| !v.is_empty()),
            base_url: env::var("IPINFO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            max_size: parse_var("IPINFO_CACHE_MAXSIZE", DEFAULT_CACHE_MAXSIZE)?,
            ttl: ttl as u64,
            request_timeout: parse_var("IPINFO_TIMEOUT", DEFAULT_REQUEST_TIMEOUT)?,
            batch_timeout: parse_var("IPINFO_BATCH_TIMEOUT", DEFAULT_BATCH_TIMEOUT)?,
            batch_chunk_size: parse_var("IPINFO_BATCH_CHUNK_SIZE", DEFAULT_BATCH_CHUNK_SIZE)?,
            reference: ReferencePaths {
                countries: path_var("IPINFO_COUNTRIES_FILE"),
                eu_countries: path_var("IPINFO_EU_COUNTRIES_FILE"),
                flags: path_var("IPINFO_FLAGS_FILE"),
                currencies: path_var("IPINFO_CURRENCIES_FILE"),
                continents: path_var("IPINFO_CONTINENTS_FILE"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Sets the access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Checks invariants that cannot be expressed in the field types.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(IpinfoError::Configuration(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.batch_chunk_size == 0 {
            return Err(IpinfoError::Configuration(
                "batch_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout == 0 {
            return Err(IpinfoError::Configuration(
                "request_timeout must be greater than zero".to_string(),
            ));
        }
        if self.batch_timeout == 0 {
            return Err(IpinfoError::Configuration(
                "batch_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_size: DEFAULT_CACHE_MAXSIZE,
            ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            batch_chunk_size: DEFAULT_BATCH_CHUNK_SIZE,
            reference: ReferencePaths::default(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            IpinfoError::Configuration(format!("{} has an invalid value: {:?}", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}
