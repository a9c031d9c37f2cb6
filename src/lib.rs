//! IPinfo lookup client
//!
//! Resolves IP addresses to geolocation details with a bounded TTL response
//! cache, local bogon detection and batched lookups.
//!
//! ```ignore
//! let client = IpinfoClient::new(Config::from_env()?)?;
//! let details = client.details(Some("8.8.8.8")).await?;
//! println!("{:?} {:?}", details.city(), details.country_name);
//! ```

pub mod bogon;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod reference;
pub mod tasks;
pub mod transport;

pub use cache::{BoundedExpiringCache, ResponseCache};
pub use client::{cache_key, IpinfoClient, IpinfoClientBuilder};
pub use config::Config;
pub use error::{IpinfoError, Result};
pub use models::{BatchEntry, BatchResponse, Details, LookupResult};
pub use reference::ReferenceData;
pub use tasks::spawn_cleanup_task;
pub use transport::{HttpTransport, Transport};
