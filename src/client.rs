//! Lookup Client Module
//!
//! Orchestrates a lookup: bogon check first, then the response cache, then
//! the transport. Also provides batched lookups and the map tool.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::bogon;
use crate::cache::{BoundedExpiringCache, ResponseCache};
use crate::config::Config;
use crate::error::{IpinfoError, Result};
use crate::models::{BatchEntry, BatchResponse, Details, LookupResult};
use crate::reference::ReferenceData;
use crate::transport::{HttpTransport, Transport};

/// Version prefix of every cache key.
pub const CACHE_KEY_VERSION: &str = "1";

/// Most addresses accepted by the map tool in one call.
pub const MAX_MAP_IPS: usize = 500_000;

/// Failure reported for a batch key the upstream did not answer.
pub const MISSING_BATCH_RESULT: &str = "no result returned";

/// Builds the cache key for a lookup subject.
///
/// Self-lookups (`None`) share the sentinel key `"1:"`.
pub fn cache_key(subject: Option<&str>) -> String {
    format!("{}:{}", CACHE_KEY_VERSION, subject.unwrap_or(""))
}

// == Client Builder ==
/// Assembles an [`IpinfoClient`], filling anything not injected from the config.
pub struct IpinfoClientBuilder {
    config: Config,
    cache: Option<Arc<dyn ResponseCache>>,
    transport: Option<Arc<dyn Transport>>,
    reference: Option<ReferenceData>,
}

impl IpinfoClientBuilder {
    /// Uses `cache` instead of a `BoundedExpiringCache` sized from the config.
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Uses `transport` instead of an `HttpTransport`.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses preloaded reference tables instead of the configured files.
    pub fn reference(mut self, reference: ReferenceData) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// # Errors
    /// `Configuration` for invalid sizes, an unusable base URL or token, or
    /// unreadable reference files.
    pub fn build(self) -> Result<IpinfoClient> {
        self.config.validate()?;

        let cache = match self.cache {
            Some(cache) => cache,
            None => Arc::new(BoundedExpiringCache::<Value>::from_config(&self.config)?),
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.config)?),
        };
        let reference = match self.reference {
            Some(reference) => reference,
            None => ReferenceData::load(&self.config.reference)?,
        };

        info!(
            max_size = self.config.max_size,
            ttl = self.config.ttl,
            "lookup client ready"
        );

        Ok(IpinfoClient {
            cache,
            transport,
            reference: Arc::new(reference),
            batch_chunk_size: self.config.batch_chunk_size,
        })
    }
}

// == Lookup Client ==
/// Resolves addresses to details, short-circuiting bogons and caching
/// upstream responses.
///
/// Cheap to clone; clones share the cache, transport and reference tables.
#[derive(Clone)]
pub struct IpinfoClient {
    cache: Arc<dyn ResponseCache>,
    transport: Arc<dyn Transport>,
    reference: Arc<ReferenceData>,
    batch_chunk_size: usize,
}

impl IpinfoClient {
    /// Builds a client with every collaborator derived from `config`.
    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> IpinfoClientBuilder {
        IpinfoClientBuilder {
            config,
            cache: None,
            transport: None,
            reference: None,
        }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    // == Lookup ==
    /// Resolves one address, or the caller's own address when `ip` is `None`
    /// or empty. A blank but non-empty address is invalid.
    ///
    /// 1. A bogon address is answered locally. Neither the cache nor the
    ///    transport is touched.
    /// 2. A cached payload is returned unchanged.
    /// 3. Otherwise the transport is asked and a successful payload is cached.
    ///    Failures, rate limits included, are returned and never cached.
    ///
    /// # Errors
    /// `InvalidAddress` for a malformed literal; transport errors as reported.
    pub async fn lookup(&self, ip: Option<&str>) -> Result<LookupResult> {
        let ip = ip.filter(|ip| !ip.is_empty());

        if let Some(address) = ip {
            let parsed = bogon::parse_address(address)?;
            if bogon::is_reserved(parsed) {
                debug!(ip = address, "bogon address answered locally");
                return Ok(LookupResult::Bogon { ip: parsed });
            }
        }
        let ip = ip.map(str::trim);

        let key = cache_key(ip);
        if let Some(payload) = self.cache.get(&key) {
            debug!(key = %key, "cache hit");
            return Ok(LookupResult::Resolved(payload));
        }

        debug!(key = %key, "cache miss");
        let payload = self.transport.fetch(ip).await.inspect_err(|e| {
            if e.is_rate_limited() {
                warn!(key = %key, "lookup rate limited");
            }
        })?;

        self.cache.set(&key, payload.clone());
        Ok(LookupResult::Resolved(payload))
    }

    // == Details ==
    /// Looks up an address and enriches the result with the reference tables.
    pub async fn details(&self, ip: Option<&str>) -> Result<Details> {
        match self.lookup(ip).await? {
            LookupResult::Bogon { ip } => Ok(Details::bogon(ip)),
            LookupResult::Resolved(payload) => Details::from_payload(payload, &self.reference),
        }
    }

    // == Batch ==
    /// Looks up many keys, sending only cache misses upstream.
    ///
    /// Misses are deduplicated and sent in chunks of the configured size, one
    /// request per chunk, in order. Each returned key is cached individually.
    /// Keys the upstream answered with an error object, or left out of its
    /// answer, are reported as [`BatchEntry::Failed`] and not cached.
    ///
    /// # Errors
    /// The first failing chunk (a rate limit or any transport error) stops the
    /// remaining chunks and fails the whole call. Results already merged are
    /// discarded, so a successful return has an entry for every requested key.
    pub async fn batch_requests(&self, keys: &[String], token: &str) -> Result<BatchResponse> {
        let mut response = BatchResponse::new();
        let mut misses: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();

        for key in keys {
            if !seen.insert(key.as_str()) {
                continue;
            }
            match self.cache.get(&cache_key(Some(key.as_str()))) {
                Some(payload) => response.insert(key.clone(), BatchEntry::Found(payload)),
                None => misses.push(key.clone()),
            }
        }

        if misses.is_empty() {
            debug!(hits = response.len(), "batch served from cache");
            return Ok(response);
        }

        let chunks = misses.len().div_ceil(self.batch_chunk_size);
        info!(
            hits = response.len(),
            misses = misses.len(),
            chunks,
            "sending batch lookup"
        );

        for (index, chunk) in misses.chunks(self.batch_chunk_size).enumerate() {
            let mut data = self
                .transport
                .fetch_batch(chunk, token)
                .await
                .inspect_err(|e| {
                    warn!(
                        chunk = index + 1,
                        chunks,
                        error = %e,
                        "batch lookup aborted"
                    );
                })?;

            for key in chunk {
                let entry = match data.remove(key) {
                    Some(value) => BatchEntry::from_upstream(value),
                    None => {
                        warn!(key = %key, "batch key missing from upstream answer");
                        BatchEntry::Failed(MISSING_BATCH_RESULT.to_string())
                    }
                };
                if let BatchEntry::Found(payload) = &entry {
                    self.cache.set(&cache_key(Some(key.as_str())), payload.clone());
                }
                response.insert(key.clone(), entry);
            }
            if !data.is_empty() {
                debug!(extra = data.len(), "ignoring unrequested batch keys");
            }
        }

        Ok(response)
    }

    // == Map ==
    /// Submits addresses to the map tool and returns the report URL.
    ///
    /// # Errors
    /// `InvalidInput` for more than 500,000 addresses, before any request.
    pub async fn get_map_url(&self, ips: &[String]) -> Result<String> {
        if ips.len() > MAX_MAP_IPS {
            return Err(IpinfoError::InvalidInput(
                "No more than 500,000 ips allowed!".to_string(),
            ));
        }

        let response = self.transport.create_map(ips).await?;
        response
            .get("reportUrl")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| IpinfoError::Transport("map response has no reportUrl".to_string()))
    }
}
