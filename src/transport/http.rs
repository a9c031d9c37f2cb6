//! HTTP transport backed by reqwest.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{Transport, RATE_LIMIT_MESSAGE};
use crate::config::Config;
use crate::error::{IpinfoError, Result};

const USER_AGENT: &str = concat!("IPinfoClient/Rust/", env!("CARGO_PKG_VERSION"));

// == HTTP Transport ==
/// Talks to the upstream over HTTPS.
///
/// - `GET /<address>` (or `GET /` for the caller's own address)
/// - `POST /batch?token=<token>` with a JSON array of keys
/// - `POST /tools/map?cli=1` with `{"ips": [...]}`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    batch_timeout: Duration,
}

impl HttpTransport {
    /// Builds a transport from the client configuration.
    ///
    /// # Errors
    /// `Configuration` if the base URL or access token is unusable.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            IpinfoError::Configuration(format!("invalid base URL {:?}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(IpinfoError::Configuration(format!(
                "base URL {:?} cannot carry a path",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                IpinfoError::Configuration("access token contains invalid characters".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()
            .map_err(|e| IpinfoError::Configuration(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            batch_timeout: Duration::from_secs(config.batch_timeout),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, address: Option<&str>) -> Result<Value> {
        let url = match address {
            Some(address) => self.endpoint(&[address]),
            None => self.base_url.clone(),
        };
        debug!(%url, "fetching details");

        let response = self.client.get(url).send().await?;
        read_json(response).await
    }

    async fn fetch_batch(&self, keys: &[String], token: &str) -> Result<HashMap<String, Value>> {
        let mut url = self.endpoint(&["batch"]);
        url.query_pairs_mut().append_pair("token", token);
        debug!(keys = keys.len(), "posting batch");

        let response = self
            .client
            .post(url)
            .timeout(self.batch_timeout)
            .json(keys)
            .send()
            .await?;
        read_json(response).await
    }

    async fn create_map(&self, ips: &[String]) -> Result<Value> {
        let mut url = self.endpoint(&["tools", "map"]);
        url.query_pairs_mut().append_pair("cli", "1");

        let response = self
            .client
            .post(url)
            .json(&json!({ "ips": ips }))
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("upstream rate limit reached");
        return Err(IpinfoError::RateLimited(RATE_LIMIT_MESSAGE.to_string()));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(IpinfoError::Transport(format!(
            "upstream returned {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
