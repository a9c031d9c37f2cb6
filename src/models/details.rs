//! Lookup result models
//!
//! `LookupResult` is what the client produces before enrichment; `Details`
//! is the enriched view handed to callers.

use std::net::IpAddr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{IpinfoError, Result};
use crate::reference::{Continent, CountryCurrency, CountryFlag, ReferenceData};

/// Base URL of the country flag images.
///
/// `"PK"` becomes `https://cdn.ipinfo.io/static/images/countries-flags/PK.svg`.
pub const COUNTRY_FLAGS_URL: &str = "https://cdn.ipinfo.io/static/images/countries-flags/";

// == Lookup Result ==
/// Outcome of a single lookup, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    /// Address inside a reserved range, answered locally
    Bogon { ip: IpAddr },
    /// Upstream payload, from the cache or the network
    Resolved(Value),
}

impl LookupResult {
    pub fn is_bogon(&self) -> bool {
        matches!(self, LookupResult::Bogon { .. })
    }
}

// == Details ==
/// Enriched lookup response.
///
/// Well-known fields are lifted into typed members; every upstream field,
/// known or not, stays available through `all`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Details {
    pub ip: Option<String>,
    pub ip_address: Option<IpAddr>,
    pub bogon: bool,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub is_eu: bool,
    pub country_flag: Option<CountryFlag>,
    pub country_flag_url: Option<String>,
    pub country_currency: Option<CountryCurrency>,
    pub continent: Option<Continent>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    /// Raw upstream fields
    pub all: Map<String, Value>,
}

impl Details {
    /// Details for an address inside a reserved range.
    pub fn bogon(ip: IpAddr) -> Self {
        let mut all = Map::new();
        all.insert("ip".to_string(), Value::String(ip.to_string()));
        all.insert("bogon".to_string(), Value::Bool(true));

        Self {
            ip: Some(ip.to_string()),
            ip_address: Some(ip),
            bogon: true,
            ..Self::empty(all)
        }
    }

    /// Enriches a raw upstream payload with the reference tables.
    ///
    /// # Errors
    /// `Transport` if the payload is not a JSON object.
    pub fn from_payload(payload: Value, reference: &ReferenceData) -> Result<Self> {
        let all = match payload {
            Value::Object(all) => all,
            other => {
                return Err(IpinfoError::Transport(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        let mut details = Self::empty(all);
        details.ip = details.field("ip").map(str::to_string);
        details.ip_address = details.ip.as_deref().and_then(|ip| ip.parse().ok());
        details.bogon = details.all.get("bogon").and_then(Value::as_bool).unwrap_or(false);

        if let Some(country) = details.field("country").map(str::to_string) {
            details.country_name = reference.country_name(&country).map(str::to_string);
            details.is_eu = reference.is_eu(&country);
            details.country_flag = reference.flags.get(&country).cloned();
            details.country_currency = reference.currencies.get(&country).cloned();
            details.continent = reference.continents.get(&country).cloned();
            details.country_flag_url = Some(format!("{}{}.svg", COUNTRY_FLAGS_URL, country));
            details.country = Some(country);
        }

        let coordinates = details
            .field("loc")
            .and_then(|loc| loc.split_once(','))
            .map(|(lat, lon)| (lat.trim().to_string(), lon.trim().to_string()));
        if let Some((lat, lon)) = coordinates {
            details.latitude = Some(lat);
            details.longitude = Some(lon);
        }

        Ok(details)
    }

    fn empty(all: Map<String, Value>) -> Self {
        Self {
            ip: None,
            ip_address: None,
            bogon: false,
            country: None,
            country_name: None,
            is_eu: false,
            country_flag: None,
            country_flag_url: None,
            country_currency: None,
            continent: None,
            latitude: None,
            longitude: None,
            all,
        }
    }

    /// Returns a raw upstream field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.all.get(name)
    }

    /// Returns a raw upstream field if it is a string.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.all.get(name).and_then(Value::as_str)
    }

    pub fn hostname(&self) -> Option<&str> {
        self.field("hostname")
    }

    pub fn city(&self) -> Option<&str> {
        self.field("city")
    }

    pub fn region(&self) -> Option<&str> {
        self.field("region")
    }

    pub fn org(&self) -> Option<&str> {
        self.field("org")
    }

    pub fn postal(&self) -> Option<&str> {
        self.field("postal")
    }

    pub fn timezone(&self) -> Option<&str> {
        self.field("timezone")
    }
}
