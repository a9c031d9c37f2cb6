//! Reference Data Module
//!
//! Static per-country tables used to enrich lookup responses. Tables are read
//! once when the client is built and never refreshed.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ReferencePaths;
use crate::error::{IpinfoError, Result};

/// Flag glyphs for a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryFlag {
    pub emoji: String,
    pub unicode: String,
}

/// Currency used in a country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCurrency {
    pub code: String,
    pub symbol: String,
}

/// Continent a country belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continent {
    pub code: String,
    pub name: String,
}

// == Reference Data ==
/// Per-country lookup tables keyed by ISO 3166-1 alpha-2 code.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub countries: HashMap<String, String>,
    pub eu_countries: HashSet<String>,
    pub flags: HashMap<String, CountryFlag>,
    pub currencies: HashMap<String, CountryCurrency>,
    pub continents: HashMap<String, Continent>,
}

impl ReferenceData {
    /// Loads every configured table. Unset paths leave their table empty.
    ///
    /// # Errors
    /// `Configuration` if a configured file cannot be read or parsed.
    pub fn load(paths: &ReferencePaths) -> Result<Self> {
        Ok(Self {
            countries: load_table(paths.countries.as_deref())?,
            eu_countries: load_table(paths.eu_countries.as_deref())?,
            flags: load_table(paths.flags.as_deref())?,
            currencies: load_table(paths.currencies.as_deref())?,
            continents: load_table(paths.continents.as_deref())?,
        })
    }

    pub fn country_name(&self, code: &str) -> Option<&str> {
        self.countries.get(code).map(String::as_str)
    }

    pub fn is_eu(&self, code: &str) -> bool {
        self.eu_countries.contains(code)
    }
}

fn load_table<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };

    let raw = fs::read_to_string(path).map_err(|e| {
        IpinfoError::Configuration(format!("cannot read {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        IpinfoError::Configuration(format!("cannot parse {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn json_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_defaults_to_empty() {
        let data = ReferenceData::load(&ReferencePaths::default()).unwrap();
        assert!(data.countries.is_empty());
        assert!(!data.is_eu("DE"));
    }

    #[test]
    fn test_load_all_tables() {
        let countries = json_file(r#"{"DE": "Germany", "US": "United States"}"#);
        let eu = json_file(r#"["DE", "FR"]"#);
        let flags = json_file(r#"{"DE": {"emoji": "🇩🇪", "unicode": "U+1F1E9 U+1F1EA"}}"#);
        let currencies = json_file(r#"{"DE": {"code": "EUR", "symbol": "€"}}"#);
        let continents = json_file(r#"{"DE": {"code": "EU", "name": "Europe"}}"#);

        let paths = ReferencePaths {
            countries: Some(countries.path().to_path_buf()),
            eu_countries: Some(eu.path().to_path_buf()),
            flags: Some(flags.path().to_path_buf()),
            currencies: Some(currencies.path().to_path_buf()),
            continents: Some(continents.path().to_path_buf()),
        };
        let data = ReferenceData::load(&paths).unwrap();

        assert_eq!(data.country_name("US"), Some("United States"));
        assert!(data.is_eu("DE"));
        assert!(!data.is_eu("US"));
        assert_eq!(data.flags["DE"].emoji, "🇩🇪");
        assert_eq!(data.currencies["DE"].code, "EUR");
        assert_eq!(data.continents["DE"].name, "Europe");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let paths = ReferencePaths {
            countries: Some("/nonexistent/countries.json".into()),
            ..ReferencePaths::default()
        };
        assert!(matches!(
            ReferenceData::load(&paths),
            Err(IpinfoError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let eu = json_file(r#"{"DE": true}"#);
        let paths = ReferencePaths {
            eu_countries: Some(eu.path().to_path_buf()),
            ..ReferencePaths::default()
        };
        assert!(matches!(
            ReferenceData::load(&paths),
            Err(IpinfoError::Configuration(_))
        ));
    }
}
