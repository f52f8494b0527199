//! Country and city reference data behind a TTL cache.
//!
//! [`FixtureGeo`] serves the data from a JSON file:
//!
//! ```json
//! { "countries": [ { "name": "Japan", "code": "JP", "flag": "🇯🇵" } ],
//!   "cities": { "Japan": ["Kyoto", "Osaka"] } }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::{TtlCache, DEFAULT_REFERENCE_TTL_SECS};
use crate::error::{CoreError, Result};
use crate::storage::CacheConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    /// ISO 3166-1 alpha-2.
    pub code: String,
    #[serde(default)]
    pub flag: String,
}

/// Upstream for reference data. Failures are reported as
/// [`CoreError::UpstreamUnavailable`](crate::CoreError::UpstreamUnavailable).
#[async_trait]
pub trait GeoSource: Send + Sync {
    async fn countries(&self) -> Result<Vec<Country>>;

    async fn cities(&self, country: &str) -> Result<Vec<String>>;
}

/// File-backed reference data. Cities are looked up by country name or
/// code, ignoring case; an unknown country has no cities.
#[derive(Debug, Clone, Default)]
pub struct FixtureGeo {
    countries: Vec<Country>,
    cities: HashMap<String, Vec<String>>,
}

#[derive(Deserialize)]
struct GeoFixtureFile {
    #[serde(default)]
    countries: Vec<Country>,
    #[serde(default)]
    cities: HashMap<String, Vec<String>>,
}

impl FixtureGeo {
    pub fn new(countries: Vec<Country>, cities: HashMap<String, Vec<String>>) -> Self {
        let cities = cities.into_iter().map(|(country, list)| (normalize(&country), list)).collect();
        Self { countries, cities }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: GeoFixtureFile = serde_json::from_str(json)?;
        Ok(Self::new(file.countries, file.cities))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

fn normalize(country: &str) -> String {
    country.trim().to_lowercase()
}

#[async_trait]
impl GeoSource for FixtureGeo {
    async fn countries(&self) -> Result<Vec<Country>> {
        Ok(self.countries.clone())
    }

    async fn cities(&self, country: &str) -> Result<Vec<String>> {
        let key = normalize(country);
        // Fall back from a code to the country's name.
        let by_code = || {
            self.countries
                .iter()
                .find(|c| c.code.eq_ignore_ascii_case(country.trim()))
                .and_then(|c| self.cities.get(&normalize(&c.name)))
        };
        Ok(self.cities.get(&key).or_else(by_code).cloned().unwrap_or_default())
    }
}

pub struct GeoDirectory {
    source: Arc<dyn GeoSource>,
    countries: TtlCache<Vec<Country>>,
    cities: TtlCache<Vec<String>>,
}

impl GeoDirectory {
    pub fn new(source: Arc<dyn GeoSource>) -> Self {
        Self::with_ttl(source, DEFAULT_REFERENCE_TTL_SECS)
    }

    pub fn with_ttl(source: Arc<dyn GeoSource>, ttl_secs: u64) -> Self {
        Self::with_caches(source, TtlCache::new("geo", ttl_secs), TtlCache::new("geo", ttl_secs))
    }

    /// Caches live for `cache.reference_ttl_secs`.
    pub fn from_config(source: Arc<dyn GeoSource>, config: &CacheConfig) -> Self {
        Self::with_ttl(source, config.reference_ttl_secs)
    }

    pub fn with_caches(
        source: Arc<dyn GeoSource>,
        countries: TtlCache<Vec<Country>>,
        cities: TtlCache<Vec<String>>,
    ) -> Self {
        Self {
            source,
            countries,
            cities,
        }
    }

    /// All countries, sorted by name.
    pub async fn countries(&self, now: DateTime<Utc>) -> Result<Vec<Country>> {
        self.countries
            .get_or_try_insert_with("countries", now, || async {
                debug!("loading countries from source");
                let mut countries = self.source.countries().await?;
                countries.sort_by(|a, b| a.name.cmp(&b.name));
                Ok::<_, CoreError>(countries)
            })
            .await
    }

    pub async fn cities(&self, country: &str, now: DateTime<Utc>) -> Result<Vec<String>> {
        let key = format!("cities-{country}");
        self.cities
            .get_or_try_insert_with(&key, now, || async {
                debug!(%country, "loading cities from source");
                self.source.cities(country).await
            })
            .await
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        self.countries.purge_expired(now) + self.cities.purge_expired(now)
    }
}
