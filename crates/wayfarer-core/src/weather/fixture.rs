//! File-backed weather service for offline runs and tests.
//!
//! The fixture is a JSON object from location name to a list of
//! snapshots:
//!
//! ```json
//! { "Kyoto": [ { "condition": "Rain", "description": "light rain",
//!               "temperatureC": 17, "windSpeedKmh": 9,
//!               "observedAt": "2026-05-01T09:00:00Z" } ] }
//! ```
//!
//! Risk and severity are always recomputed from the readings.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{WeatherService, WeatherSnapshot};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Default)]
pub struct FixtureWeather {
    by_location: HashMap<String, Vec<WeatherSnapshot>>,
}

impl FixtureWeather {
    pub fn new(entries: HashMap<String, Vec<WeatherSnapshot>>) -> Self {
        let by_location = entries
            .into_iter()
            .map(|(location, mut snapshots)| {
                snapshots.sort_by_key(|s| s.observed_at);
                let snapshots = snapshots.into_iter().map(WeatherSnapshot::assessed).collect();
                (normalize(&location), snapshots)
            })
            .collect();
        Self { by_location }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, Vec<WeatherSnapshot>> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn snapshots(&self, location: &str) -> Result<&[WeatherSnapshot]> {
        self.by_location
            .get(&normalize(location))
            .filter(|snapshots| !snapshots.is_empty())
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::upstream("weather", format!("no weather data for '{location}'")))
    }
}

fn normalize(location: &str) -> String {
    location.trim().to_lowercase()
}

#[async_trait]
impl WeatherService for FixtureWeather {
    async fn severity(&self, location: &str, at: DateTime<Utc>) -> Result<WeatherSnapshot> {
        let snapshots = self.snapshots(location)?;
        // Undated entries only win when nothing is dated.
        let nearest = snapshots
            .iter()
            .min_by_key(|s| match s.observed_at {
                Some(observed) => (0, (observed - at).num_seconds().unsigned_abs()),
                None => (1, 0),
            })
            .cloned();
        nearest.ok_or_else(|| CoreError::upstream("weather", format!("no weather data for '{location}'")))
    }

    async fn forecast(&self, location: &str) -> Result<Vec<WeatherSnapshot>> {
        Ok(self.snapshots(location)?.to_vec())
    }
}
