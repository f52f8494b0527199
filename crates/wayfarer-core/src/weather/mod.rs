//! Weather observations, risk assessment and the weather collaborator.
//!
//! - [`assess_risk`]: fixed-threshold risk rules for one observation
//! - [`WeatherService`]: async source of current and forecast snapshots
//! - [`forecast_note_for_day`]: forecast digest embedded in chat prompts

pub mod fixture;
pub mod forecast;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

pub use fixture::FixtureWeather;
pub use forecast::{forecast_digest, forecast_note_for_day, FORECAST_UNAVAILABLE_NOTE, PROJECTED_PREFIX};

/// Temperature (°C) above which heat is a risk.
pub const HEAT_THRESHOLD_C: f64 = 34.0;
/// Temperature (°C) below which cold is a risk.
pub const COLD_THRESHOLD_C: f64 = 4.0;
/// Wind speed (km/h) above which wind is a risk.
pub const WIND_THRESHOLD_KMH: f64 = 40.0;

/// Main weather condition group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Clear,
    Clouds,
    Mist,
    Smoke,
    Haze,
    Dust,
    Fog,
    Sand,
    Ash,
    Squall,
    Tornado,
    #[serde(other)]
    Other,
}

impl WeatherCondition {
    pub fn is_precipitation(&self) -> bool {
        matches!(self, Self::Rain | Self::Drizzle | Self::Thunderstorm)
    }

    pub fn is_extreme(&self) -> bool {
        matches!(self, Self::Tornado | Self::Squall | Self::Ash | Self::Sand | Self::Dust)
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Why an observation is considered severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskKind {
    #[serde(rename = "RISK_RAIN")]
    Rain,
    #[serde(rename = "RISK_HEAT")]
    Heat,
    #[serde(rename = "RISK_COLD")]
    Cold,
    #[serde(rename = "WIND_RISK")]
    Wind,
    #[serde(rename = "EXTREME")]
    Extreme,
}

impl RiskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rain => "RISK_RAIN",
            Self::Heat => "RISK_HEAT",
            Self::Cold => "RISK_COLD",
            Self::Wind => "WIND_RISK",
            Self::Extreme => "EXTREME",
        }
    }
}

impl fmt::Display for RiskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one observation. Rules are checked in order; snow on its own
/// is not a risk.
pub fn assess_risk(condition: WeatherCondition, temperature_c: f64, wind_speed_kmh: f64) -> Option<RiskKind> {
    if condition.is_precipitation() {
        Some(RiskKind::Rain)
    } else if temperature_c > HEAT_THRESHOLD_C {
        Some(RiskKind::Heat)
    } else if temperature_c < COLD_THRESHOLD_C {
        Some(RiskKind::Cold)
    } else if wind_speed_kmh > WIND_THRESHOLD_KMH {
        Some(RiskKind::Wind)
    } else if condition.is_extreme() {
        Some(RiskKind::Extreme)
    } else {
        None
    }
}

/// Audit severity level for a risk: "high", "medium" or "low".
pub fn severity_level(risk: Option<RiskKind>) -> &'static str {
    match risk {
        Some(RiskKind::Extreme) => "high",
        Some(_) => "medium",
        None => "low",
    }
}

/// One weather observation or forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub condition: WeatherCondition,
    #[serde(default)]
    pub description: String,
    pub temperature_c: f64,
    #[serde(default)]
    pub wind_speed_kmh: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub is_severe: bool,
    #[serde(default)]
    pub risk_kind: Option<RiskKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherSnapshot {
    /// Build a snapshot with risk and severity derived from the readings.
    pub fn observe(
        condition: WeatherCondition,
        description: impl Into<String>,
        temperature_c: f64,
        wind_speed_kmh: f64,
    ) -> Self {
        Self {
            condition,
            description: description.into(),
            temperature_c,
            wind_speed_kmh,
            humidity: 0.0,
            is_severe: false,
            risk_kind: None,
            observed_at: None,
        }
        .assessed()
    }

    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = humidity;
        self
    }

    pub fn at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = Some(observed_at);
        self
    }

    /// Recompute `risk_kind` and `is_severe` from the readings.
    pub fn assessed(mut self) -> Self {
        self.risk_kind = assess_risk(self.condition, self.temperature_c, self.wind_speed_kmh);
        self.is_severe = self.risk_kind.is_some();
        self
    }

    pub fn severity_level(&self) -> &'static str {
        severity_level(self.risk_kind)
    }
}

/// Source of weather data for a destination.
#[async_trait]
pub trait WeatherService: Send + Sync {
    /// Observation closest to `at` for `location`.
    async fn severity(&self, location: &str, at: DateTime<Utc>) -> Result<WeatherSnapshot>;

    /// Forecast entries for `location`, oldest first.
    async fn forecast(&self, location: &str) -> Result<Vec<WeatherSnapshot>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precipitation_wins_over_temperature() {
        let storm = WeatherSnapshot::observe(WeatherCondition::Thunderstorm, "storm", 38.0, 60.0);
        assert_eq!(storm.risk_kind, Some(RiskKind::Rain));
        assert!(storm.is_severe);
    }

    #[test]
    fn threshold_rules_in_order() {
        assert_eq!(assess_risk(WeatherCondition::Clear, 35.0, 50.0), Some(RiskKind::Heat));
        assert_eq!(assess_risk(WeatherCondition::Clear, 3.5, 50.0), Some(RiskKind::Cold));
        assert_eq!(assess_risk(WeatherCondition::Clouds, 20.0, 41.0), Some(RiskKind::Wind));
        assert_eq!(assess_risk(WeatherCondition::Dust, 20.0, 10.0), Some(RiskKind::Extreme));
        assert_eq!(assess_risk(WeatherCondition::Clear, 34.0, 40.0), None);
        assert_eq!(assess_risk(WeatherCondition::Snow, 4.0, 5.0), None);
    }

    #[test]
    fn severity_levels() {
        assert_eq!(severity_level(Some(RiskKind::Extreme)), "high");
        assert_eq!(severity_level(Some(RiskKind::Rain)), "medium");
        assert_eq!(severity_level(None), "low");
    }

    #[test]
    fn wire_format() {
        let snapshot = WeatherSnapshot::observe(WeatherCondition::Rain, "light rain", 18.0, 12.0);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["riskKind"], "RISK_RAIN");
        assert_eq!(json["temperatureC"], 18.0);
        assert_eq!(json["isSevere"], true);

        let parsed: WeatherSnapshot =
            serde_json::from_str(r#"{"condition":"Volcano","temperatureC":20}"#).unwrap();
        assert_eq!(parsed.condition, WeatherCondition::Other);
        assert!(!parsed.is_severe);
    }
}
