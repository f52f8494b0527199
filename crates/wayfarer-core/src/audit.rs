//! Append-only record of observed signals and applied regenerations.
//!
//! Payloads stay minimal: the trigger data needed to explain a change,
//! never the full activity lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::adapt::TriggerKind;
use crate::itinerary::ActivityList;
use crate::mood::{EmotionLabel, MoodSnapshot};
use crate::weather::WeatherSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditKind {
    Weather,
    Mood,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Mood => "mood",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weather" => Some(Self::Weather),
            "mood" => Some(Self::Mood),
            _ => None,
        }
    }
}

impl From<TriggerKind> for AuditKind {
    fn from(kind: TriggerKind) -> Self {
        match kind {
            TriggerKind::Weather => AuditKind::Weather,
            TriggerKind::Mood => AuditKind::Mood,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub kind: AuditKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_plan_id: Option<String>,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    fn new(kind: AuditKind, trip_id: Option<&str>, day_plan_id: Option<&str>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            trip_id: trip_id.map(str::to_string),
            day_plan_id: day_plan_id.map(str::to_string),
            payload,
            applied_summary: None,
            created_at: Utc::now(),
        }
    }

    /// A weather observation for a day plan.
    pub fn weather_signal(trip_id: &str, day_plan_id: &str, snapshot: &WeatherSnapshot) -> Self {
        Self::new(
            AuditKind::Weather,
            Some(trip_id),
            Some(day_plan_id),
            json!({
                "condition": snapshot.condition,
                "temperatureC": snapshot.temperature_c,
                "riskKind": snapshot.risk_kind,
                "severity": snapshot.severity_level(),
                "observedAt": snapshot.observed_at,
            }),
        )
    }

    /// A mood report, with or without trip context.
    pub fn mood_signal(
        trip_id: Option<&str>,
        day_plan_id: Option<&str>,
        snapshot: &MoodSnapshot,
        emotion: EmotionLabel,
    ) -> Self {
        Self::new(
            AuditKind::Mood,
            trip_id,
            day_plan_id,
            json!({
                "metrics": snapshot,
                "inferredEmotion": emotion,
            }),
        )
    }

    /// A persisted regeneration.
    pub fn regeneration(
        kind: TriggerKind,
        trip_id: &str,
        day_plan_id: &str,
        trigger: Value,
        applied: &ActivityList,
    ) -> Self {
        let mut event = Self::new(kind.into(), Some(trip_id), Some(day_plan_id), trigger);
        event.applied_summary = Some(format!("Regenerated {} activities", applied.len()));
        event
    }
}
