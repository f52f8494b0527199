//! Everything one regeneration needs besides the stored day plan.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::trigger::TriggerKind;
use crate::itinerary::NeighborSummaries;
use crate::mood::{EmotionLabel, MoodSnapshot};
use crate::weather::WeatherSnapshot;

/// Emotion label recorded for chat requests, which carry no inferred mood.
pub const USER_REQUEST_EMOTION: &str = "user_request";

/// Mood-template input. An absent emotion means a direct user request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<EmotionLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<MoodSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_note: Option<String>,
    /// Loaded from the store when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighbors: Option<NeighborSummaries>,
}

impl MoodPayload {
    pub fn inferred(emotion: EmotionLabel, snapshot: MoodSnapshot) -> Self {
        Self {
            emotion: Some(emotion),
            snapshot: Some(snapshot),
            ..Self::default()
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self {
            request: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_weather_note(mut self, note: impl Into<String>) -> Self {
        self.weather_note = Some(note.into());
        self
    }

    pub fn with_neighbors(mut self, neighbors: NeighborSummaries) -> Self {
        self.neighbors = Some(neighbors);
        self
    }

    pub fn emotion_label(&self) -> &str {
        self.emotion.map(|e| e.as_str()).unwrap_or(USER_REQUEST_EMOTION)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerPayload {
    Weather(WeatherSnapshot),
    Mood(MoodPayload),
}

impl TriggerPayload {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::Weather(_) => TriggerKind::Weather,
            Self::Mood(_) => TriggerKind::Mood,
        }
    }

    /// Trigger data kept in the audit log; never the activity lists.
    pub fn audit_payload(&self) -> Value {
        match self {
            Self::Weather(w) => json!({
                "condition": w.condition,
                "temperatureC": w.temperature_c,
                "riskKind": w.risk_kind,
                "severity": w.severity_level(),
            }),
            Self::Mood(m) => json!({
                "inferredEmotion": m.emotion_label(),
                "metrics": m.snapshot,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerationContext {
    pub trip_id: String,
    pub day_plan_id: String,
    pub payload: TriggerPayload,
    /// Write the result back (and audit it) instead of only returning it.
    pub persist: bool,
}

impl RegenerationContext {
    pub fn new(
        trip_id: impl Into<String>,
        day_plan_id: impl Into<String>,
        payload: TriggerPayload,
        persist: bool,
    ) -> Self {
        Self {
            trip_id: trip_id.into(),
            day_plan_id: day_plan_id.into(),
            payload,
            persist,
        }
    }

    pub fn weather(trip_id: impl Into<String>, day_plan_id: impl Into<String>, snapshot: WeatherSnapshot) -> Self {
        Self::new(trip_id, day_plan_id, TriggerPayload::Weather(snapshot), true)
    }

    pub fn mood(trip_id: impl Into<String>, day_plan_id: impl Into<String>, payload: MoodPayload) -> Self {
        Self::new(trip_id, day_plan_id, TriggerPayload::Mood(payload), true)
    }

    pub fn dry_run(mut self) -> Self {
        self.persist = false;
        self
    }

    pub fn kind(&self) -> TriggerKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherCondition;

    #[test]
    fn kind_follows_payload() {
        let weather = WeatherSnapshot::observe(WeatherCondition::Rain, "rain", 15.0, 5.0);
        assert_eq!(RegenerationContext::weather("t", "d", weather).kind(), TriggerKind::Weather);

        let ctx = RegenerationContext::mood("t", "d", MoodPayload::request("more food")).dry_run();
        assert_eq!(ctx.kind(), TriggerKind::Mood);
        assert!(!ctx.persist);
    }

    #[test]
    fn user_request_audit_label() {
        let payload = TriggerPayload::Mood(MoodPayload::request("less walking"));
        assert_eq!(payload.audit_payload()["inferredEmotion"], USER_REQUEST_EMOTION);

        let inferred = TriggerPayload::Mood(MoodPayload::inferred(
            EmotionLabel::Overwhelmed,
            MoodSnapshot::new(1.0, 2500.0, 0),
        ));
        assert_eq!(inferred.audit_payload()["inferredEmotion"], "overwhelmed");
    }
}
