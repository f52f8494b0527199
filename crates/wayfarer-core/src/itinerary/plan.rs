//! Trips and day plans, the persistence-side owners of activity lists.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::activity::ActivityList;

/// Trip-level preferences as stored (an open blob).
///
/// The prompt builders only read the typed fields; any other keys are
/// kept so a round trip through storage does not lose them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPreferences {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_style: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TripPreferences {
    pub fn pace_or_default(&self) -> &str {
        self.pace.as_deref().unwrap_or("balanced")
    }

    pub fn budget_or_default(&self) -> &str {
        self.budget.as_deref().unwrap_or("moderate")
    }

    pub fn travel_style_or_default(&self) -> &str {
        self.travel_style.as_deref().unwrap_or("balanced")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub destination_city: String,
    pub country: String,
    #[serde(default)]
    pub preferences: TripPreferences,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub id: String,
    pub trip_id: String,
    pub day_index: u32,
    pub date: NaiveDate,
    pub activities: ActivityList,
    pub updated_at: DateTime<Utc>,
}

/// Digests of the days around a day plan, for continuity in prompts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborSummaries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}
