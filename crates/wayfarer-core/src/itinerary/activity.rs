//! Activity records and the per-day activity list.
//!
//! The JSON shape here doubles as the generation contract: prompts embed
//! an [`ActivityList`] verbatim and the generator is asked to echo the same
//! shape back, so field names stay camelCase.

use serde::{Deserialize, Deserializer, Serialize};

use super::slot::slot_key;

/// Where an activity happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            lat: None,
            lng: None,
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }
}

/// One scheduled unit of a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Absent on freshly generated candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Zero-padded 24-hour "HH:MM".
    pub time: String,
    pub title: String,
    pub description: String,
    #[serde(default, alias = "duration", deserialize_with = "lenient_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub indoor: bool,
}

impl Activity {
    pub fn new(time: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            time: time.into(),
            title: title.into(),
            description: String::new(),
            duration_minutes: 0,
            estimated_cost: 0.0,
            location: None,
            category: String::new(),
            indoor: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.estimated_cost = cost;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn indoor(mut self, indoor: bool) -> Self {
        self.indoor = indoor;
        self
    }
}

/// Generators are inconsistent about durations ("90", 90, 90.0).
fn lenient_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Minutes {
        Int(u64),
        Float(f64),
        Text(String),
    }

    let minutes = match Minutes::deserialize(deserializer)? {
        Minutes::Int(n) => n,
        Minutes::Float(f) if f.is_finite() && f >= 0.0 => f.round() as u64,
        Minutes::Float(f) => {
            return Err(serde::de::Error::custom(format!("invalid duration {f}")));
        }
        Minutes::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid duration '{s}'")))?,
    };
    u32::try_from(minutes).map_err(|_| serde::de::Error::custom("duration out of range"))
}

/// Ordered activities of exactly one day plan.
///
/// Serialized as `{"activities": [...]}`. A bare array is accepted on input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "ActivityListRepr")]
pub struct ActivityList {
    pub activities: Vec<Activity>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActivityListRepr {
    Wrapped { activities: Vec<Activity> },
    Bare(Vec<Activity>),
}

impl From<ActivityListRepr> for ActivityList {
    fn from(repr: ActivityListRepr) -> Self {
        match repr {
            ActivityListRepr::Wrapped { activities } | ActivityListRepr::Bare(activities) => {
                Self { activities }
            }
        }
    }
}

impl ActivityList {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Activity> {
        self.activities.iter()
    }

    /// First activity occupying `time`.
    pub fn at(&self, time: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| slot_key(a) == time)
    }

    /// Stable sort by time slot.
    pub fn sort_by_time(&mut self) {
        self.activities.sort_by(|a, b| slot_key(a).cmp(slot_key(b)));
    }

    /// One-line digest used as neighbor-day context in prompts.
    pub fn summary(&self) -> String {
        if self.activities.is_empty() {
            return "No activities planned".to_string();
        }
        self.activities
            .iter()
            .map(|a| format!("{} {}", a.time, a.title))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn total_cost(&self) -> f64 {
        self.activities.iter().map(|a| a.estimated_cost).sum()
    }
}

impl FromIterator<Activity> for ActivityList {
    fn from_iter<I: IntoIterator<Item = Activity>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ActivityList {
    type Item = Activity;
    type IntoIter = std::vec::IntoIter<Activity>;

    fn into_iter(self) -> Self::IntoIter {
        self.activities.into_iter()
    }
}

impl<'a> IntoIterator for &'a ActivityList {
    type Item = &'a Activity;
    type IntoIter = std::slice::Iter<'a, Activity>;

    fn into_iter(self) -> Self::IntoIter {
        self.activities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wrapped_and_bare_forms() {
        let wrapped: ActivityList = serde_json::from_str(
            r#"{"activities":[{"time":"09:00","title":"Museum","description":"Art"}]}"#,
        )
        .unwrap();
        let bare: ActivityList =
            serde_json::from_str(r#"[{"time":"09:00","title":"Museum","description":"Art"}]"#)
                .unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.len(), 1);
    }

    #[test]
    fn serializes_wrapped_with_camel_case_fields() {
        let list = ActivityList::new(vec![Activity::new("10:00", "Hike")
            .with_duration(120)
            .with_cost(15.5)]);
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["activities"][0]["durationMinutes"], 120);
        assert_eq!(json["activities"][0]["estimatedCost"], 15.5);
        assert!(json["activities"][0].get("id").is_none());
    }

    #[test]
    fn duration_accepts_alias_and_numeric_strings() {
        let a: Activity = serde_json::from_str(
            r#"{"time":"13:00","title":"Lunch","description":"","duration":"90"}"#,
        )
        .unwrap();
        assert_eq!(a.duration_minutes, 90);

        let b: Activity = serde_json::from_str(
            r#"{"time":"13:00","title":"Lunch","description":"","durationMinutes":45.4}"#,
        )
        .unwrap();
        assert_eq!(b.duration_minutes, 45);

        let bad = serde_json::from_str::<Activity>(
            r#"{"time":"13:00","title":"Lunch","description":"","duration":"about an hour"}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn missing_required_fields_are_rejected() {
        assert!(serde_json::from_str::<Activity>(r#"{"title":"No time","description":""}"#).is_err());
        assert!(serde_json::from_str::<ActivityList>(r#"{"days":[]}"#).is_err());
    }

    #[test]
    fn sort_by_time_is_stable() {
        let mut list = ActivityList::new(vec![
            Activity::new("14:00", "B"),
            Activity::new("09:00", "A"),
            Activity::new("14:00", "C"),
        ]);
        list.sort_by_time();
        let titles: Vec<_> = list.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[test]
    fn summary_lists_slots_in_order() {
        let list = ActivityList::new(vec![
            Activity::new("09:00", "Museum"),
            Activity::new("13:00", "Lunch"),
        ]);
        assert_eq!(list.summary(), "09:00 Museum; 13:00 Lunch");
        assert_eq!(ActivityList::default().summary(), "No activities planned");
    }
}
