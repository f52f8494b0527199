//! Defensive extraction of activity lists from generator output.
//!
//! Generators wrap JSON in prose or markdown fences despite being told not
//! to, so the JSON text is located first and only then decoded and checked.

use serde::Deserialize;

use crate::error::GenerationParseError;
use crate::itinerary::{is_valid_time_slot, Activity, ActivityList};

/// Locate the JSON text inside a raw response.
///
/// Prefers the body of the first fenced code block (optionally tagged
/// `json`); otherwise takes everything from the first `{` to the last `}`.
/// Returns `None` when neither is present.
pub fn extract_json_text(raw: &str) -> Option<&str> {
    if let Some(body) = fenced_block(raw) {
        return Some(body.trim());
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| raw[start..=end].trim())
}

fn fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    let mut body = &raw[open + 3..];
    if let Some(rest) = body.strip_prefix("json") {
        body = rest;
    }
    let close = body.find("```")?;
    Some(&body[..close])
}

/// Extract, decode and validate an activity list.
///
/// # Errors
/// Any failure yields a [`GenerationParseError`] carrying the raw text.
pub fn parse_activity_list(raw: &str) -> Result<ActivityList, GenerationParseError> {
    let fail = |reason: String| GenerationParseError::new(reason, raw);

    let json = extract_json_text(raw).ok_or_else(|| fail("no JSON object found".to_string()))?;
    let list: ActivityList =
        serde_json::from_str(json).map_err(|e| fail(format!("invalid activity list: {e}")))?;
    validate(&list).map_err(fail)?;
    Ok(list)
}

#[derive(Deserialize)]
struct GeneratedItinerary {
    days: Vec<GeneratedDay>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedDay {
    #[serde(default)]
    day_index: Option<u32>,
    activities: Vec<Activity>,
}

/// Extract, decode and validate a `{"days": [...]}` itinerary with exactly
/// `expected_days` days.
///
/// Days are ordered by their `dayIndex` when every day carries one, and
/// kept in answer order otherwise.
///
/// # Errors
/// Any failure yields a [`GenerationParseError`] carrying the raw text.
pub fn parse_itinerary(raw: &str, expected_days: usize) -> Result<Vec<ActivityList>, GenerationParseError> {
    let fail = |reason: String| GenerationParseError::new(reason, raw);

    let json = extract_json_text(raw).ok_or_else(|| fail("no JSON object found".to_string()))?;
    let mut itinerary: GeneratedItinerary =
        serde_json::from_str(json).map_err(|e| fail(format!("invalid itinerary: {e}")))?;
    if itinerary.days.len() != expected_days {
        return Err(fail(format!(
            "expected {expected_days} day(s), got {}",
            itinerary.days.len()
        )));
    }
    if itinerary.days.iter().all(|day| day.day_index.is_some()) {
        itinerary.days.sort_by_key(|day| day.day_index);
    }

    itinerary
        .days
        .into_iter()
        .enumerate()
        .map(|(i, day)| {
            let list = ActivityList::new(day.activities);
            if list.is_empty() {
                return Err(fail(format!("day {}: no activities", i + 1)));
            }
            validate(&list).map_err(|reason| fail(format!("day {}: {reason}", i + 1)))?;
            Ok(list)
        })
        .collect()
}

fn validate(list: &ActivityList) -> Result<(), String> {
    for (i, activity) in list.iter().enumerate() {
        if !is_valid_time_slot(&activity.time) {
            return Err(format!("activity {i}: time '{}' is not HH:MM", activity.time));
        }
        if activity.title.trim().is_empty() {
            return Err(format!("activity {i} at {}: empty title", activity.time));
        }
        if !activity.estimated_cost.is_finite() || activity.estimated_cost < 0.0 {
            return Err(format!(
                "activity {i} at {}: invalid estimated cost {}",
                activity.time, activity.estimated_cost
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_with_surrounding_prose() {
        let raw = "Here you go:\n```json\n{\"activities\":[]}\n```\nEnjoy!";
        assert_eq!(extract_json_text(raw), Some("{\"activities\":[]}"));
        assert!(parse_activity_list(raw).unwrap().is_empty());
    }

    #[test]
    fn untagged_fence() {
        let raw = "```\n{\"activities\":[{\"time\":\"09:00\",\"title\":\"Cafe\",\"description\":\"Coffee\"}]}\n```";
        assert_eq!(parse_activity_list(raw).unwrap().len(), 1);
    }

    #[test]
    fn braces_without_fence() {
        let raw = "Sure! {\"activities\":[{\"time\":\"13:00\",\"title\":\"Lunch\",\"description\":\"Ramen\"}]} Hope this helps.";
        let list = parse_activity_list(raw).unwrap();
        assert_eq!(list.activities[0].title, "Lunch");
    }

    #[test]
    fn fenced_bare_array_is_accepted() {
        let raw = "```json\n[{\"time\":\"09:00\",\"title\":\"Temple\",\"description\":\"\"}]\n```";
        assert_eq!(parse_activity_list(raw).unwrap().len(), 1);
    }

    #[test]
    fn no_json_keeps_raw_text() {
        let raw = "I'm sorry, I can't help with that.";
        let err = parse_activity_list(raw).unwrap_err();
        assert_eq!(err.raw_response, raw);
        assert_eq!(err.reason, "no JSON object found");
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let err = parse_activity_list("{\"days\": []}").unwrap_err();
        assert!(err.reason.starts_with("invalid activity list"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(parse_activity_list("{\"activities\": [}").is_err());
    }

    #[test]
    fn shape_validation() {
        let bad_time = r#"{"activities":[{"time":"9am","title":"Walk","description":""}]}"#;
        assert!(parse_activity_list(bad_time).unwrap_err().reason.contains("not HH:MM"));

        let empty_title = r#"{"activities":[{"time":"09:00","title":"  ","description":""}]}"#;
        assert!(parse_activity_list(empty_title).unwrap_err().reason.contains("empty title"));

        let negative_cost =
            r#"{"activities":[{"time":"09:00","title":"Walk","description":"","estimatedCost":-5}]}"#;
        assert!(parse_activity_list(negative_cost).unwrap_err().reason.contains("estimated cost"));

        let no_description = r#"{"activities":[{"time":"09:00","title":"Walk"}]}"#;
        assert!(parse_activity_list(no_description).is_err());
    }

    const TWO_DAYS: &str = r#"```json
{"days":[
  {"dayIndex":2,"theme":"Arashiyama","activities":[{"time":"09:00","title":"Bamboo grove","description":"Early walk"}]},
  {"dayIndex":1,"date":"2026-04-10","activities":[
    {"time":"09:00","title":"Start from Hotel","description":"","indoor":true},
    {"time":"10:30","title":"Fushimi Inari","description":"Gates","duration":"120"}
  ]}
]}
```"#;

    #[test]
    fn itinerary_days_follow_day_index() {
        let days = parse_itinerary(TWO_DAYS, 2).unwrap();
        assert_eq!(days[0].activities[1].title, "Fushimi Inari");
        assert_eq!(days[0].activities[1].duration_minutes, 120);
        assert_eq!(days[1].activities[0].title, "Bamboo grove");
    }

    #[test]
    fn itinerary_day_count_must_match() {
        let err = parse_itinerary(TWO_DAYS, 3).unwrap_err();
        assert_eq!(err.reason, "expected 3 day(s), got 2");
        assert_eq!(err.raw_response, TWO_DAYS);
    }

    #[test]
    fn itinerary_days_are_validated() {
        let empty_day = r#"{"days":[{"activities":[]}]}"#;
        assert_eq!(parse_itinerary(empty_day, 1).unwrap_err().reason, "day 1: no activities");

        let bad_time = r#"{"days":[{"activities":[{"time":"09:00","title":"A","description":""}]},
                                    {"activities":[{"time":"noon","title":"B","description":""}]}]}"#;
        assert!(parse_itinerary(bad_time, 2).unwrap_err().reason.starts_with("day 2: activity 0"));

        // A single day plan is not an itinerary.
        assert!(parse_itinerary(r#"{"activities":[]}"#, 1).unwrap_err().reason.starts_with("invalid itinerary"));
    }
}
