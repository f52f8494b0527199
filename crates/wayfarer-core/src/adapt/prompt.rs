//! Prompt templates for weather and mood regenerations and for the first
//! itinerary of a trip.

use chrono::{Days, NaiveDate};
use indoc::{formatdoc, indoc};

use super::context::{MoodPayload, TriggerPayload};
use crate::error::Result;
use crate::itinerary::{ActivityList, NeighborSummaries, Trip, TripPreferences};
use crate::weather::WeatherSnapshot;

const OUTPUT_FORMAT: &str = indoc! {r#"
    OUTPUT FORMAT:
    Return exactly one JSON object shaped like CURRENT DAY PLAN: {"activities": [...]}.
    Keep every field of each activity. No prose, no markdown, no code fences.
"#};

/// Build the prompt matching the payload's trigger kind.
pub fn build_prompt(
    payload: &TriggerPayload,
    plan: &ActivityList,
    preferences: &TripPreferences,
    neighbors: &NeighborSummaries,
) -> Result<String> {
    match payload {
        TriggerPayload::Weather(weather) => weather_prompt(plan, weather, preferences),
        TriggerPayload::Mood(mood) => mood_prompt(plan, mood, preferences, neighbors),
    }
}

pub fn weather_prompt(plan: &ActivityList, weather: &WeatherSnapshot, preferences: &TripPreferences) -> Result<String> {
    let plan_json = serde_json::to_string_pretty(plan)?;
    let interests = serde_json::to_string(&preferences.interests)?;
    let risk = weather.risk_kind.map(|r| r.as_str()).unwrap_or("none");

    Ok(formatdoc! {"
        You are a travel assistant that adapts an existing day plan to changed weather.
        Regenerate ONLY the activities this weather affects.

        CURRENT WEATHER:
        - Condition: {condition} ({description})
        - Temperature: {temperature}°C
        - Wind: {wind} km/h
        - Risk: {risk}

        USER PREFERENCES:
        - Interests: {interests}
        - Pace: {pace}
        - Budget: {budget}

        CURRENT DAY PLAN (JSON):
        {plan_json}

        INSTRUCTIONS:
        1. Find the activities that are unsuitable for this weather (outdoor walks in rain, hiking in a storm, beach in the cold).
        2. Replace only those with suitable alternatives; prefer indoor options for rain and extreme conditions.
        3. Keep every time slot and the order of the day.
        4. Leave suitable activities exactly as they are.
        5. If nothing needs to change, return the current plan unchanged.

        {output}",
        condition = weather.condition,
        description = weather.description,
        temperature = weather.temperature_c,
        wind = weather.wind_speed_kmh,
        pace = preferences.pace_or_default(),
        budget = preferences.budget_or_default(),
        interests = interests,
        risk = risk,
        plan_json = plan_json,
        output = OUTPUT_FORMAT,
    })
}

pub fn mood_prompt(
    plan: &ActivityList,
    mood: &MoodPayload,
    preferences: &TripPreferences,
    neighbors: &NeighborSummaries,
) -> Result<String> {
    let plan_json = serde_json::to_string_pretty(plan)?;
    let interests = serde_json::to_string(&preferences.interests)?;
    let request = mood.request.as_deref().unwrap_or("None");
    let weather_note = mood.weather_note.as_deref().unwrap_or("Not available");
    let metrics = match &mood.snapshot {
        Some(s) => format!(
            "typing {:.1} keys/s, scrolling {:.0} px/s, {} rage clicks",
            s.typing_speed, s.scroll_velocity, s.rage_click_count
        ),
        None => "not measured".to_string(),
    };

    Ok(formatdoc! {"
        You are a travel assistant that adapts an existing day plan to how the traveler feels.
        Only handle travel planning; reinterpret off-topic requests as travel suggestions.

        USER REQUEST:
        \"{request}\"

        DETECTED MOOD:
        - Emotion: {emotion}
        - Interaction: {metrics}

        WEATHER FOR THIS DAY:
        {weather_note}

        USER PREFERENCES:
        - Interests: {interests}
        - Travel style: {style}

        ITINERARY CONTEXT:
        - Previous day: {previous}
        - Next day: {next}

        CURRENT DAY PLAN (JSON):
        {plan_json}

        INSTRUCTIONS:
        1. A specific user request takes priority over general mood adjustments.
        2. Adjust the plan to the mood: calmer and fewer activities when frustrated or overwhelmed, more engaging ones when bored.
        3. Keep continuity with the previous and next day; do not repeat their activities.
        4. Replace or modify ONLY the affected activities and keep every time slot and the order of the day.
        5. If nothing needs to change, return the current plan unchanged.

        {output}",
        emotion = mood.emotion_label(),
        style = preferences.travel_style_or_default(),
        previous = neighbors.previous.as_deref().unwrap_or("None"),
        next = neighbors.next.as_deref().unwrap_or("None"),
        request = request,
        metrics = metrics,
        weather_note = weather_note,
        interests = interests,
        plan_json = plan_json,
        output = OUTPUT_FORMAT,
    })
}

/// Prompt for a whole day-by-day itinerary of `days` days from `start`.
pub fn itinerary_prompt(trip: &Trip, start: NaiveDate, days: u32, weather_note: Option<&str>) -> Result<String> {
    let preferences = &trip.preferences;
    let interests = if preferences.interests.is_empty() {
        "general sightseeing".to_string()
    } else {
        preferences.interests.join(", ")
    };
    let end = start
        .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(start);
    let extra = serde_json::to_string(&preferences.extra)?;

    Ok(formatdoc! {r#"
        You are an expert travel planner. Generate a detailed, day-by-day itinerary for a trip.

        TRIP DETAILS:
        - Destination: {city}, {country}
        - Dates: {start} to {end} ({days} days)
        - Budget: {budget}
        - Pace: {pace}
        - Travel style: {style}
        - Interests: {interests}
        - Other preferences: {extra}

        WEATHER FORECAST:
        {weather}

        REQUIREMENTS:
        1. Create exactly {days} days, in order.
        2. Give each day 4-7 activities with HH:MM times.
        3. Each activity has time, title, description, category, duration (minutes), estimatedCost, indoor and, where known, a location with name, address, lat and lng.
        4. The first activity of every day starts from the hotel; the last one returns to it.
        5. Balance the days against the preferences and the weather.

        OUTPUT FORMAT:
        Return exactly one JSON object: {{"days": [{{"dayIndex": 1, "theme": "...", "activities": [...]}}]}}.
        No prose, no markdown, no code fences."#,
        city = trip.destination_city,
        country = trip.country,
        budget = preferences.budget_or_default(),
        pace = preferences.pace_or_default(),
        style = preferences.travel_style_or_default(),
        weather = weather_note.unwrap_or("Not available"),
        start = start,
        end = end,
        days = days,
        interests = interests,
        extra = extra,
    })
}
