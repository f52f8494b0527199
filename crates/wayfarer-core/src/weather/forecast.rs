use chrono::NaiveDate;

use super::WeatherSnapshot;

/// Prefix of a note built from another day's forecast.
pub const PROJECTED_PREFIX: &str = "(Projected from current weather)";

pub const FORECAST_UNAVAILABLE_NOTE: &str =
    "Detailed forecast not available. Assume typical seasonal weather.";

/// Forecast digest for one trip day, one `- HH:MM: T°C, description` line
/// per entry.
///
/// When the forecast does not reach `date`, the entries of the available
/// date at `day_index % number_of_dates` stand in for it. Entries without
/// an observation time are ignored. Times are UTC.
pub fn forecast_note_for_day(forecast: &[WeatherSnapshot], date: NaiveDate, day_index: u32) -> String {
    let dated: Vec<(NaiveDate, &WeatherSnapshot)> = forecast
        .iter()
        .filter_map(|entry| entry.observed_at.map(|at| (at.date_naive(), entry)))
        .collect();

    let same_day = lines_for(&dated, date);
    if !same_day.is_empty() {
        return same_day.join("\n");
    }

    let mut dates: Vec<NaiveDate> = Vec::new();
    for (d, _) in &dated {
        if !dates.contains(d) {
            dates.push(*d);
        }
    }
    if dates.is_empty() {
        return FORECAST_UNAVAILABLE_NOTE.to_string();
    }

    let projected = dates[day_index as usize % dates.len()];
    format!("{PROJECTED_PREFIX}\n{}", lines_for(&dated, projected).join("\n"))
}

/// Digest of a whole forecast, one `- YYYY-MM-DD HH:MM: T°C, description`
/// line per dated entry.
pub fn forecast_digest(forecast: &[WeatherSnapshot]) -> String {
    let lines: Vec<String> = forecast
        .iter()
        .filter_map(|entry| {
            let at = entry.observed_at?;
            Some(format!(
                "- {}: {}°C, {}",
                at.format("%Y-%m-%d %H:%M"),
                entry.temperature_c,
                entry.description
            ))
        })
        .collect();
    if lines.is_empty() {
        return FORECAST_UNAVAILABLE_NOTE.to_string();
    }
    lines.join("\n")
}

fn lines_for(dated: &[(NaiveDate, &WeatherSnapshot)], date: NaiveDate) -> Vec<String> {
    dated
        .iter()
        .filter(|(d, _)| *d == date)
        .filter_map(|(_, entry)| {
            let at = entry.observed_at?;
            Some(format!(
                "- {}: {}°C, {}",
                at.format("%H:%M"),
                entry.temperature_c,
                entry.description
            ))
        })
        .collect()
}
