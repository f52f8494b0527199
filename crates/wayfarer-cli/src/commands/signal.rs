//! External signals fed into the adaptive loop.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Subcommand;
use wayfarer_core::{Database, FixtureWeather, Signal, WeatherCondition, WeatherService, WeatherSnapshot};

use crate::common::{block_on, orchestrator, print_json, CliResult};

#[derive(Subcommand)]
pub enum SignalAction {
    /// Record a weather observation for a day plan
    Weather {
        /// Trip ID
        #[arg(long)]
        trip: String,
        /// Day plan ID
        #[arg(long)]
        day: String,
        /// Condition group, e.g. Rain, Clear, Thunderstorm
        #[arg(long, value_parser = parse_condition, required_unless_present = "fixture")]
        condition: Option<WeatherCondition>,
        /// Temperature in °C
        #[arg(long, default_value = "20")]
        temp: f64,
        /// Wind speed in km/h
        #[arg(long, default_value = "0")]
        wind: f64,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Weather fixture file to read the observation from
        #[arg(long, conflicts_with = "condition")]
        fixture: Option<PathBuf>,
        /// Location to look up in the fixture (defaults to the trip's city)
        #[arg(long, requires = "fixture")]
        location: Option<String>,
        /// Observation time to look up (RFC 3339, defaults to now)
        #[arg(long, requires = "fixture")]
        at: Option<DateTime<Utc>>,
        /// Use the contents of this file as the generator's answer
        #[arg(long)]
        response_file: Option<PathBuf>,
    },
}

fn parse_condition(value: &str) -> Result<WeatherCondition, String> {
    let condition: WeatherCondition =
        serde_json::from_value(serde_json::Value::String(value.to_string())).map_err(|e| e.to_string())?;
    if condition == WeatherCondition::Other && !value.eq_ignore_ascii_case("other") {
        return Err(format!("unknown weather condition: {value}"));
    }
    Ok(condition)
}

pub fn run(action: SignalAction) -> CliResult {
    match action {
        SignalAction::Weather {
            trip,
            day,
            condition,
            temp,
            wind,
            description,
            fixture,
            location,
            at,
            response_file,
        } => {
            let db = Database::open()?;
            let snapshot = match (fixture, condition) {
                (Some(path), _) => {
                    let location = match location {
                        Some(location) => location,
                        None => {
                            let trip = db.get_trip(&trip)?.ok_or_else(|| format!("trip not found: {trip}"))?;
                            trip.destination_city
                        }
                    };
                    let weather = FixtureWeather::load(&path)?;
                    block_on(weather.severity(&location, at.unwrap_or_else(Utc::now)))??
                }
                (None, Some(condition)) => {
                    let description = description.unwrap_or_else(|| format!("{condition:?}").to_lowercase());
                    WeatherSnapshot::observe(condition, description, temp, wind).at(Utc::now())
                }
                (None, None) => return Err("either --condition or --fixture is required".into()),
            };

            let orchestrator = orchestrator(db, response_file.as_deref())?;
            let outcome = block_on(orchestrator.handle_signal(Signal::Weather {
                trip_id: trip,
                day_plan_id: day,
                snapshot,
            }))??;
            print_json(&outcome)?;
        }
    }
    Ok(())
}
