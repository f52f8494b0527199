//! Trip management commands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;
use wayfarer_core::weather::{forecast_digest, FORECAST_UNAVAILABLE_NOTE};
use wayfarer_core::{Database, FixtureWeather, ItineraryRequest, TripPreferences, WeatherService};

use crate::common::{block_on, orchestrator, print_json, CliResult};

#[derive(Subcommand)]
pub enum TripAction {
    /// Create a new trip
    Create {
        /// Trip title
        title: String,
        /// Destination city
        #[arg(long)]
        city: String,
        /// Destination country
        #[arg(long)]
        country: String,
        /// Interests, repeatable
        #[arg(long = "interest")]
        interests: Vec<String>,
        /// Pace, e.g. "relaxed" or "packed"
        #[arg(long)]
        pace: Option<String>,
        /// Budget, e.g. "low" or "luxury"
        #[arg(long)]
        budget: Option<String>,
        /// Travel style, e.g. "solo" or "family"
        #[arg(long)]
        style: Option<String>,
    },
    /// Generate the trip's day-by-day itinerary
    Generate {
        /// Trip ID
        id: String,
        /// First day of the trip (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Number of days
        #[arg(long, default_value = "3")]
        days: u32,
        /// Weather fixture used to add a forecast to the request
        #[arg(long)]
        weather_fixture: Option<PathBuf>,
        /// Use the contents of this file as the generator's answer
        #[arg(long)]
        response_file: Option<PathBuf>,
    },
    /// List all trips
    List,
    /// Show a trip with its day plans
    Show {
        /// Trip ID
        id: String,
    },
}

pub fn run(action: TripAction) -> CliResult {
    let db = Database::open()?;

    match action {
        TripAction::Create {
            title,
            city,
            country,
            interests,
            pace,
            budget,
            style,
        } => {
            let preferences = TripPreferences {
                interests,
                pace,
                budget,
                travel_style: style,
                ..TripPreferences::default()
            };
            let trip = db.create_trip(&title, &city, &country, preferences)?;
            eprintln!("Trip created: {}", trip.id);
            print_json(&trip)?;
        }
        TripAction::Generate {
            id,
            start,
            days,
            weather_fixture,
            response_file,
        } => {
            let trip = db.get_trip(&id)?.ok_or_else(|| format!("trip not found: {id}"))?;
            let mut request = ItineraryRequest::new(trip.id, start, days);
            if let Some(path) = &weather_fixture {
                let weather = FixtureWeather::load(path)?;
                let note = match block_on(weather.forecast(&trip.destination_city))? {
                    Ok(forecast) => forecast_digest(&forecast),
                    Err(e) => {
                        tracing::warn!(error = %e, "forecast unavailable");
                        FORECAST_UNAVAILABLE_NOTE.to_string()
                    }
                };
                request = request.with_weather_note(note);
            }

            let orchestrator = orchestrator(db, response_file.as_deref())?;
            let plans = block_on(orchestrator.generate_itinerary(&request))??;
            eprintln!("Itinerary generated: {} day(s)", plans.len());
            print_json(&plans)?;
        }
        TripAction::List => {
            print_json(&db.list_trips()?)?;
        }
        TripAction::Show { id } => {
            let trip = db.get_trip(&id)?.ok_or_else(|| format!("trip not found: {id}"))?;
            let days = db.list_day_plans(&trip.id)?;
            print_json(&json!({ "trip": trip, "days": days }))?;
        }
    }
    Ok(())
}
