//! Free-text change requests. Proposals are never saved to the day plan;
//! use `wayfarer reconcile` to merge one.

use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use wayfarer_core::itinerary::DiffSummary;
use wayfarer_core::weather::{forecast_note_for_day, FORECAST_UNAVAILABLE_NOTE};
use wayfarer_core::{diff, Database, FixtureWeather, Signal, WeatherService};

use crate::common::{block_on, orchestrator, print_json, write_activities, CliResult};

#[derive(Args)]
pub struct ChatArgs {
    /// Trip ID
    trip: String,
    /// Day plan ID
    day: String,
    /// What should change about the day
    message: String,
    /// Weather fixture used to add a forecast note to the request
    #[arg(long)]
    weather_fixture: Option<PathBuf>,
    /// Use the contents of this file as the generator's answer
    #[arg(long)]
    response_file: Option<PathBuf>,
    /// Write the proposed activities to this file for `wayfarer reconcile`
    #[arg(long)]
    save_proposal: Option<PathBuf>,
}

pub fn run(args: ChatArgs) -> CliResult {
    let db = Database::open()?;
    let trip = db
        .get_trip(&args.trip)?
        .ok_or_else(|| format!("trip not found: {}", args.trip))?;
    let plan = db
        .get_day_plan(&args.day)?
        .ok_or_else(|| format!("day plan not found: {}", args.day))?;

    let weather_note = match &args.weather_fixture {
        Some(path) => {
            let weather = FixtureWeather::load(path)?;
            let note = match block_on(weather.forecast(&trip.destination_city))? {
                Ok(forecast) => forecast_note_for_day(&forecast, plan.date, plan.day_index),
                Err(e) => {
                    tracing::warn!(error = %e, "forecast unavailable");
                    FORECAST_UNAVAILABLE_NOTE.to_string()
                }
            };
            Some(note)
        }
        None => None,
    };

    let orchestrator = orchestrator(db, args.response_file.as_deref())?;
    let outcome = block_on(orchestrator.handle_signal(Signal::UserRequest {
        trip_id: trip.id,
        day_plan_id: plan.id,
        message: args.message,
        weather_note,
    }))??;

    let proposal = outcome.updated_plan.unwrap_or_default();
    let rows = diff(&plan.activities, &proposal);
    let summary = DiffSummary::of(&rows);
    eprintln!("{}", summary.message());

    if let Some(path) = &args.save_proposal {
        write_activities(path, &proposal)?;
        eprintln!("Proposal saved to {}", path.display());
    }
    print_json(&json!({ "proposal": proposal, "diff": rows }))
}
