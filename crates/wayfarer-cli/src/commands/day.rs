//! Day plan commands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;
use wayfarer_core::{ActivityList, Database};

use crate::common::{print_json, read_activities, CliResult};

#[derive(Subcommand)]
pub enum DayAction {
    /// Add a day plan to a trip
    Add {
        /// Trip ID
        trip_id: String,
        /// Zero-based position of the day within the trip
        #[arg(long)]
        index: u32,
        /// Calendar date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// JSON file with the day's activities; the day starts empty without it
        #[arg(long)]
        activities: Option<PathBuf>,
    },
    /// Print one day plan as JSON
    Show {
        /// Day plan ID
        id: String,
        /// One line per activity instead of JSON
        #[arg(long)]
        summary: bool,
    },
    /// List the day plans of a trip
    List {
        /// Trip ID
        trip_id: String,
    },
}

pub fn run(action: DayAction) -> CliResult {
    let db = Database::open()?;

    match action {
        DayAction::Add {
            trip_id,
            index,
            date,
            activities,
        } => {
            let activities = match activities {
                Some(path) => read_activities(&path)?,
                None => ActivityList::default(),
            };
            let plan = db.add_day_plan(&trip_id, index, date, activities)?;
            eprintln!("Day plan created: {}", plan.id);
            print_json(&plan)?;
        }
        DayAction::Show { id, summary } => {
            let plan = db.get_day_plan(&id)?.ok_or_else(|| format!("day plan not found: {id}"))?;
            if summary {
                println!("Day {} ({})", plan.day_index + 1, plan.date);
                for activity in &plan.activities {
                    println!("  {}  {}", activity.time, activity.title);
                }
            } else {
                print_json(&plan)?;
            }
        }
        DayAction::List { trip_id } => {
            print_json(&db.list_day_plans(&trip_id)?)?;
        }
    }
    Ok(())
}
