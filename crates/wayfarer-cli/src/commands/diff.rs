//! Slot-by-slot comparison of a day plan and a proposal.

use std::path::PathBuf;

use clap::Args;
use wayfarer_core::itinerary::DiffSummary;
use wayfarer_core::{diff, Database, DiffRow, DiffStatus};

use crate::common::{print_json, read_activities, CliResult};

#[derive(Args)]
pub struct DiffArgs {
    /// Day plan ID to compare against
    day: String,
    /// JSON file with the proposed activities
    #[arg(long)]
    proposed: PathBuf,
    /// Print rows as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: DiffArgs) -> CliResult {
    let db = Database::open()?;
    let plan = db
        .get_day_plan(&args.day)?
        .ok_or_else(|| format!("day plan not found: {}", args.day))?;
    let proposed = read_activities(&args.proposed)?;

    let rows = diff(&plan.activities, &proposed);
    if args.json {
        return print_json(&rows);
    }
    for row in &rows {
        println!("{}", render_row(row));
    }
    println!("{}", DiffSummary::of(&rows).message());
    Ok(())
}

fn render_row(row: &DiffRow) -> String {
    let title = |a: &Option<wayfarer_core::Activity>| a.as_ref().map(|a| a.title.clone()).unwrap_or_default();
    match row.status {
        DiffStatus::Added => format!("+ {}  {}", row.time, title(&row.proposed)),
        DiffStatus::Removed => format!("- {}  {}", row.time, title(&row.original)),
        DiffStatus::Modified => format!(
            "~ {}  {} -> {}",
            row.time,
            title(&row.original),
            title(&row.proposed)
        ),
        DiffStatus::Unchanged => format!("  {}  {}", row.time, title(&row.original)),
    }
}
