//! Non-interactive reconciliation: defaults per slot, overridden by flags.

use std::path::PathBuf;

use clap::Args;
use serde_json::json;
use wayfarer_core::{Database, Decision, ItineraryStore, ReconciliationSession};

use crate::common::{print_json, read_activities, CliResult};

#[derive(Args)]
pub struct ReconcileArgs {
    /// Day plan ID to merge into
    day: String,
    /// JSON file with the proposed activities
    #[arg(long)]
    proposed: PathBuf,
    /// Start from "accept every proposed activity"
    #[arg(long, conflicts_with = "keep_all")]
    accept_all: bool,
    /// Start from "keep the current plan"
    #[arg(long)]
    keep_all: bool,
    /// Keep the current activity at this time (repeatable)
    #[arg(long = "keep", value_name = "HH:MM")]
    keep: Vec<String>,
    /// Take the proposed activity at this time (repeatable)
    #[arg(long = "accept", value_name = "HH:MM")]
    accept: Vec<String>,
    /// Leave this time slot empty (repeatable)
    #[arg(long = "drop", value_name = "HH:MM")]
    drop: Vec<String>,
    /// Print the merged plan without saving it
    #[arg(long)]
    dry_run: bool,
}

pub fn run(args: ReconcileArgs) -> CliResult {
    let db = Database::open()?;
    let plan = db
        .get_day_plan(&args.day)?
        .ok_or_else(|| format!("day plan not found: {}", args.day))?;
    let proposed = read_activities(&args.proposed)?;

    let mut session = ReconciliationSession::new(&plan.activities, &proposed);
    if args.accept_all {
        session.accept_all_proposed();
    } else if args.keep_all {
        session.keep_all_original();
    }

    let overrides = args
        .keep
        .iter()
        .map(|t| (t, Decision::KeepOriginal))
        .chain(args.accept.iter().map(|t| (t, Decision::AcceptProposed)))
        .chain(args.drop.iter().map(|t| (t, Decision::Drop)));
    for (time, decision) in overrides {
        session.set_decision(time, decision)?;
    }

    let changed: Vec<String> = session.pending_changes().into_iter().map(str::to_string).collect();
    let decisions = session.decisions().clone();
    let merged = session.finalize();

    if args.dry_run {
        eprintln!("Dry run, {} slot(s) would change", changed.len());
    } else {
        db.replace_day_plan(&plan.id, &merged)?;
        eprintln!("Day plan updated, {} slot(s) changed", changed.len());
    }
    print_json(&json!({
        "dayPlanId": plan.id,
        "decisions": decisions,
        "changed": changed,
        "activities": merged,
    }))
}
